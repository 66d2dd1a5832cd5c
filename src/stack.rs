// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Stack nodes: the runtime units that stand for one position in the
//! right-hand side of a production.
//!
//! Terminal nodes (literals and character classes) match the raw input
//! themselves. Nonterminal and separated-list nodes never consume input;
//! they defer to the productions of the symbol they refer to, and the
//! parser resumes the production once that symbol has been reduced.

mod char_class;
mod literal;
mod non_terminal;
mod separated_list;

use std::collections::{BTreeMap, BTreeSet};

use crate::{
  grammar::{ProdId, Symbol},
  parsers::Input,
  utils::fmt::set_fmt,
};

pub use char_class::CharClassNode;
pub use literal::LiteralNode;
pub use non_terminal::NonTerminalNode;
pub use separated_list::SeparatedListNode;

/// The identity of a stack node. Unique within one grammar.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackNodeId(u32);

impl StackNodeId {
  pub fn new(id: u32) -> Self {
    StackNodeId(id)
  }

  pub fn value(self) -> u32 {
    self.0
  }
}

impl std::fmt::Debug for StackNodeId {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A node that matches characters directly against the input.
pub trait Matcher {
  /// Returns the end offset of the match starting at `offset`, if any.
  fn match_at(&self, input: &Input, offset: usize) -> Option<usize>;
}

/// The outcome of driving a stack node at an offset.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step<'g> {
  /// The node consumed input up to the given end offset.
  Matched(usize),
  /// The node cannot match here.
  Failed,
  /// The node is satisfied by any reduction of the given symbol starting
  /// at this offset.
  Call(&'g Symbol),
}

#[derive(Clone, Debug)]
pub enum NodeKind {
  Literal(LiteralNode),
  CharClass(CharClassNode),
  NonTerminal(NonTerminalNode),
  SeparatedList(SeparatedListNode),
}

#[derive(Clone)]
pub struct StackNode {
  id: StackNodeId,
  symbol: Symbol,
  kind: NodeKind,
  successors: BTreeMap<ProdId, BTreeSet<Vec<StackNodeId>>>,
}

impl StackNode {
  pub(crate) fn new(id: StackNodeId, symbol: Symbol, kind: NodeKind) -> Self {
    StackNode {
      id,
      symbol,
      kind,
      successors: BTreeMap::new(),
    }
  }

  pub fn id(&self) -> StackNodeId {
    self.id
  }

  /// The symbol this node stands for in a production's rhs.
  pub fn symbol(&self) -> &Symbol {
    &self.symbol
  }

  pub fn kind(&self) -> &NodeKind {
    &self.kind
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self.kind, NodeKind::Literal(_) | NodeKind::CharClass(_))
  }

  /// Registers what must be satisfied immediately after this node matches
  /// as part of `prod`. Each successor array is one way to continue; an
  /// empty array means the production is complete after this node.
  pub(crate) fn expect(
    &mut self,
    prod: ProdId,
    successors: impl IntoIterator<Item = Vec<StackNodeId>>,
  ) {
    self
      .successors
      .entry(prod)
      .or_insert_with(BTreeSet::new)
      .extend(successors);
  }

  /// Returns the successor arrays registered for `prod`.
  pub fn successors(
    &self,
    prod: ProdId,
  ) -> impl Iterator<Item = &[StackNodeId]> + '_ {
    self
      .successors
      .get(&prod)
      .into_iter()
      .flat_map(|set| set.iter().map(|v| v.as_slice()))
  }

  /// Drives this node against the input at `offset`.
  pub fn step(&self, input: &Input, offset: usize) -> Step<'_> {
    let matched = match &self.kind {
      NodeKind::Literal(lit) => lit.match_at(input, offset),
      NodeKind::CharClass(class) => class.match_at(input, offset),
      NodeKind::NonTerminal(_) | NodeKind::SeparatedList(_) => {
        return Step::Call(&self.symbol)
      }
    };

    match matched {
      Some(end) => Step::Matched(end),
      None => Step::Failed,
    }
  }
}

impl std::fmt::Debug for StackNode {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = f.debug_struct("StackNode");
    dbg_struct.field("id", &self.id);
    dbg_struct.field("symbol", &self.symbol);
    if let NodeKind::SeparatedList(list) = &self.kind {
      dbg_struct.field("element", &list.element());
      dbg_struct.field("separators", &list.separators());
    }
    dbg_struct.field(
      "successors",
      &set_fmt(self.successors.values().flat_map(|s| s.iter())),
    );
    dbg_struct.finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{CharRange, Repetition};

  fn input(s: &str) -> Input {
    Input::new(s)
  }

  #[test]
  fn test_literal_step() {
    let node = StackNode::new(
      StackNodeId::new(0),
      Symbol::literal("ab"),
      NodeKind::Literal(LiteralNode::new("ab")),
    );
    assert_eq!(node.step(&input("xab"), 1), Step::Matched(3));
    assert_eq!(node.step(&input("xab"), 0), Step::Failed);
    assert_eq!(node.step(&input("xa"), 1), Step::Failed);
  }

  #[test]
  fn test_char_class_step() {
    let class = crate::grammar::CharClass::new(vec![CharRange::new('0', '9')]);
    let node = StackNode::new(
      StackNodeId::new(0),
      Symbol::CharClass(class.clone()),
      NodeKind::CharClass(CharClassNode::new(class)),
    );
    assert_eq!(node.step(&input("a7"), 1), Step::Matched(2));
    assert_eq!(node.step(&input("a7"), 0), Step::Failed);
    assert_eq!(node.step(&input("a7"), 2), Step::Failed);
  }

  #[test]
  fn test_deferring_nodes_call_their_symbol() {
    let nt = StackNode::new(
      StackNodeId::new(0),
      Symbol::non_terminal("A"),
      NodeKind::NonTerminal(NonTerminalNode::new("A")),
    );
    assert_eq!(nt.step(&input(""), 0), Step::Call(&Symbol::non_terminal("A")));

    let list_sym = Symbol::star_list(Symbol::non_terminal("A"), vec![]);
    let list = StackNode::new(
      StackNodeId::new(1),
      list_sym.clone(),
      NodeKind::SeparatedList(SeparatedListNode::new(
        StackNodeId::new(0),
        vec![],
        Repetition::Star,
      )),
    );
    assert_eq!(list.step(&input("a"), 0), Step::Call(&list_sym));
  }

  #[test]
  fn test_expect_records_successors() {
    let mut node = StackNode::new(
      StackNodeId::new(0),
      Symbol::literal("a"),
      NodeKind::Literal(LiteralNode::new("a")),
    );
    let prod = ProdId::new(3);
    node.expect(prod, vec![vec![StackNodeId::new(1)], vec![]]);
    node.expect(prod, vec![vec![]]);
    let succs: Vec<_> = node.successors(prod).collect();
    assert_eq!(succs.len(), 2);
    assert!(succs.contains(&&[][..]));
    assert_eq!(node.successors(ProdId::new(4)).count(), 0);
  }
}
