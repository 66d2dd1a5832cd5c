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

use std::{
  collections::{BTreeMap, BTreeSet},
  sync::Arc,
};

use im::Vector;

use crate::{
  grammar::Symbol,
  parsers::{AmbiguityDetected, Span},
  utils::{to_pretty_string, Name, ToDoc},
};

/// Matched raw text.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Leaf {
  symbol: Symbol,
  text: Name,
  span: Span,
}

impl Leaf {
  pub fn text(&self) -> &str {
    self.text.str()
  }
}

/// A reduction of a default production: children ordered as its rhs.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Branch {
  tag: Name,
  symbol: Symbol,
  span: Span,
  children: Vector<Node>,
}

/// A reduction of a list production. Children alternate between one
/// element and `separator_arity` separators, starting and ending with an
/// element.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ListBranch {
  tag: Name,
  symbol: Symbol,
  span: Span,
  separator_arity: usize,
  children: Vector<Node>,
}

impl ListBranch {
  fn stride(&self) -> usize {
    self.separator_arity + 1
  }

  pub fn elements(&self) -> impl Iterator<Item = &Node> + '_ {
    self.children.iter().step_by(self.stride())
  }

  /// Returns every separator node, in order.
  pub fn separators(&self) -> impl Iterator<Item = &Node> + '_ {
    let stride = self.stride();
    self
      .children
      .iter()
      .enumerate()
      .filter(move |(i, _)| i % stride != 0)
      .map(|(_, node)| node)
  }

  pub fn separator_arity(&self) -> usize {
    self.separator_arity
  }
}

/// Structurally distinct derivations of one symbol over one span.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Ambiguity {
  symbol: Symbol,
  span: Span,
  alternatives: BTreeSet<Node>,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum NodeContents {
  Leaf(Leaf),
  Prod(Branch),
  List(ListBranch),
  Ambiguity(Ambiguity),
}

/// A node of a parse forest.
///
/// Nodes are cheap to clone and share their subtrees. Equality and ordering
/// are structural: two nodes built from different parses compare equal if
/// they describe the same derivation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node(Arc<NodeContents>);

impl Node {
  fn from_contents(contents: NodeContents) -> Self {
    Node(Arc::new(contents))
  }

  pub fn new_leaf(symbol: Symbol, text: impl Into<Name>, span: Span) -> Self {
    Node::from_contents(NodeContents::Leaf(Leaf {
      symbol,
      text: text.into(),
      span,
    }))
  }

  pub fn new_branch(
    tag: impl Into<Name>,
    symbol: Symbol,
    span: Span,
    children: impl IntoIterator<Item = Node>,
  ) -> Self {
    Node::from_contents(NodeContents::Prod(Branch {
      tag: tag.into(),
      symbol,
      span,
      children: children.into_iter().collect(),
    }))
  }

  pub fn new_list(
    tag: impl Into<Name>,
    symbol: Symbol,
    span: Span,
    separator_arity: usize,
    children: impl IntoIterator<Item = Node>,
  ) -> Self {
    let children: Vector<Node> = children.into_iter().collect();
    assert!(
      children.is_empty()
        || (children.len() - 1) % (separator_arity + 1) == 0,
      "List children must alternate elements and separators."
    );
    Node::from_contents(NodeContents::List(ListBranch {
      tag: tag.into(),
      symbol,
      span,
      separator_arity,
      children,
    }))
  }

  /// Merges alternatives of `symbol` over `span`. Structurally equal
  /// alternatives are kept once; a single remaining alternative is returned
  /// as is. Returns `None` if there are no alternatives.
  pub fn new_ambiguity(
    symbol: Symbol,
    span: Span,
    alternatives: impl IntoIterator<Item = Node>,
  ) -> Option<Self> {
    let alternatives: BTreeSet<Node> = alternatives
      .into_iter()
      .flat_map(|alt| {
        let nested: Vec<Node> = match alt.contents() {
          NodeContents::Ambiguity(amb) => {
            amb.alternatives.iter().cloned().collect()
          }
          _ => Vec::new(),
        };
        if nested.is_empty() {
          vec![alt]
        } else {
          nested
        }
      })
      .collect();

    match alternatives.len() {
      0 => None,
      1 => alternatives.into_iter().next(),
      _ => Some(Node::from_contents(NodeContents::Ambiguity(Ambiguity {
        symbol,
        span,
        alternatives,
      }))),
    }
  }

  pub fn contents(&self) -> &NodeContents {
    &self.0
  }

  /// Identifies this shared node, for walks over the forest as a graph.
  pub(super) fn as_ptr(&self) -> *const NodeContents {
    Arc::as_ptr(&self.0)
  }

  pub fn span(&self) -> Span {
    match self.contents() {
      NodeContents::Leaf(leaf) => leaf.span,
      NodeContents::Prod(branch) => branch.span,
      NodeContents::List(list) => list.span,
      NodeContents::Ambiguity(amb) => amb.span,
    }
  }

  pub fn symbol(&self) -> &Symbol {
    match self.contents() {
      NodeContents::Leaf(leaf) => &leaf.symbol,
      NodeContents::Prod(branch) => &branch.symbol,
      NodeContents::List(list) => &list.symbol,
      NodeContents::Ambiguity(amb) => &amb.symbol,
    }
  }

  /// The label of the production this node reduces, if it is a reduction.
  pub fn tag(&self) -> Option<&Name> {
    match self.contents() {
      NodeContents::Prod(branch) => Some(&branch.tag),
      NodeContents::List(list) => Some(&list.tag),
      _ => None,
    }
  }

  /// Returns the children of a reduction; empty for leaves and ambiguity
  /// nodes.
  pub fn children(&self) -> impl Iterator<Item = &Node> + '_ {
    let children = match self.contents() {
      NodeContents::Prod(branch) => Some(&branch.children),
      NodeContents::List(list) => Some(&list.children),
      _ => None,
    };
    children.into_iter().flat_map(|c| c.iter())
  }

  /// Returns the alternatives of an ambiguity node. Any other node is its
  /// own single alternative.
  pub fn alternatives(&self) -> impl Iterator<Item = &Node> + '_ {
    let (alts, this) = match self.contents() {
      NodeContents::Ambiguity(amb) => (Some(&amb.alternatives), None),
      _ => (None, Some(self)),
    };
    alts.into_iter().flat_map(|a| a.iter()).chain(this)
  }

  pub fn as_list(&self) -> Option<&ListBranch> {
    match self.contents() {
      NodeContents::List(list) => Some(list),
      _ => None,
    }
  }

  pub fn is_ambiguous(&self) -> bool {
    matches!(self.contents(), NodeContents::Ambiguity(_))
  }

  /// Returns the first ambiguity in a pre-order walk of the forest.
  pub fn find_ambiguity(&self) -> Option<AmbiguityDetected> {
    match self.contents() {
      NodeContents::Ambiguity(amb) => Some(AmbiguityDetected {
        symbol: amb.symbol.clone(),
        span: amb.span,
      }),
      _ => self.children().find_map(Node::find_ambiguity),
    }
  }

  /// The text matched under this node.
  pub fn yield_text(&self) -> String {
    let mut text = String::new();
    self.append_yield(&mut text);
    text
  }

  fn append_yield(&self, text: &mut String) {
    match self.contents() {
      NodeContents::Leaf(leaf) => text.push_str(leaf.text()),
      // Every alternative covers the same span, so any one gives the text.
      NodeContents::Ambiguity(amb) => {
        if let Some(alt) = amb.alternatives.iter().next() {
          alt.append_yield(text);
        }
      }
      _ => {
        for child in self.children() {
          child.append_yield(text);
        }
      }
    }
  }

  /// Counts the distinct trees this forest packs, saturating at
  /// `u128::MAX`.
  pub fn count_trees(&self) -> u128 {
    self.count_trees_memo(&mut BTreeMap::new())
  }

  fn count_trees_memo(
    &self,
    memo: &mut BTreeMap<*const NodeContents, u128>,
  ) -> u128 {
    let key = self.as_ptr();
    if let Some(count) = memo.get(&key) {
      return *count;
    }

    let count = match self.contents() {
      NodeContents::Leaf(_) => 1,
      NodeContents::Ambiguity(amb) => amb
        .alternatives
        .iter()
        .fold(0u128, |acc, alt| acc.saturating_add(alt.count_trees_memo(memo))),
      _ => {
        let children: Vec<_> = self.children().cloned().collect();
        children.iter().fold(1u128, |acc, child| {
          acc.saturating_mul(child.count_trees_memo(memo))
        })
      }
    };
    memo.insert(key, count);
    count
  }

  pub fn to_pretty(&self) -> String {
    to_pretty_string(self, 80)
  }
}

impl std::fmt::Debug for Node {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "{}@{:?}", self, self.span())
  }
}

/// The compact term syntax: `"text"` for leaves, `Tag(children..)` for
/// reductions, `Tag[children..]` for lists and `amb{alternatives..}` for
/// ambiguity.
impl std::fmt::Display for Node {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    fn write_all<'a>(
      f: &mut std::fmt::Formatter,
      nodes: impl Iterator<Item = &'a Node>,
    ) -> std::fmt::Result {
      for (i, node) in nodes.enumerate() {
        if i > 0 {
          write!(f, ", ")?;
        }
        write!(f, "{}", node)?;
      }
      Ok(())
    }

    match self.contents() {
      NodeContents::Leaf(leaf) => write!(f, "{:?}", leaf.text()),
      NodeContents::Prod(branch) => {
        write!(f, "{}(", branch.tag)?;
        write_all(f, branch.children.iter())?;
        write!(f, ")")
      }
      NodeContents::List(list) => {
        write!(f, "{}[", list.tag)?;
        write_all(f, list.children.iter())?;
        write!(f, "]")
      }
      NodeContents::Ambiguity(amb) => {
        write!(f, "amb{{")?;
        write_all(f, amb.alternatives.iter())?;
        write!(f, "}}")
      }
    }
  }
}

fn nested_doc<'a, DA: pretty::DocAllocator<'a>>(
  da: &'a DA,
  head: String,
  (open, close): (&'static str, &'static str),
  nodes: Vec<&Node>,
) -> pretty::DocBuilder<'a, DA>
where
  DA::Doc: Clone,
{
  da.text(head)
    .append(da.text(open))
    .append(
      da.softline_()
        .append(da.intersperse(
          nodes.into_iter().map(|n| n.to_doc(da)),
          da.text(",").append(da.softline()),
        ))
        .nest(2),
    )
    .append(da.softline_())
    .append(da.text(close))
    .group()
}

impl ToDoc for Node {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    match self.contents() {
      NodeContents::Leaf(leaf) => da.text(format!("{:?}", leaf.text())),
      NodeContents::Prod(branch) => nested_doc(
        da,
        branch.tag.str().to_string(),
        ("(", ")"),
        branch.children.iter().collect(),
      ),
      NodeContents::List(list) => nested_doc(
        da,
        list.tag.str().to_string(),
        ("[", "]"),
        list.children.iter().collect(),
      ),
      NodeContents::Ambiguity(amb) => nested_doc(
        da,
        format!("amb<{:?}>", amb.symbol),
        ("{", "}"),
        amb.alternatives.iter().collect(),
      ),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn leaf(text: &str, start: usize) -> Node {
    Node::new_leaf(
      Symbol::literal(text),
      text,
      Span::new(start, start + text.len()),
    )
  }

  fn a_node(start: usize) -> Node {
    Node::new_branch(
      "A",
      Symbol::non_terminal("A"),
      Span::new(start, start + 1),
      vec![leaf("a", start)],
    )
  }

  #[test]
  fn test_structural_equality() {
    assert_eq!(a_node(0), a_node(0));
    assert_ne!(a_node(0), a_node(1));
  }

  #[test]
  fn test_ambiguity_dedups() {
    let sym = Symbol::non_terminal("A");
    let span = Span::new(0, 1);
    let single =
      Node::new_ambiguity(sym.clone(), span, vec![a_node(0), a_node(0)])
        .unwrap();
    assert!(!single.is_ambiguous());

    let other = Node::new_branch("A2", sym.clone(), span, vec![leaf("a", 0)]);
    let amb =
      Node::new_ambiguity(sym.clone(), span, vec![a_node(0), other.clone()])
        .unwrap();
    assert!(amb.is_ambiguous());
    assert_eq!(amb.alternatives().count(), 2);
    assert_eq!(amb.count_trees(), 2);
    assert_eq!(amb.yield_text(), "a");
    assert_eq!(
      amb.find_ambiguity(),
      Some(AmbiguityDetected { symbol: sym.clone(), span })
    );

    // Nested ambiguity is flattened.
    let merged = Node::new_ambiguity(sym.clone(), span, vec![amb.clone(), other])
      .unwrap();
    assert_eq!(merged, amb);
    assert!(Node::new_ambiguity(sym, span, vec![]).is_none());
  }

  #[test]
  fn test_list_parts() {
    let list = Node::new_list(
      "S",
      Symbol::non_terminal("S"),
      Span::new(0, 5),
      1,
      vec![a_node(0), leaf("b", 1), a_node(2), leaf("b", 3), a_node(4)],
    );
    let parts = list.as_list().unwrap();
    assert_eq!(parts.elements().count(), 3);
    assert_eq!(parts.separators().count(), 2);
    assert_eq!(list.yield_text(), "ababa");
    assert_eq!(
      list.to_string(),
      "S[A(\"a\"), \"b\", A(\"a\"), \"b\", A(\"a\")]"
    );
    assert_eq!(list.find_ambiguity(), None);
  }

  #[test]
  fn test_unseparated_list() {
    let list = Node::new_list(
      "S",
      Symbol::non_terminal("S"),
      Span::new(0, 3),
      0,
      vec![a_node(0), a_node(1), a_node(2)],
    );
    let parts = list.as_list().unwrap();
    assert_eq!(parts.elements().count(), 3);
    assert_eq!(parts.separators().count(), 0);
    assert_eq!(list.yield_text(), "aaa");
  }

  #[test]
  #[should_panic]
  fn test_list_rejects_dangling_separator() {
    Node::new_list(
      "S",
      Symbol::non_terminal("S"),
      Span::new(0, 2),
      1,
      vec![a_node(0), leaf("b", 1)],
    );
  }

  #[test]
  fn test_pretty_breaks_long_terms() {
    let children: Vec<_> = (0..40).map(a_node).collect();
    let wide = Node::new_branch(
      "Wide",
      Symbol::non_terminal("W"),
      Span::new(0, 40),
      children,
    );
    let text = wide.to_pretty();
    assert!(text.starts_with("Wide("));
    assert!(text.lines().count() > 1);
  }
}
