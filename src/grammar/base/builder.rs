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

use {
  super::{
    Attr, CharRange, ConfigurationError, Grammar, Production, Repetition,
    Symbol,
  },
  crate::{
    stack::{
      CharClassNode, LiteralNode, NodeKind, NonTerminalNode,
      SeparatedListNode, StackNode, StackNodeId,
    },
    utils::Name,
  },
  std::{
    collections::{BTreeMap, BTreeSet},
    convert::TryFrom,
  },
};

/// A helper trait to allow builder methods to either take a type `T`, or a
/// reference to `T` if it is clonable.
pub trait BuilderInto<T> {
  /// Consumes self and produces a value of type `T`.
  fn builder_into(self) -> T;
}

impl<T> BuilderInto<T> for T {
  fn builder_into(self) -> T {
    self
  }
}

impl<'a, T> BuilderInto<T> for &'a T
where
  T: Clone,
{
  fn builder_into(self) -> T {
    self.clone()
  }
}

impl BuilderInto<Name> for &'_ str {
  fn builder_into(self) -> Name {
    Name::new(self)
  }
}

/// A bare string names a nonterminal.
impl BuilderInto<Symbol> for &'_ str {
  fn builder_into(self) -> Symbol {
    Symbol::non_terminal(self)
  }
}

impl BuilderInto<Symbol> for Name {
  fn builder_into(self) -> Symbol {
    Symbol::NonTerminal(self)
  }
}

pub struct ProductionBuilder {
  rhs: Vec<Symbol>,
  attrs: Vec<Attr>,
}

impl ProductionBuilder {
  fn new() -> Self {
    ProductionBuilder {
      rhs: Vec::new(),
      attrs: Vec::new(),
    }
  }

  fn build(self, label: Name, head: Symbol) -> Production {
    let ProductionBuilder { rhs, attrs } = self;
    attrs
      .into_iter()
      .fold(Production::new(label, head, rhs), |prod, attr| {
        prod.with_attr(attr)
      })
  }

  pub fn add_literal(&mut self, text: &str) -> &mut Self {
    self.rhs.push(Symbol::literal(text));
    self
  }

  pub fn add_char_class(
    &mut self,
    ranges: impl IntoIterator<Item = CharRange>,
  ) -> &mut Self {
    self.rhs.push(Symbol::char_class(ranges));
    self
  }

  pub fn add_nonterm(&mut self, name: impl BuilderInto<Name>) -> &mut Self {
    self.rhs.push(Symbol::NonTerminal(name.builder_into()));
    self
  }

  pub fn add_symbol(&mut self, symbol: impl BuilderInto<Symbol>) -> &mut Self {
    self.rhs.push(symbol.builder_into());
    self
  }

  pub fn add_attr(&mut self, attr: Attr) -> &mut Self {
    self.attrs.push(attr);
    self
  }
}

// ----------------

pub struct RuleBuilder {
  head: Symbol,
  prods: Vec<Production>,
}

impl RuleBuilder {
  fn new(head: Symbol) -> Self {
    RuleBuilder {
      head,
      prods: Vec::new(),
    }
  }

  pub fn add_prod(
    &mut self,
    label: impl BuilderInto<Name>,
    build_fn: impl FnOnce(&mut ProductionBuilder),
  ) -> &mut Self {
    let mut builder = ProductionBuilder::new();
    build_fn(&mut builder);
    self
      .prods
      .push(builder.build(label.builder_into(), self.head.clone()));
    self
  }

  /// Adds a production whose body is a separated list of `element`.
  pub fn add_list_prod(
    &mut self,
    label: impl BuilderInto<Name>,
    element: impl BuilderInto<Symbol>,
    separators: impl IntoIterator<Item = Symbol>,
    repetition: Repetition,
  ) -> &mut Self {
    self.prods.push(Production::list(
      label.builder_into(),
      self.head.clone(),
      element.builder_into(),
      separators,
      repetition,
    ));
    self
  }
}

// ----------------

/// Collects stack nodes and productions, and assembles them into a
/// [`Grammar`].
///
/// Stack nodes may be created with explicit ids and wired into productions
/// by hand with [`GrammarBuilder::expect`], or created implicitly from a
/// production's rhs with [`GrammarBuilder::add_prod`]. Implicit ids are
/// allocated above the highest id seen so far.
pub struct GrammarBuilder {
  start: Symbol,
  nodes: BTreeMap<StackNodeId, StackNode>,
  prods: Vec<(Production, Vec<StackNodeId>)>,
  errors: Vec<ConfigurationError>,
  next_id: u64,
}

impl GrammarBuilder {
  fn new(start: Symbol) -> Self {
    GrammarBuilder {
      start,
      nodes: BTreeMap::new(),
      prods: Vec::new(),
      errors: Vec::new(),
      next_id: 0,
    }
  }

  fn build(mut self) -> Result<Grammar, ConfigurationError> {
    if let Some(err) = self.errors.into_iter().next() {
      return Err(err);
    }

    // Every list symbol that a node stands for is defined by one list
    // production, wired to the element and separator nodes of the first
    // list node created for it.
    let mut defined: BTreeSet<Symbol> =
      self.prods.iter().map(|(p, _)| p.lhs().clone()).collect();
    let mut synthesized = Vec::new();
    for node in self.nodes.values() {
      if let NodeKind::SeparatedList(list) = node.kind() {
        if defined.insert(node.symbol().clone()) {
          let prod = Production::for_list_symbol(node.symbol())
            .expect("List nodes always stand for list symbols.");
          synthesized.push((prod, list.wiring()));
        }
      }
    }
    self.prods.extend(synthesized);

    log::debug!(
      "Building grammar with {} productions over {} stack nodes",
      self.prods.len(),
      self.nodes.len()
    );

    let g = Grammar::new(self.start, self.prods, self.nodes)?;
    let reachable = g.reachable_symbols();
    for rule in g.rules().filter(|rule| !reachable.contains(rule.head())) {
      log::debug!("{:?} is not reachable from the start symbol", rule.head());
    }
    Ok(g)
  }

  fn add_node(&mut self, id: u32, symbol: Symbol, kind: NodeKind) -> StackNodeId {
    let id = StackNodeId::new(id);
    self.next_id = self.next_id.max(u64::from(id.value()) + 1);
    if self.nodes.contains_key(&id) {
      self
        .errors
        .push(ConfigurationError::DuplicateStackNode { id });
    } else {
      self.nodes.insert(id, StackNode::new(id, symbol, kind));
    }
    id
  }

  /// Returns an id no node has used yet.
  pub fn fresh_id(&mut self) -> u32 {
    match u32::try_from(self.next_id) {
      Ok(id) => {
        self.next_id += 1;
        id
      }
      Err(_) => {
        self.errors.push(ConfigurationError::StackNodeIdsExhausted);
        u32::MAX
      }
    }
  }

  pub fn literal(&mut self, id: u32, text: &str) -> StackNodeId {
    self.add_node(
      id,
      Symbol::literal(text),
      NodeKind::Literal(LiteralNode::new(text)),
    )
  }

  pub fn char_class(
    &mut self,
    id: u32,
    ranges: impl IntoIterator<Item = CharRange>,
  ) -> StackNodeId {
    let class = super::CharClass::new(ranges);
    self.add_node(
      id,
      Symbol::CharClass(class.clone()),
      NodeKind::CharClass(CharClassNode::new(class)),
    )
  }

  pub fn non_terminal(
    &mut self,
    id: u32,
    name: impl BuilderInto<Name>,
  ) -> StackNodeId {
    let name = name.builder_into();
    self.add_node(
      id,
      Symbol::NonTerminal(name.clone()),
      NodeKind::NonTerminal(NonTerminalNode::new(name)),
    )
  }

  /// Creates a list node over already registered element and separator
  /// nodes.
  pub fn separated_list(
    &mut self,
    id: u32,
    element: StackNodeId,
    separators: &[StackNodeId],
    repetition: Repetition,
  ) -> StackNodeId {
    let mut parts = Vec::new();
    for part in std::iter::once(&element).chain(separators) {
      match self.nodes.get(part) {
        Some(node) => parts.push(node.symbol().clone()),
        None => {
          self.errors.push(ConfigurationError::UnknownStackNode {
            context: Name::new("separated list"),
            id: *part,
          });
          return StackNodeId::new(id);
        }
      }
    }

    let element_sym = parts.remove(0);
    self.add_node(
      id,
      Symbol::separated_list(element_sym, parts, repetition),
      NodeKind::SeparatedList(SeparatedListNode::new(
        element,
        separators.to_vec(),
        repetition,
      )),
    )
  }

  /// Creates a fresh node standing for `symbol`. List symbols get fresh
  /// element and separator nodes as well.
  pub fn node_for(&mut self, symbol: &Symbol) -> StackNodeId {
    match symbol {
      Symbol::Literal(text) => {
        let id = self.fresh_id();
        self.literal(id, text.str())
      }
      Symbol::CharClass(class) => {
        let id = self.fresh_id();
        self.char_class(id, class.ranges().iter().copied())
      }
      Symbol::NonTerminal(name) => {
        let id = self.fresh_id();
        self.non_terminal(id, name)
      }
      Symbol::SeparatedList {
        element,
        separators,
        repetition,
      } => {
        let element = self.node_for(element);
        let separators: Vec<_> =
          separators.iter().map(|sep| self.node_for(sep)).collect();
        let id = self.fresh_id();
        self.separated_list(id, element, &separators, *repetition)
      }
    }
  }

  /// Registers `production`, with `nodes` wired to its rhs symbols in order.
  pub fn expect(
    &mut self,
    production: Production,
    nodes: &[StackNodeId],
  ) -> &mut Self {
    if let Err(err) = self.check_wiring(&production, nodes) {
      self.errors.push(err);
    } else {
      self.prods.push((production, nodes.to_vec()));
    }
    self
  }

  /// Registers `production`, creating a fresh stack node for each rhs
  /// symbol.
  pub fn add_prod(&mut self, production: Production) -> &mut Self {
    let nodes: Vec<_> = production
      .rhs()
      .iter()
      .map(|sym| self.node_for(sym))
      .collect();
    self.expect(production, &nodes)
  }

  pub fn add_rule<F>(
    &mut self,
    head: impl BuilderInto<Symbol>,
    build_fn: F,
  ) -> &mut Self
  where
    F: FnOnce(&mut RuleBuilder),
  {
    let mut rule_builder = RuleBuilder::new(head.builder_into());
    build_fn(&mut rule_builder);
    for prod in rule_builder.prods {
      self.add_prod(prod);
    }
    self
  }

  fn check_wiring(
    &self,
    production: &Production,
    nodes: &[StackNodeId],
  ) -> Result<(), ConfigurationError> {
    if production.arity() != nodes.len() {
      return Err(ConfigurationError::ArityMismatch {
        label: production.label().clone(),
        arity: production.arity(),
        wired: nodes.len(),
      });
    }

    for (index, (id, expected)) in
      nodes.iter().zip(production.rhs()).enumerate()
    {
      let node =
        self
          .nodes
          .get(id)
          .ok_or_else(|| ConfigurationError::UnknownStackNode {
            context: production.label().clone(),
            id: *id,
          })?;
      if node.symbol() != expected {
        return Err(ConfigurationError::SymbolMismatch {
          label: production.label().clone(),
          index,
          id: *id,
          expected: expected.clone(),
          found: node.symbol().clone(),
        });
      }
    }

    Ok(())
  }
}

/// Builds a grammar using a builder function.
///
/// Example:
///
/// ```rust
/// # use sgll::grammar::{Production, Repetition, Symbol};
/// // S ::= (A "b")+ ; A ::= "a"
/// let g = sgll::grammar::build("S", |gb| {
///   let a = gb.non_terminal(1, "A");
///   let b = gb.literal(2, "b");
///   gb.expect(
///     Production::list(
///       "S",
///       "S",
///       Symbol::non_terminal("A"),
///       vec![Symbol::literal("b")],
///       Repetition::Plus,
///     ),
///     &[a, b],
///   );
///   gb.add_rule("A", |rb| {
///     rb.add_prod("A", |pb| {
///       pb.add_literal("a");
///     });
///   });
/// })
/// .unwrap();
/// assert_eq!(g.prods_for(&Symbol::non_terminal("S")).len(), 1);
/// ```
///
/// The first configuration problem found, in registration order, is
/// returned as the error.
pub fn build(
  start: impl BuilderInto<Symbol>,
  build_fn: impl FnOnce(&mut GrammarBuilder),
) -> Result<Grammar, ConfigurationError> {
  let mut builder = GrammarBuilder::new(start.builder_into());
  build_fn(&mut builder);
  builder.build()
}
