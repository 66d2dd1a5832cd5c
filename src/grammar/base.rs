// Copyright 2018 Google LLC
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

pub mod builder;
mod production;
mod symbol;

use {
  crate::{
    stack::{StackNode, StackNodeId},
    utils::{
      breadth_first_search, fmt::list_fmt, to_pretty_string, Name, ToDoc,
    },
  },
  std::collections::{btree_map, BTreeMap, BTreeSet},
};

pub use production::{Attr, Attributes, ProdKind, Production};
pub use symbol::{CharClass, CharRange, Repetition, Symbol};

/// The index of a production within its grammar.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProdId(usize);

impl ProdId {
  pub fn new(index: usize) -> Self {
    ProdId(index)
  }

  pub fn index(self) -> usize {
    self.0
  }
}

impl std::fmt::Debug for ProdId {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "P{}", self.0)
  }
}

/// A defect in a grammar, found while building it.
///
/// These are authoring errors: a grammar that fails to build can never be
/// used to parse.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
  #[error(
    "production {label} has {arity} rhs symbols, but {wired} stack nodes were wired for it"
  )]
  ArityMismatch {
    label: Name,
    arity: usize,
    wired: usize,
  },
  #[error("stack node id {id:?} is registered more than once")]
  DuplicateStackNode { id: StackNodeId },
  #[error("production label {label} is registered more than once")]
  DuplicateProduction { label: Name },
  #[error("{context} refers to unknown stack node {id:?}")]
  UnknownStackNode { context: Name, id: StackNodeId },
  #[error(
    "production {label} expects {expected:?} at position {index}, but stack node {id:?} stands for {found:?}"
  )]
  SymbolMismatch {
    label: Name,
    index: usize,
    id: StackNodeId,
    expected: Symbol,
    found: Symbol,
  },
  #[error(
    "production {label} wires stack node {id:?} into more than one position"
  )]
  ReusedStackNode { label: Name, id: StackNodeId },
  #[error("no stack node ids are left to allocate")]
  StackNodeIdsExhausted,
  #[error("production {label} cannot define {lhs:?}")]
  InvalidLhs { label: Name, lhs: Symbol },
  #[error("{symbol:?} is used but has no productions")]
  UndefinedSymbol { symbol: Symbol },
}

#[derive(Clone)]
struct ProdEntry {
  production: Production,
  wiring: Vec<StackNodeId>,
}

/// A scannerless context-free grammar.
///
/// This consists of
///
/// - A start symbol
/// - A set of productions, each of which consists of
///   - A lhs symbol (a nonterminal, or a separated list symbol)
///   - A list of rhs symbols
///   - A label, unique within the grammar
///   - Attributes and a production kind
/// - The stack nodes wired into each production's rhs, one per rhs symbol.
///
/// Grammars are read-only once built, and may be shared between threads
/// parsing different inputs.
#[derive(Clone)]
pub struct Grammar {
  start_symbol: Symbol,
  prods: Vec<ProdEntry>,
  rule_set: BTreeMap<Symbol, Vec<ProdId>>,
  labels: BTreeMap<Name, ProdId>,
  nodes: BTreeMap<StackNodeId, StackNode>,
}

impl Grammar {
  fn new(
    start_symbol: Symbol,
    prods: impl IntoIterator<Item = (Production, Vec<StackNodeId>)>,
    mut nodes: BTreeMap<StackNodeId, StackNode>,
  ) -> Result<Self, ConfigurationError> {
    let mut entries = Vec::new();
    let mut rule_set: BTreeMap<Symbol, Vec<ProdId>> = BTreeMap::new();
    let mut labels = BTreeMap::new();

    for (production, wiring) in prods {
      let id = ProdId(entries.len());
      check_lhs(&production)?;

      match labels.entry(production.label().clone()) {
        btree_map::Entry::Vacant(vac) => {
          vac.insert(id);
        }
        btree_map::Entry::Occupied(occ) => {
          return Err(ConfigurationError::DuplicateProduction {
            label: occ.key().clone(),
          })
        }
      }

      // A node's successors are registered per production, so each node may
      // fill only one of its positions.
      let mut seen = BTreeSet::new();
      let reused = wiring.iter().find(|node_id| !seen.insert(**node_id));
      if let Some(dup) = reused {
        return Err(ConfigurationError::ReusedStackNode {
          label: production.label().clone(),
          id: *dup,
        });
      }

      for (index, node_id) in wiring.iter().enumerate() {
        let node = nodes.get_mut(node_id).ok_or_else(|| {
          ConfigurationError::UnknownStackNode {
            context: production.label().clone(),
            id: *node_id,
          }
        })?;
        node.expect(id, successor_arrays(&production, &wiring, index));
      }

      rule_set
        .entry(production.lhs().clone())
        .or_insert_with(Vec::new)
        .push(id);
      entries.push(ProdEntry { production, wiring });
    }

    let g = Grammar {
      start_symbol,
      prods: entries,
      rule_set,
      labels,
      nodes,
    };

    g.check_grammar().map(|_| g)
  }

  /// Returns the start symbol for this grammar.
  pub fn start_symbol(&self) -> &Symbol {
    &self.start_symbol
  }

  /// Returns an iterator over all of the rules for this grammar.
  pub fn rules(&self) -> impl Iterator<Item = Rule<'_>> {
    self.rule_set.iter().map(move |(head, prods)| Rule {
      grammar: self,
      head,
      prods,
    })
  }

  /// Gets an iterator over all productions in the grammar, in registration
  /// order.
  pub fn prods(&self) -> impl Iterator<Item = Prod<'_>> + Clone {
    (0..self.prods.len()).map(move |i| Prod::new(self, ProdId(i)))
  }

  /// Gets the rule that has the given symbol as a head.
  pub fn try_get_rule<'a>(&'a self, symbol: &Symbol) -> Option<Rule<'a>> {
    self
      .rule_set
      .get_key_value(symbol)
      .map(|(head, prods)| Rule {
        grammar: self,
        head,
        prods,
      })
  }

  /// Returns the ids of the productions defining `symbol`.
  pub fn prods_for(&self, symbol: &Symbol) -> &[ProdId] {
    self
      .rule_set
      .get(symbol)
      .map(|v| v.as_slice())
      .unwrap_or(&[])
  }

  pub fn prod(&self, id: ProdId) -> Prod<'_> {
    assert!(id.0 < self.prods.len(), "{:?} is not in this grammar", id);
    Prod::new(self, id)
  }

  pub fn prod_by_label(&self, label: &str) -> Option<Prod<'_>> {
    self
      .labels
      .get(&Name::new(label))
      .map(|id| Prod::new(self, *id))
  }

  pub fn node(&self, id: StackNodeId) -> &StackNode {
    self
      .nodes
      .get(&id)
      .expect("Stack nodes of a built grammar are always registered.")
  }

  pub fn nodes(&self) -> impl Iterator<Item = &StackNode> {
    self.nodes.values()
  }

  pub fn is_defined(&self, symbol: &Symbol) -> bool {
    self.rule_set.contains_key(symbol)
  }

  /// Returns every symbol some derivation of the start symbol can use.
  pub fn reachable_symbols(&self) -> BTreeSet<&Symbol> {
    breadth_first_search(std::iter::once(&self.start_symbol), |sym| {
      self
        .prods_for(sym)
        .iter()
        .flat_map(|id| self.entry(*id).wiring.iter())
        .map(|node_id| self.node(*node_id).symbol())
        .collect::<Vec<_>>()
    })
  }

  pub fn to_pretty(&self) -> String {
    to_pretty_string(self, 80)
  }

  fn entry(&self, id: ProdId) -> &ProdEntry {
    &self.prods[id.0]
  }

  fn check_grammar(&self) -> Result<(), ConfigurationError> {
    if !self.is_defined(&self.start_symbol) {
      return Err(ConfigurationError::UndefinedSymbol {
        symbol: self.start_symbol.clone(),
      });
    }

    for node in self.nodes.values() {
      if node.symbol().has_productions() && !self.is_defined(node.symbol()) {
        return Err(ConfigurationError::UndefinedSymbol {
          symbol: node.symbol().clone(),
        });
      }
    }

    Ok(())
  }
}

fn check_lhs(production: &Production) -> Result<(), ConfigurationError> {
  let valid = match (production.lhs(), production.kind()) {
    (Symbol::NonTerminal(_), _) => true,
    (
      Symbol::SeparatedList {
        element,
        separators,
        repetition,
      },
      ProdKind::List(rep),
    ) => {
      *repetition == rep
        && production.rhs().first() == Some(&**element)
        && &production.rhs()[1..] == separators.as_slice()
    }
    _ => false,
  };

  if valid {
    Ok(())
  } else {
    Err(ConfigurationError::InvalidLhs {
      label: production.label().clone(),
      lhs: production.lhs().clone(),
    })
  }
}

/// The continuations of the node wired at `index` into `production`.
fn successor_arrays(
  production: &Production,
  wiring: &[StackNodeId],
  index: usize,
) -> Vec<Vec<StackNodeId>> {
  match production.kind() {
    ProdKind::Default => vec![wiring[index + 1..].to_vec()],
    ProdKind::List(_) => {
      let element = wiring[0];
      let mut rest: Vec<_> = wiring[index + 1..].to_vec();
      rest.push(element);
      if index == 0 {
        vec![Vec::new(), rest]
      } else {
        vec![rest]
      }
    }
  }
}

impl std::fmt::Debug for Grammar {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = f.debug_struct("Grammar");
    dbg_struct.field("start", &self.start_symbol);
    dbg_struct.field("prods", &list_fmt(self.prods()));
    dbg_struct.field("nodes", &list_fmt(self.nodes.values()));
    dbg_struct.finish()
  }
}

impl ToDoc for Grammar {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let start_entry = da
      .text("Start =")
      .group()
      .append(da.softline())
      .append(self.start_symbol.to_doc(da));
    let rules_entry = da.text("Rules ").append(
      da.softline()
        .append(
          da.concat(self.rules().map(|rule| {
            rule.to_doc(da).append(da.text(";")).append(da.softline())
          }))
          .nest(2),
        )
        .braces(),
    );

    da.concat(
      vec![start_entry, rules_entry]
        .into_iter()
        .map(|doc| doc.append(da.text(",")).append(da.softline())),
    )
  }
}

// ------------

/// A rule within a grammar: a head symbol and its productions.
#[derive(Clone, Copy)]
pub struct Rule<'a> {
  grammar: &'a Grammar,
  head: &'a Symbol,
  prods: &'a [ProdId],
}

impl<'a> Rule<'a> {
  /// Returns the head symbol.
  pub fn head(&self) -> &'a Symbol {
    self.head
  }

  /// Returns an iterator over the productions of this rule.
  pub fn prods(&self) -> impl Iterator<Item = Prod<'a>> + Clone {
    let grammar = self.grammar;
    self.prods.iter().map(move |id| Prod::new(grammar, *id))
  }
}

impl ToDoc for Rule<'_> {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    self
      .head
      .to_doc(da)
      .append(da.text(" =>"))
      .append(
        da.softline()
          .append(da.intersperse(
            self.prods().map(|prod| prod.production().to_doc(da)),
            da.text(" |").append(da.softline()),
          ))
          .nest(2),
      )
      .group()
  }
}

impl std::fmt::Debug for Rule<'_> {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Rule");
    dbg_struct.field("head", self.head());
    dbg_struct.field("prods", &list_fmt(self.prods()));
    dbg_struct.finish()
  }
}

// ------------

/// A single production in a grammar, together with its stack-node wiring.
#[derive(Clone, Copy)]
pub struct Prod<'a> {
  grammar: &'a Grammar,
  id: ProdId,
}

impl<'a> Prod<'a> {
  fn new(grammar: &'a Grammar, id: ProdId) -> Self {
    Prod { grammar, id }
  }

  pub fn id(&self) -> ProdId {
    self.id
  }

  pub fn production(&self) -> &'a Production {
    &self.grammar.entry(self.id).production
  }

  pub fn label(&self) -> &'a Name {
    self.production().label()
  }

  /// Returns the head of this production.
  pub fn lhs(&self) -> &'a Symbol {
    self.production().lhs()
  }

  pub fn kind(&self) -> ProdKind {
    self.production().kind()
  }

  /// Returns the ids of the stack nodes wired into this production.
  pub fn wiring(&self) -> &'a [StackNodeId] {
    &self.grammar.entry(self.id).wiring
  }

  /// Returns the stack node at the given slot.
  pub fn node_at(&self, index: usize) -> Option<&'a StackNode> {
    let grammar = self.grammar;
    self.wiring().get(index).map(|id| grammar.node(*id))
  }

  pub fn num_slots(&self) -> usize {
    self.wiring().len()
  }
}

impl PartialEq for Prod<'_> {
  fn eq(&self, other: &Self) -> bool {
    std::ptr::eq(self.grammar, other.grammar) && self.id == other.id
  }
}

impl Eq for Prod<'_> {}

impl std::fmt::Debug for Prod<'_> {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Prod");
    dbg_struct.field("id", &self.id);
    dbg_struct.field("production", self.production());
    dbg_struct.field("wiring", &self.wiring());
    dbg_struct.finish()
  }
}
