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

//! The memo tables filled in by recognition.

use {
  crate::{
    grammar::{Grammar, ProdId, Symbol},
    parsers::{ExpectedSet, ParseError, Span},
    stack::StackNodeId,
    state::ProdState,
    utils::fmt::{map_fmt, set_fmt},
  },
  std::collections::{btree_map, BTreeMap, BTreeSet},
};

/// A production state that began at `origin` and has reached `pos`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct ItemKey<'g> {
  pub pos: usize,
  pub state: ProdState<'g>,
  pub origin: usize,
}

/// A node matched while advancing an item, and the span it matched.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Child {
  pub node: StackNodeId,
  pub span: Span,
}

/// One way an item was reached: from the item at `prev_pos` with index
/// `prev_index` (same production and origin), by matching `child`.
///
/// A link with no child is the zero-width completion of a star list.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Link {
  pub prev_pos: usize,
  pub prev_index: usize,
  pub child: Option<Child>,
}

/// The memo entry for one call of a symbol at an offset. Its existence
/// means the symbol's productions have been started there.
#[derive(Default)]
pub(super) struct CallEntry<'g> {
  /// End offsets of every completed reduction.
  pub results: BTreeSet<usize>,
  /// Items suspended on this call, resumed once per result.
  pub waiters: BTreeSet<ItemKey<'g>>,
}

pub struct Chart<'g> {
  grammar: &'g Grammar,
  items: BTreeMap<ItemKey<'g>, BTreeSet<Link>>,
  pub(super) calls: BTreeMap<(&'g Symbol, usize), CallEntry<'g>>,
  scans: BTreeMap<(StackNodeId, usize), Option<usize>>,
  completions: BTreeMap<(&'g Symbol, usize, usize), BTreeSet<ProdId>>,
  furthest: usize,
}

impl<'g> Chart<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Chart {
      grammar,
      items: BTreeMap::new(),
      calls: BTreeMap::new(),
      scans: BTreeMap::new(),
      completions: BTreeMap::new(),
      furthest: 0,
    }
  }

  /// Maps `symbol` to the grammar's own copy, which keys the memo tables.
  fn resolve(&self, symbol: &Symbol) -> Option<&'g Symbol> {
    self.grammar.try_get_rule(symbol).map(|rule| rule.head())
  }

  /// Records `key`, reached through `link`. Returns true if the item is
  /// new and must be processed.
  pub(super) fn add_item(&mut self, key: ItemKey<'g>, link: Option<Link>) -> bool {
    self.furthest = self.furthest.max(key.pos);
    match self.items.entry(key) {
      btree_map::Entry::Vacant(vac) => {
        vac.insert(link.into_iter().collect());
        true
      }
      btree_map::Entry::Occupied(mut occ) => {
        occ.get_mut().extend(link);
        false
      }
    }
  }

  /// Returns the memoized scan of a terminal node at `offset`, computing
  /// it with `scan` the first time.
  pub(super) fn scan(
    &mut self,
    node: StackNodeId,
    offset: usize,
    scan: impl FnOnce() -> Option<usize>,
  ) -> Option<usize> {
    *self.scans.entry((node, offset)).or_insert_with(scan)
  }

  pub(super) fn record_completion(
    &mut self,
    symbol: &'g Symbol,
    span: Span,
    prod: ProdId,
  ) -> bool {
    self
      .completions
      .entry((symbol, span.start, span.end))
      .or_insert_with(BTreeSet::new)
      .insert(prod)
  }

  pub fn num_items(&self) -> usize {
    self.items.len()
  }

  /// The furthest offset reached by any item.
  pub fn furthest(&self) -> usize {
    self.furthest
  }

  pub fn has_item(&self, key: &ItemKey<'g>) -> bool {
    self.items.contains_key(key)
  }

  /// Returns every way the item was reached.
  pub fn links(&self, key: &ItemKey<'g>) -> impl Iterator<Item = &Link> {
    self.items.get(key).into_iter().flat_map(|links| links.iter())
  }

  /// Returns the productions of `symbol` completed over `span`.
  pub fn completed(
    &self,
    symbol: &Symbol,
    span: Span,
  ) -> impl Iterator<Item = ProdId> + '_ {
    let key = self.resolve(symbol).map(|sym| (sym, span.start, span.end));
    key
      .and_then(|key| self.completions.get(&key))
      .into_iter()
      .flat_map(|prods| prods.iter().copied())
  }

  /// Returns the end offsets of every reduction of `symbol` starting at
  /// `start`.
  pub fn ends(
    &self,
    symbol: &Symbol,
    start: usize,
  ) -> impl Iterator<Item = usize> + '_ {
    let key = self.resolve(symbol).map(|sym| (sym, start));
    key
      .and_then(|key| self.calls.get(&key))
      .into_iter()
      .flat_map(|entry| entry.results.iter().copied())
  }

  /// True if some reduction of `symbol` spans `[0, len)`.
  pub fn accepts(&self, symbol: &Symbol, len: usize) -> bool {
    self.ends(symbol, 0).any(|end| end == len)
  }

  /// The terminals some item at `offset` is waiting to match.
  pub fn expected_at(&self, offset: usize) -> ExpectedSet {
    ExpectedSet(
      self
        .items
        .keys()
        .filter(|key| key.pos == offset)
        .filter_map(|key| key.state.next_node())
        .filter(|node| node.is_terminal())
        .map(|node| node.symbol().clone())
        .collect(),
    )
  }

  pub fn parse_error(&self, symbol: &Symbol) -> ParseError {
    ParseError {
      symbol: symbol.clone(),
      offset: self.furthest,
      expected: self.expected_at(self.furthest),
    }
  }
}

impl std::fmt::Debug for Chart<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = f.debug_struct("Chart");
    dbg_struct.field("items", &map_fmt(&self.items));
    dbg_struct.field(
      "completions",
      &set_fmt(self.completions.keys().map(|(sym, start, end)| {
        (*sym, Span::new(*start, *end))
      })),
    );
    dbg_struct.field("furthest", &self.furthest);
    dbg_struct.finish()
  }
}
