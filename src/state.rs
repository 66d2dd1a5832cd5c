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

use crate::{
  grammar::{Prod, ProdKind},
  stack::{StackNode, StackNodeId},
};

/// A state of a production within a parse.
///
/// A production state keeps track of a particular production and an index
/// into the slots of its stack-node wiring, which is the current location of
/// the parse. For example:
///
/// ```text
/// A => "a" <B> . "c"
/// ```
///
/// This indicates that the head is A, the production is "a" <B> "c", and the
/// current location is just before the final "c".
///
/// List productions are wired as `[element, separators..]`. Their states
/// loop: after the last separator the index returns to the element, and
/// after an element the state may also jump to the completed index, which
/// is one past the last slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProdState<'a> {
  /// The production this state is part of.
  prod: Prod<'a>,

  /// The index of this production state. Must be in the range [0,
  /// self.prod.num_slots()].
  index: usize,
}

impl Ord for ProdState<'_> {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    (self.prod.id(), self.index).cmp(&(other.prod.id(), other.index))
  }
}

impl PartialOrd for ProdState<'_> {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl<'a> ProdState<'a> {
  /// Create a ProdState at the start of the given production.
  pub fn from_start(prod: Prod<'a>) -> Self {
    ProdState { prod, index: 0 }
  }

  /// Create the completed state of the given production.
  pub fn complete(prod: Prod<'a>) -> Self {
    ProdState {
      prod,
      index: prod.num_slots(),
    }
  }

  pub fn with_index(&self, index: usize) -> Self {
    assert!(index <= self.prod.num_slots());
    ProdState {
      prod: self.prod,
      index,
    }
  }

  pub fn prod(&self) -> Prod<'a> {
    self.prod
  }

  pub fn index(&self) -> usize {
    self.index
  }

  /// Returns the stack node at the current location. If it is at the end,
  /// then it returns `None`.
  pub fn next_node(&self) -> Option<&'a StackNode> {
    self.prod.node_at(self.index)
  }

  pub fn is_complete(&self) -> bool {
    self.prod.num_slots() == self.index
  }

  pub fn is_start(&self) -> bool {
    self.index == 0
  }

  /// True if the production may complete without consuming anything from
  /// this state: the start of a star list.
  pub fn allows_empty_completion(&self) -> bool {
    match self.prod.kind() {
      ProdKind::List(rep) => self.index == 0 && rep.allows_empty(),
      ProdKind::Default => false,
    }
  }

  /// Returns the states entered once the node at the current location has
  /// matched, one per successor array registered on that node for this
  /// production. Empty if the state is complete.
  pub fn advance(&self) -> Vec<ProdState<'a>> {
    match self.next_node() {
      Some(node) => node
        .successors(self.prod.id())
        .map(|rest| self.following(rest))
        .collect(),
      None => Vec::new(),
    }
  }

  /// The state whose remaining nodes are `rest`.
  fn following(&self, rest: &[StackNodeId]) -> ProdState<'a> {
    let slots = self.prod.num_slots();
    let index = match self.prod.kind() {
      ProdKind::Default => slots - rest.len(),
      ProdKind::List(_) if rest.is_empty() => slots,
      // A list continuation always ends with the element again.
      ProdKind::List(_) => (slots + 1 - rest.len()) % slots,
    };
    self.with_index(index)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::{build, examples, Production, Repetition, Symbol};

  #[test]
  fn test_default_advance() {
    let g = build("S", |gb| {
      gb.add_prod(Production::new(
        "S",
        "S",
        vec![Symbol::literal("a"), Symbol::literal("b")],
      ));
    })
    .unwrap();
    let start = ProdState::from_start(g.prod_by_label("S").unwrap());
    assert!(!start.is_complete());
    assert_eq!(start.next_node().unwrap().symbol(), &Symbol::literal("a"));

    let next = start.advance();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].index(), 1);
    let last = next[0].advance();
    assert!(last[0].is_complete());
    assert!(last[0].next_node().is_none());
    assert!(last[0].advance().is_empty());
  }

  #[test]
  fn test_list_advance_loops() {
    let g = build("S", |gb| {
      gb.add_prod(Production::list(
        "S",
        "S",
        Symbol::literal("a"),
        vec![Symbol::literal(","), Symbol::literal(";")],
        Repetition::Plus,
      ));
    })
    .unwrap();
    let prod = g.prod_by_label("S").unwrap();
    let start = ProdState::from_start(prod);
    assert!(!start.allows_empty_completion());

    let indices = |st: ProdState| -> Vec<usize> {
      st.advance().iter().map(|s| s.index()).collect()
    };
    assert_eq!(indices(start), vec![3, 1]);
    assert_eq!(indices(start.with_index(1)), vec![2]);
    assert_eq!(indices(start.with_index(2)), vec![0]);
    assert!(ProdState::complete(prod).is_complete());
  }

  #[test]
  fn test_unseparated_star_list() {
    let g = build("S", |gb| {
      gb.add_prod(Production::list(
        "S",
        "S",
        Symbol::literal("a"),
        vec![],
        Repetition::Star,
      ));
    })
    .unwrap();
    let start = ProdState::from_start(g.prod_by_label("S").unwrap());
    assert!(start.allows_empty_completion());
    let next: Vec<_> = start.advance().iter().map(|s| s.index()).collect();
    assert_eq!(next, vec![1, 0]);
  }

  #[test]
  fn test_advance_matches_the_slot_automaton() {
    let grammars = vec![
      examples::make_separated_plus(),
      examples::make_star(),
      examples::make_expr(),
      examples::make_opaque(),
    ];
    for g in grammars.into_iter().map(Result::unwrap) {
      for prod in g.prods() {
        let slots = prod.num_slots();
        for index in 0..slots {
          let state = ProdState::from_start(prod).with_index(index);
          let mut found: Vec<_> =
            state.advance().iter().map(|s| s.index()).collect();
          let mut wanted = match prod.kind() {
            ProdKind::Default => vec![index + 1],
            ProdKind::List(_) if index == 0 => vec![slots, 1 % slots],
            ProdKind::List(_) => vec![(index + 1) % slots],
          };
          found.sort_unstable();
          wanted.sort_unstable();
          assert_eq!(found, wanted, "{:?} at {}", prod, index);
        }
      }
    }
  }
}
