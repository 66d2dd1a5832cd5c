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

//! A scannerless generalized recognizer.
//!
//! Recognition drives stack nodes directly over the input characters. Each
//! item is a production state together with the offset its production
//! started at (`origin`) and the offset it has reached (`pos`). Items are
//! processed exactly once, in FIFO order from a work list.
//!
//! When an item reaches a nonterminal or list node, it calls that symbol at
//! its position. The first call of a symbol at an offset starts every
//! production of the symbol there; later calls only attach to the memo
//! entry as waiters, and are resumed with every end offset the call has
//! produced or will produce. Because a call is never started twice, left
//! recursion terminates: the recursive call simply waits on itself.

pub mod chart;

use std::collections::VecDeque;

use {
  self::chart::{Chart, Child, ItemKey, Link},
  crate::{
    grammar::{Grammar, Symbol},
    parsers::{Input, Span},
    stack::Step,
    state::ProdState,
  },
};

struct Recognizer<'g, 'i> {
  grammar: &'g Grammar,
  input: &'i Input,
  chart: Chart<'g>,
  queue: VecDeque<ItemKey<'g>>,
}

impl<'g, 'i> Recognizer<'g, 'i> {
  fn new(grammar: &'g Grammar, input: &'i Input) -> Self {
    Recognizer {
      grammar,
      input,
      chart: Chart::new(grammar),
      queue: VecDeque::new(),
    }
  }

  fn run(mut self, symbol: &'g Symbol) -> Chart<'g> {
    self.call(symbol, 0, None);
    while let Some(item) = self.queue.pop_front() {
      self.process(item);
    }
    self.chart
  }

  fn add(&mut self, key: ItemKey<'g>, link: Option<Link>) {
    if self.chart.add_item(key, link) {
      self.queue.push_back(key);
    }
  }

  /// Calls `symbol` at `offset`, on behalf of `waiter` if given.
  fn call(
    &mut self,
    symbol: &'g Symbol,
    offset: usize,
    waiter: Option<ItemKey<'g>>,
  ) {
    let grammar = self.grammar;
    let started = self.chart.calls.contains_key(&(symbol, offset));
    let entry = self.chart.calls.entry((symbol, offset)).or_default();
    let mut results = Vec::new();
    if let Some(waiter) = waiter {
      if entry.waiters.insert(waiter) {
        results.extend(entry.results.iter().copied());
      }
    }

    if !started {
      log::trace!("Calling {:?} at {}", symbol, offset);
      for prod_id in grammar.prods_for(symbol) {
        let state = ProdState::from_start(grammar.prod(*prod_id));
        self.add(
          ItemKey {
            pos: offset,
            state,
            origin: offset,
          },
          None,
        );
      }
    }

    if let Some(waiter) = waiter {
      for end in results {
        self.resume(waiter, end);
      }
    }
  }

  /// Advances `waiter` past its current node, which matched up to `end`.
  fn resume(&mut self, waiter: ItemKey<'g>, end: usize) {
    let node = waiter
      .state
      .next_node()
      .expect("Only items before a node wait on a call.");
    let link = Link {
      prev_pos: waiter.pos,
      prev_index: waiter.state.index(),
      child: Some(Child {
        node: node.id(),
        span: Span::new(waiter.pos, end),
      }),
    };

    for state in waiter.state.advance() {
      self.add(
        ItemKey {
          pos: end,
          state,
          origin: waiter.origin,
        },
        Some(link),
      );
    }
  }

  fn process(&mut self, item: ItemKey<'g>) {
    if item.state.is_complete() {
      self.complete(item);
      return;
    }

    // The zero-width completion of a star list is only possible where the
    // list began, so it is attempted at most once per offset.
    if item.state.allows_empty_completion() && item.pos == item.origin {
      self.add(
        ItemKey {
          state: ProdState::complete(item.state.prod()),
          ..item
        },
        Some(Link {
          prev_pos: item.pos,
          prev_index: item.state.index(),
          child: None,
        }),
      );
    }

    let node = item
      .state
      .next_node()
      .expect("Incomplete states always have a next node.");
    let input = self.input;
    if node.is_terminal() {
      let end = self.chart.scan(node.id(), item.pos, || {
        match node.step(input, item.pos) {
          Step::Matched(end) => Some(end),
          _ => None,
        }
      });
      if let Some(end) = end {
        self.resume(item, end);
      }
    } else if let Step::Call(symbol) = node.step(input, item.pos) {
      self.call(symbol, item.pos, Some(item));
    }
  }

  fn complete(&mut self, item: ItemKey<'g>) {
    let prod = item.state.prod();
    let lhs = prod.lhs();
    let span = Span::new(item.origin, item.pos);
    log::trace!("Completed {} over {:?}", prod.label(), span);
    self.chart.record_completion(lhs, span, prod.id());

    let entry = self
      .chart
      .calls
      .get_mut(&(lhs, item.origin))
      .expect("Productions are only started by a call.");
    if entry.results.insert(item.pos) {
      let waiters: Vec<_> = entry.waiters.iter().copied().collect();
      for waiter in waiters {
        self.resume(waiter, item.pos);
      }
    }
  }
}

/// Recognizes `symbol` over the whole of `input`, returning the filled-in
/// chart. The caller decides acceptance from the chart.
pub fn recognize<'g>(
  grammar: &'g Grammar,
  input: &Input,
  symbol: &Symbol,
) -> Chart<'g> {
  match grammar.try_get_rule(symbol) {
    Some(rule) => Recognizer::new(grammar, input).run(rule.head()),
    None => Chart::new(grammar),
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::grammar::examples;

  fn accepts(g: &Grammar, text: &str) -> bool {
    let input = Input::new(text);
    recognize(g, &input, g.start_symbol()).accepts(g.start_symbol(), input.len())
  }

  #[test]
  fn test_separated_plus() {
    let g = examples::make_separated_plus().unwrap();
    assert!(accepts(&g, "a"));
    assert!(accepts(&g, "aba"));
    assert!(accepts(&g, "ababa"));
    assert!(!accepts(&g, ""));
    assert!(!accepts(&g, "ab"));
    assert!(!accepts(&g, "aa"));
  }

  #[test]
  fn test_star_accepts_empty() {
    let g = examples::make_star().unwrap();
    assert!(accepts(&g, ""));
    assert!(accepts(&g, "aaa"));
    assert!(!accepts(&g, "ab"));
  }

  #[test]
  fn test_left_recursion_terminates() {
    let g = examples::make_expr().unwrap();
    assert!(accepts(&g, "1+23*4"));
    assert!(accepts(&g, "(1+2)*3"));
    assert!(!accepts(&g, "1+"));
  }

  #[test]
  fn test_cyclic_grammar_terminates() {
    let g = examples::make_cyclic().unwrap();
    assert!(accepts(&g, "a"));
    assert!(!accepts(&g, "aa"));
  }

  #[test]
  fn test_furthest_offset() {
    let g = examples::make_separated_plus().unwrap();
    let input = Input::new("abx");
    let chart = recognize(&g, &input, g.start_symbol());
    let err = chart.parse_error(g.start_symbol());
    assert_eq!(err.offset, 2);
    assert_eq!(
      err.expected.0.into_iter().collect::<Vec<_>>(),
      vec![Symbol::literal("a")]
    );
  }

  #[test]
  fn test_chart_queries_take_any_equal_symbol() {
    let g = examples::make_separated_plus().unwrap();
    let input = Input::new("aba");
    let chart = recognize(&g, &input, g.start_symbol());

    let s = Symbol::non_terminal("S");
    assert!(chart.accepts(&s, 3));
    assert_eq!(chart.completed(&s, Span::new(0, 3)).count(), 1);
    assert_eq!(chart.ends(&s, 0).collect::<Vec<_>>(), vec![1, 3]);
    assert!(!chart.accepts(&Symbol::non_terminal("Nope"), 3));
  }

  #[test]
  fn test_undefined_symbol_is_rejected() {
    let g = examples::make_star().unwrap();
    let input = Input::new("a");
    let chart = recognize(&g, &input, &Symbol::non_terminal("Nope"));
    assert_eq!(chart.num_items(), 0);
  }
}
