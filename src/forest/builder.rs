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
  super::Node,
  crate::{
    grammar::{Grammar, Prod, ProdKind, Symbol},
    parsers::{
      sgll::chart::{Chart, Child, ItemKey},
      Input, Span,
    },
    state::ProdState,
  },
  std::collections::{BTreeMap, BTreeSet},
};

/// Materializes the reductions recorded in a chart as a forest.
///
/// Each `(symbol, span)` is built at most once and shared by every parent
/// that refers to it. A derivation that needs the very `(symbol, span)` it
/// is building (a grammar cycle) is dropped; the forest holds every acyclic
/// derivation.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ForestBuilder<'g, 'c> {
  #[derivative(Debug = "ignore")]
  grammar: &'g Grammar,
  #[derivative(Debug = "ignore")]
  input: &'c Input,
  chart: &'c Chart<'g>,
  memo: BTreeMap<(&'g Symbol, Span), Option<Node>>,
  in_progress: Vec<(&'g Symbol, Span)>,
  /// The shallowest in-progress entry a cut has referred to since it was
  /// last cleared.
  cut: Option<usize>,
}

impl<'g, 'c> ForestBuilder<'g, 'c> {
  pub fn new(grammar: &'g Grammar, input: &'c Input, chart: &'c Chart<'g>) -> Self {
    ForestBuilder {
      grammar,
      input,
      chart,
      memo: BTreeMap::new(),
      in_progress: Vec::new(),
      cut: None,
    }
  }

  /// Builds the node for `symbol` over `span`, or `None` if the chart
  /// holds no derivation of it.
  pub fn build(&mut self, symbol: &Symbol, span: Span) -> Option<Node> {
    let symbol = self.grammar.try_get_rule(symbol)?.head();
    let result = self.build_symbol(symbol, span);
    log::debug!("Built forest with {} shared nodes", self.memo.len());
    result
  }

  fn build_symbol(&mut self, symbol: &'g Symbol, span: Span) -> Option<Node> {
    let key = (symbol, span);
    if let Some(result) = self.memo.get(&key) {
      return result.clone();
    }

    if let Some(depth) = self.in_progress.iter().position(|k| *k == key) {
      log::trace!("Cutting cyclic derivation of {:?} over {:?}", symbol, span);
      self.cut = Some(self.cut.map_or(depth, |d| d.min(depth)));
      return None;
    }

    let depth = self.in_progress.len();
    self.in_progress.push(key);
    let outer_cut = self.cut.take();

    let grammar = self.grammar;
    let prods: Vec<_> = self.chart.completed(symbol, span).collect();
    let mut alternatives = Vec::new();
    for prod in prods.into_iter().map(|id| grammar.prod(id)) {
      for children in self.derivations(prod, span) {
        alternatives.extend(self.reduce(prod, span, &children));
      }
    }

    self.in_progress.pop();
    let result = Node::new_ambiguity(symbol.clone(), span, alternatives);
    if let Some(node) = result.as_ref().filter(|n| n.is_ambiguous()) {
      log::trace!(
        "{:?} over {:?} has {} alternatives",
        symbol,
        span,
        node.alternatives().count()
      );
    }

    // A cut that refers to an entry below this one makes the result depend
    // on how this entry was reached, so it is not shared.
    let inner_cut = self.cut.take().filter(|d| *d < depth);
    self.cut = match (outer_cut, inner_cut) {
      (Some(a), Some(b)) => Some(a.min(b)),
      (a, b) => a.or(b),
    };
    if inner_cut.is_none() {
      self.memo.insert(key, result.clone());
    }

    result
  }

  fn reduce(&mut self, prod: Prod<'g>, span: Span, children: &[Child]) -> Option<Node> {
    let grammar = self.grammar;
    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
      let stack_node = grammar.node(child.node);
      let node = if stack_node.is_terminal() {
        Node::new_leaf(
          stack_node.symbol().clone(),
          self.input.slice(child.span),
          child.span,
        )
      } else {
        self.build_symbol(stack_node.symbol(), child.span)?
      };
      nodes.push(node);
    }

    let production = prod.production();
    Some(if production.is_list() {
      Node::new_list(
        prod.label().clone(),
        prod.lhs().clone(),
        span,
        production.separator_arity(),
        nodes,
      )
    } else {
      Node::new_branch(prod.label().clone(), prod.lhs().clone(), span, nodes)
    })
  }

  /// Returns the child sequence of every way `prod` was completed over
  /// `span`, by walking links back from the completed item to the item the
  /// production started with. A path never visits an item twice, so
  /// zero-width loops are cut.
  ///
  /// A list without separators never holds a zero-width element, except
  /// as the sole element of an empty `+` list.
  fn derivations(&self, prod: Prod<'g>, span: Span) -> Vec<Vec<Child>> {
    let keep_empty = match prod.kind() {
      ProdKind::List(rep) if prod.production().separator_arity() == 0 => {
        span.is_empty() && !rep.allows_empty()
      }
      _ => true,
    };
    let complete = ItemKey {
      pos: span.end,
      state: ProdState::complete(prod),
      origin: span.start,
    };
    let mut walk = Walk {
      chart: self.chart,
      keep_empty,
      path: Vec::new(),
      visited: BTreeSet::new(),
      paths: Vec::new(),
    };
    walk.visit(complete);
    walk.paths
  }
}

/// A depth-first search over the links of one production's items.
struct Walk<'g, 'c> {
  chart: &'c Chart<'g>,
  keep_empty: bool,
  path: Vec<Child>,
  visited: BTreeSet<(usize, usize)>,
  paths: Vec<Vec<Child>>,
}

impl<'g> Walk<'g, '_> {
  fn visit(&mut self, key: ItemKey<'g>) {
    let here = (key.pos, key.state.index());
    if !self.visited.insert(here) {
      return;
    }

    if key.pos == key.origin && key.state.is_start() {
      self.paths.push(self.path.iter().rev().copied().collect());
    } else {
      let chart = self.chart;
      for link in chart.links(&key) {
        if let Some(child) = link.child {
          if child.span.is_empty() && !self.keep_empty {
            continue;
          }
        }
        let prev = ItemKey {
          pos: link.prev_pos,
          state: key.state.with_index(link.prev_index),
          origin: key.origin,
        };
        self.path.extend(link.child);
        self.visit(prev);
        if link.child.is_some() {
          self.path.pop();
        }
      }
    }

    self.visited.remove(&here);
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{grammar::examples, parsers::sgll::recognize};

  fn forest(g: &Grammar, text: &str) -> Option<Node> {
    let input = Input::new(text);
    let chart = recognize(g, &input, g.start_symbol());
    ForestBuilder::new(g, &input, &chart)
      .build(g.start_symbol(), Span::new(0, input.len()))
  }

  #[test]
  fn test_separated_plus_forest() {
    let g = examples::make_separated_plus().unwrap();
    let root = forest(&g, "ababa").unwrap();
    assert_eq!(
      root.to_string(),
      "S[A(\"a\"), \"b\", A(\"a\"), \"b\", A(\"a\")]"
    );
    assert_eq!(root.span(), Span::new(0, 5));
  }

  #[test]
  fn test_cycles_are_cut() {
    let g = examples::make_cyclic().unwrap();
    let root = forest(&g, "a").unwrap();
    assert_eq!(root.to_string(), "Leaf(\"a\")");
    assert_eq!(root.count_trees(), 1);
  }

  #[test]
  fn test_ambiguous_expression() {
    let g = examples::make_expr().unwrap();
    let root = forest(&g, "1+2+3").unwrap();
    assert!(root.is_ambiguous());
    assert_eq!(root.alternatives().count(), 2);
    assert_eq!(root.yield_text(), "1+2+3");

    // Five operands have fourteen bracketings.
    let root = forest(&g, "1+2+3+4+5").unwrap();
    assert_eq!(root.count_trees(), 14);
  }

  fn nullable_list(
    separators: Vec<Symbol>,
    repetition: crate::grammar::Repetition,
  ) -> Grammar {
    crate::grammar::build("S", |gb| {
      gb.add_rule("S", |rb| {
        rb.add_list_prod("S", "A", separators, repetition);
      })
      .add_rule("A", |rb| {
        rb.add_prod("Aa", |pb| {
          pb.add_literal("a");
        })
        .add_prod("Ae", |_| {});
      });
    })
    .unwrap()
  }

  #[test]
  fn test_unseparated_lists_skip_empty_elements() {
    use crate::grammar::Repetition;

    let g = nullable_list(vec![], Repetition::Star);
    let root = forest(&g, "aa").unwrap();
    assert!(!root.is_ambiguous());
    assert_eq!(root.to_string(), "S[Aa(\"a\"), Aa(\"a\")]");
    assert_eq!(forest(&g, "").unwrap().to_string(), "S[]");

    let g = nullable_list(vec![], Repetition::Plus);
    assert_eq!(forest(&g, "a").unwrap().to_string(), "S[Aa(\"a\")]");
    assert_eq!(forest(&g, "").unwrap().to_string(), "S[Ae()]");
  }

  #[test]
  fn test_separated_lists_keep_empty_elements() {
    use crate::grammar::Repetition;

    let g = nullable_list(vec![Symbol::literal(",")], Repetition::Star);
    let root = forest(&g, ",a,").unwrap();
    assert!(!root.is_ambiguous());
    assert_eq!(
      root.to_string(),
      "S[Ae(), \",\", Aa(\"a\"), \",\", Ae()]"
    );

    // The empty list and the single empty element both span "".
    let root = forest(&g, "").unwrap();
    assert_eq!(root.alternatives().count(), 2);
  }

  #[test]
  fn test_no_derivation() {
    let g = examples::make_separated_plus().unwrap();
    assert!(forest(&g, "ab").is_none());
  }
}
