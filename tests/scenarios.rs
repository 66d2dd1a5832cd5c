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

use std::sync::Arc;

use sgll::{
  forest::{NodeContents, Span},
  grammar::{
    build, examples, ConfigurationError, Production, Repetition, Symbol,
  },
  parsers::{AmbiguityPolicy, ParseFailure, ParseOptions, Parser},
};

fn rejected_at(result: Result<sgll::forest::Node, ParseFailure>) -> usize {
  match result {
    Err(ParseFailure::Rejected(err)) => err.offset,
    other => panic!("expected a parse error, got {:?}", other),
  }
}

#[test]
fn separated_plus_list_parses() {
  let g = examples::make_separated_plus().unwrap();
  let root = Parser::new(&g).parse("ababa").unwrap();

  assert_eq!(root.span(), Span::new(0, 5));
  assert_eq!(root.tag().unwrap().str(), "S");
  let list = root.as_list().unwrap();
  assert_eq!(list.elements().count(), 3);
  assert_eq!(list.separators().count(), 2);
  assert_eq!(
    root.to_string(),
    "S[A(\"a\"), \"b\", A(\"a\"), \"b\", A(\"a\")]"
  );
}

#[test]
fn dangling_separator_is_rejected() {
  let g = examples::make_separated_plus().unwrap();
  let result = Parser::new(&g).parse("ab");
  match result {
    Err(ParseFailure::Rejected(err)) => {
      assert_eq!(err.offset, 2);
      assert!(err.expected.0.contains(&Symbol::literal("a")));
    }
    other => panic!("expected a parse error, got {:?}", other),
  }
}

#[test]
fn empty_input_needs_an_element() {
  let g = examples::make_separated_plus().unwrap();
  assert_eq!(rejected_at(Parser::new(&g).parse("")), 0);
}

#[test]
fn two_derivations_make_an_ambiguity_node() {
  let g = examples::make_ambiguous().unwrap();
  let root = Parser::new(&g).parse("a").unwrap();

  assert!(root.is_ambiguous());
  assert_eq!(root.symbol(), &Symbol::non_terminal("S"));
  assert_eq!(root.span(), Span::new(0, 1));
  let tags: Vec<_> = root
    .alternatives()
    .map(|alt| alt.tag().unwrap().str().to_string())
    .collect();
  assert_eq!(tags.len(), 2);
  assert!(tags.contains(&"ViaA".to_string()));
  assert!(tags.contains(&"ViaB".to_string()));
  for alt in root.alternatives() {
    assert_eq!(alt.span(), root.span());
    assert_eq!(alt.symbol(), root.symbol());
  }
}

#[test]
fn empty_star_list() {
  let g = examples::make_star().unwrap();
  let root = Parser::new(&g).parse("").unwrap();

  assert_eq!(root.span(), Span::new(0, 0));
  let list = root.as_list().unwrap();
  assert_eq!(list.elements().count(), 0);
  assert_eq!(list.separators().count(), 0);
}

#[test]
fn star_list_of_elements() {
  let g = examples::make_star().unwrap();
  let root = Parser::new(&g).parse("aaaa").unwrap();
  assert_eq!(root.as_list().unwrap().elements().count(), 4);
  assert_eq!(root.children().count(), 4);
}

#[test]
fn separators_are_one_fewer_than_elements() {
  let g = examples::make_opaque().unwrap();
  for (text, elements) in &[("", 0), ("a", 1), ("a;bc;d", 3), ("x;y", 2)] {
    let root = Parser::new(&g).parse(text).unwrap();
    let list = root.as_list().unwrap();
    assert_eq!(list.elements().count(), *elements, "{:?}", text);
    assert_eq!(
      list.separators().count(),
      elements.saturating_sub(1),
      "{:?}",
      text
    );
  }
  assert_eq!(rejected_at(Parser::new(&g).parse("a;")), 2);
}

#[test]
fn k_derivations_give_k_alternatives() {
  let g = examples::make_expr().unwrap();
  // Four operands can be bracketed five ways; the root splits them at one
  // of the three operators.
  let root = Parser::new(&g).parse("1+2*3+4").unwrap();
  assert!(root.is_ambiguous());
  assert_eq!(root.alternatives().count(), 3);
  assert_eq!(root.count_trees(), 5);
  assert_eq!(root.yield_text(), "1+2*3+4");
}

#[test]
fn parses_are_deterministic() {
  let g = examples::make_expr().unwrap();
  let parser = Parser::new(&g);
  let first = parser.parse("1*(2+3)+4*5").unwrap();
  let second = parser.parse("1*(2+3)+4*5").unwrap();
  assert_eq!(first, second);
  assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn fail_on_ambiguity_reports_the_node() {
  let g = examples::make_ambiguous().unwrap();
  let parser = Parser::new(&g)
    .with_options(ParseOptions::default().with_ambiguity(AmbiguityPolicy::Fail));
  match parser.parse("a") {
    Err(ParseFailure::Ambiguous(amb)) => {
      assert_eq!(amb.symbol, Symbol::non_terminal("S"));
      assert_eq!(amb.span, Span::new(0, 1));
    }
    other => panic!("expected an ambiguity, got {:?}", other),
  }

  // Unambiguous input is unaffected.
  let g = examples::make_separated_plus().unwrap();
  let parser = Parser::new(&g)
    .with_options(ParseOptions::default().with_ambiguity(AmbiguityPolicy::Fail));
  assert!(parser.parse("aba").is_ok());
}

#[test]
fn arity_mismatch_fails_before_parsing() {
  let result = build("S", |gb| {
    let a = gb.non_terminal(1, "A");
    gb.expect(
      Production::list(
        "S",
        "S",
        Symbol::non_terminal("A"),
        vec![Symbol::literal("b")],
        Repetition::Plus,
      ),
      &[a],
    );
  });
  assert!(matches!(
    result.unwrap_err(),
    ConfigurationError::ArityMismatch {
      arity: 2,
      wired: 1,
      ..
    }
  ));
}

#[test]
fn cyclic_grammar_keeps_acyclic_derivation() {
  let g = examples::make_cyclic().unwrap();
  let root = Parser::new(&g).parse("a").unwrap();
  assert!(!root.is_ambiguous());
  assert_eq!(root.tag().unwrap().str(), "Leaf");
}

#[test]
fn parse_symbol_starts_anywhere() {
  let g = examples::make_expr().unwrap();
  let num = Parser::new(&g)
    .parse_symbol(&Symbol::non_terminal("Num"), "123")
    .unwrap();
  assert_eq!(num.tag().unwrap().str(), "Num");
  assert!(matches!(
    num.children().next().unwrap().contents(),
    NodeContents::List(_)
  ));
  assert_eq!(
    rejected_at(
      Parser::new(&g).parse_symbol(&Symbol::non_terminal("Num"), "1+2")
    ),
    1
  );
}

#[test]
fn recognize_only_builds_the_chart() {
  let g = examples::make_expr().unwrap();
  let chart = Parser::new(&g).recognize("1+2").unwrap();
  assert!(chart.accepts(g.start_symbol(), 3));
  assert_eq!(chart.furthest(), 3);
  assert!(Parser::new(&g).recognize("1+").is_err());
}

#[test]
fn grammar_is_shared_between_threads() {
  let g = Arc::new(examples::make_expr().unwrap());
  let inputs = vec!["1+2", "3*4*5", "(6)", "7+8*9"];
  let expected: Vec<_> = inputs
    .iter()
    .map(|text| Parser::new(&g).parse(text).unwrap())
    .collect();

  let handles: Vec<_> = inputs
    .into_iter()
    .map(|text| {
      let g = g.clone();
      std::thread::spawn(move || Parser::new(&g).parse(text).unwrap())
    })
    .collect();

  for (handle, expected) in handles.into_iter().zip(expected) {
    assert_eq!(handle.join().unwrap(), expected);
  }
}
