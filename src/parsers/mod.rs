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

use std::collections::BTreeSet;

use crate::{
  forest::{ForestBuilder, Node},
  grammar::{Grammar, Symbol},
  utils::fmt::set_fmt,
};

pub mod sgll;

pub use sgll::chart::Chart;

/// A half-open range `[start, end)` of character offsets into an input.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
  pub start: usize,
  pub end: usize,
}

impl Span {
  pub fn new(start: usize, end: usize) -> Self {
    assert!(start <= end, "Span start must not exceed its end.");
    Span { start, end }
  }

  pub fn len(&self) -> usize {
    self.end - self.start
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.end
  }
}

impl std::fmt::Debug for Span {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    write!(f, "[{},{})", self.start, self.end)
  }
}

/// The raw text being parsed, materialized as characters.
///
/// Offsets everywhere in the parser count characters, not bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Input {
  chars: Vec<char>,
}

impl Input {
  pub fn new(text: &str) -> Self {
    Input {
      chars: text.chars().collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.chars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.chars.is_empty()
  }

  pub fn char_at(&self, offset: usize) -> Option<char> {
    self.chars.get(offset).copied()
  }

  /// Returns the characters in `[start, end)`, or `None` if that range runs
  /// past the end of the input.
  pub fn chars(&self, start: usize, end: usize) -> Option<&[char]> {
    self.chars.get(start..end)
  }

  pub fn slice(&self, span: Span) -> String {
    self.chars[span.start..span.end].iter().collect()
  }
}

impl From<&str> for Input {
  fn from(text: &str) -> Self {
    Input::new(text)
  }
}

/// What to do when a parse yields more than one derivation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AmbiguityPolicy {
  /// Keep every derivation as an ambiguity node in the forest.
  Preserve,
  /// Report the first ambiguity found as an error.
  Fail,
}

impl Default for AmbiguityPolicy {
  fn default() -> Self {
    AmbiguityPolicy::Preserve
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ParseOptions {
  pub ambiguity: AmbiguityPolicy,
}

impl ParseOptions {
  pub fn with_ambiguity(self, ambiguity: AmbiguityPolicy) -> Self {
    ParseOptions { ambiguity, ..self }
  }
}

/// No derivation of the requested symbol spans the whole input.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error(
  "could not parse {symbol:?}: stopped at offset {offset}, expected one of {expected}"
)]
pub struct ParseError {
  pub symbol: Symbol,
  /// The furthest offset reached by any partial derivation.
  pub offset: usize,
  /// The terminals some partial derivation could have continued with at
  /// `offset`.
  pub expected: ExpectedSet,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ExpectedSet(pub BTreeSet<Symbol>);

impl std::fmt::Display for ExpectedSet {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.0.is_empty() {
      write!(f, "end of input")
    } else {
      write!(f, "{:?}", set_fmt(&self.0))
    }
  }
}

/// An ambiguity node was found while the caller asked to fail on ambiguity.
#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
#[error("{symbol:?} is ambiguous over {span:?}")]
pub struct AmbiguityDetected {
  pub symbol: Symbol,
  pub span: Span,
}

#[derive(thiserror::Error, Clone, PartialEq, Eq, Debug)]
pub enum ParseFailure {
  #[error(transparent)]
  Rejected(#[from] ParseError),
  #[error(transparent)]
  Ambiguous(#[from] AmbiguityDetected),
}

/// Parses inputs against a grammar.
///
/// A parser only borrows its grammar; any number of parsers, on any number
/// of threads, may share one grammar. Each call to `parse` owns its own
/// memo tables.
#[derive(Clone, Copy, Debug)]
pub struct Parser<'g> {
  grammar: &'g Grammar,
  options: ParseOptions,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Parser {
      grammar,
      options: ParseOptions::default(),
    }
  }

  pub fn with_options(self, options: ParseOptions) -> Self {
    Parser { options, ..self }
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn options(&self) -> ParseOptions {
    self.options
  }

  /// Parses `text` as the grammar's start symbol.
  pub fn parse(&self, text: &str) -> Result<Node, ParseFailure> {
    self.parse_symbol(self.grammar.start_symbol(), text)
  }

  /// Parses `text` as `symbol`, which must span the whole input.
  pub fn parse_symbol(
    &self,
    symbol: &Symbol,
    text: &str,
  ) -> Result<Node, ParseFailure> {
    let input = Input::new(text);
    let chart = self.recognize_input(symbol, &input)?;
    let root = ForestBuilder::new(self.grammar, &input, &chart)
      .build(symbol, Span::new(0, input.len()))
      .ok_or_else(|| chart.parse_error(symbol))?;

    if self.options.ambiguity == AmbiguityPolicy::Fail {
      if let Some(err) = root.find_ambiguity() {
        return Err(err.into());
      }
    }

    Ok(root)
  }

  /// Runs recognition only, returning the chart of every partial
  /// derivation of the start symbol.
  pub fn recognize(&self, text: &str) -> Result<Chart<'g>, ParseError> {
    self.recognize_input(self.grammar.start_symbol(), &Input::new(text))
  }

  fn recognize_input(
    &self,
    symbol: &Symbol,
    input: &Input,
  ) -> Result<Chart<'g>, ParseError> {
    log::debug!("Parsing {:?} over {} characters", symbol, input.len());
    let chart = sgll::recognize(self.grammar, input, symbol);
    log::debug!(
      "Finished with {} items, furthest offset {}",
      chart.num_items(),
      chart.furthest()
    );

    if chart.accepts(symbol, input.len()) {
      Ok(chart)
    } else {
      Err(chart.parse_error(symbol))
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_input_is_char_indexed() {
    let input = Input::new("héllo");
    assert_eq!(input.len(), 5);
    assert_eq!(input.char_at(1), Some('é'));
    assert_eq!(input.slice(Span::new(1, 3)), "él");
    assert_eq!(input.chars(4, 6), None);
    assert_eq!(input.chars(5, 5), Some(&[][..]));
  }

  #[test]
  fn test_options_default_preserves() {
    let opts = ParseOptions::default();
    assert_eq!(opts.ambiguity, AmbiguityPolicy::Preserve);
    assert_eq!(
      opts.with_ambiguity(AmbiguityPolicy::Fail).ambiguity,
      AmbiguityPolicy::Fail
    );
  }

  #[test]
  fn test_expected_set_display() {
    assert_eq!(ExpectedSet::default().to_string(), "end of input");
    let set = ExpectedSet(vec![Symbol::literal("b")].into_iter().collect());
    assert_eq!(set.to_string(), "{\"b\"}");
  }
}
