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

use crate::utils::{Name, ToDoc};

/// An inclusive range of characters, `start..=end`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharRange {
  start: char,
  end: char,
}

impl CharRange {
  /// Creates a range. The bounds are swapped if given in reverse order.
  pub fn new(start: char, end: char) -> Self {
    if start <= end {
      CharRange { start, end }
    } else {
      CharRange {
        start: end,
        end: start,
      }
    }
  }

  pub fn single(c: char) -> Self {
    CharRange { start: c, end: c }
  }

  pub fn start(&self) -> char {
    self.start
  }

  pub fn end(&self) -> char {
    self.end
  }

  pub fn contains(&self, c: char) -> bool {
    self.start <= c && c <= self.end
  }
}

impl std::fmt::Debug for CharRange {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.start == self.end {
      write!(f, "{}", self.start.escape_debug())
    } else {
      write!(f, "{}-{}", self.start.escape_debug(), self.end.escape_debug())
    }
  }
}

/// A set of characters, stored as sorted, non-overlapping, non-adjacent
/// ranges. Two classes describing the same set of characters compare equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharClass(Vec<CharRange>);

impl CharClass {
  pub fn new(ranges: impl IntoIterator<Item = CharRange>) -> Self {
    let mut ranges: Vec<_> = ranges.into_iter().collect();
    ranges.sort();

    let mut merged: Vec<CharRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
      match merged.last_mut() {
        Some(last) if (last.end as u32).saturating_add(1) >= range.start as u32 => {
          if range.end > last.end {
            last.end = range.end;
          }
        }
        _ => merged.push(range),
      }
    }

    CharClass(merged)
  }

  pub fn ranges(&self) -> &[CharRange] {
    &self.0
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn contains(&self, c: char) -> bool {
    // Ranges are sorted and disjoint, so a binary search finds the only
    // candidate.
    match self.0.binary_search_by(|r| r.start.cmp(&c)) {
      Ok(_) => true,
      Err(0) => false,
      Err(index) => self.0[index - 1].contains(c),
    }
  }
}

impl std::fmt::Debug for CharClass {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    f.write_str("[")?;
    for range in &self.0 {
      write!(f, "{:?}", range)?;
    }
    f.write_str("]")
  }
}

/// The number of elements a separated list requires.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Repetition {
  /// One or more elements.
  Plus,
  /// Zero or more elements.
  Star,
}

impl Repetition {
  pub fn allows_empty(self) -> bool {
    matches!(self, Repetition::Star)
  }

  fn suffix(self) -> &'static str {
    match self {
      Repetition::Plus => "+",
      Repetition::Star => "*",
    }
  }
}

/// A grammar symbol.
///
/// Symbols are plain values: two symbols built the same way are equal, and
/// symbols are totally ordered so they may key maps in the grammar and in
/// the parser's memo tables.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
  /// A fixed character sequence, matched directly against the input.
  Literal(Name),
  /// A single character from a set of ranges.
  CharClass(CharClass),
  /// A reference to the productions of a named nonterminal.
  NonTerminal(Name),
  /// `element (separators element)*`, with at least one element for
  /// `Repetition::Plus`.
  SeparatedList {
    element: Box<Symbol>,
    separators: Vec<Symbol>,
    repetition: Repetition,
  },
}

impl Symbol {
  pub fn literal(text: impl Into<Name>) -> Self {
    Symbol::Literal(text.into())
  }

  pub fn char_class(ranges: impl IntoIterator<Item = CharRange>) -> Self {
    Symbol::CharClass(CharClass::new(ranges))
  }

  pub fn non_terminal(name: impl Into<Name>) -> Self {
    Symbol::NonTerminal(name.into())
  }

  pub fn separated_list(
    element: Symbol,
    separators: impl IntoIterator<Item = Symbol>,
    repetition: Repetition,
  ) -> Self {
    Symbol::SeparatedList {
      element: Box::new(element),
      separators: separators.into_iter().collect(),
      repetition,
    }
  }

  pub fn plus_list(
    element: Symbol,
    separators: impl IntoIterator<Item = Symbol>,
  ) -> Self {
    Symbol::separated_list(element, separators, Repetition::Plus)
  }

  pub fn star_list(
    element: Symbol,
    separators: impl IntoIterator<Item = Symbol>,
  ) -> Self {
    Symbol::separated_list(element, separators, Repetition::Star)
  }

  /// Returns true if this symbol matches input characters directly.
  pub fn is_terminal(&self) -> bool {
    matches!(self, Symbol::Literal(_) | Symbol::CharClass(_))
  }

  /// Returns true if this symbol is recognized through productions.
  pub fn has_productions(&self) -> bool {
    !self.is_terminal()
  }

  pub fn as_non_terminal(&self) -> Option<&Name> {
    match self {
      Symbol::NonTerminal(name) => Some(name),
      _ => None,
    }
  }

  pub fn repetition(&self) -> Option<Repetition> {
    match self {
      Symbol::SeparatedList { repetition, .. } => Some(*repetition),
      _ => None,
    }
  }

  /// Returns every symbol this symbol refers to directly, including
  /// the element and separators of lists.
  pub fn referenced(&self) -> Vec<&Symbol> {
    match self {
      Symbol::SeparatedList {
        element,
        separators,
        ..
      } => std::iter::once(&**element).chain(separators.iter()).collect(),
      _ => Vec::new(),
    }
  }
}

impl std::fmt::Debug for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Symbol::Literal(text) => write!(f, "{:?}", text.str()),
      Symbol::CharClass(class) => write!(f, "{:?}", class),
      Symbol::NonTerminal(name) => write!(f, "{}", name),
      Symbol::SeparatedList {
        element,
        separators,
        repetition,
      } => {
        write!(f, "{{{:?}", element)?;
        for sep in separators {
          write!(f, " {:?}", sep)?;
        }
        write!(f, "}}{}", repetition.suffix())
      }
    }
  }
}

impl std::fmt::Display for Symbol {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    std::fmt::Debug::fmt(self, f)
  }
}

impl From<&Symbol> for Symbol {
  fn from(s: &Symbol) -> Self {
    s.clone()
  }
}

/// A bare string names a nonterminal.
impl From<&str> for Symbol {
  fn from(name: &str) -> Self {
    Symbol::non_terminal(name)
  }
}

impl ToDoc for Symbol {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    match self {
      Symbol::SeparatedList {
        element,
        separators,
        repetition,
      } => da
        .text("{")
        .append(da.intersperse(
          std::iter::once(element.to_doc(da))
            .chain(separators.iter().map(|s| s.to_doc(da))),
          da.softline(),
        ))
        .append(da.text("}"))
        .append(da.text(repetition.suffix())),
      other => da.text(format!("{:?}", other)),
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_char_class_normalizes() {
    let a = CharClass::new(vec![
      CharRange::new('d', 'f'),
      CharRange::single('a'),
      CharRange::new('b', 'c'),
    ]);
    let b = CharClass::new(vec![CharRange::new('f', 'a')]);
    assert_eq!(a, b);
    assert_eq!(a.ranges().len(), 1);
  }

  #[test]
  fn test_char_class_contains() {
    let digits_or_x = CharClass::new(vec![
      CharRange::new('0', '9'),
      CharRange::single('x'),
    ]);
    assert!(digits_or_x.contains('0'));
    assert!(digits_or_x.contains('5'));
    assert!(digits_or_x.contains('x'));
    assert!(!digits_or_x.contains('a'));
    assert!(!digits_or_x.contains('y'));
    assert!(!CharClass::new(vec![]).contains('a'));
  }

  #[test]
  fn test_symbol_debug() {
    let list = Symbol::plus_list(
      Symbol::non_terminal("A"),
      vec![Symbol::literal("b")],
    );
    assert_eq!(format!("{:?}", list), "{A \"b\"}+");
    assert_eq!(
      format!("{:?}", Symbol::char_class(vec![CharRange::new('a', 'z')])),
      "[a-z]"
    );
  }

  #[test]
  fn test_symbols_compare_structurally() {
    let a = Symbol::star_list(Symbol::non_terminal("A"), vec![]);
    let b = Symbol::separated_list(
      Symbol::non_terminal("A"),
      vec![],
      Repetition::Star,
    );
    assert_eq!(a, b);
    assert_ne!(a, Symbol::plus_list(Symbol::non_terminal("A"), vec![]));
  }
}
