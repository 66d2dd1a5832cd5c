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

use super::symbol::{Repetition, Symbol};
use crate::utils::{Name, ToDoc};

/// A flag attached to a production.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Attr {
  /// The production describes lexical structure. AST construction hands the
  /// matched text to the constructor instead of the children.
  Lexical,
  /// The production only groups its single nonterminal child, e.g.
  /// `"(" Expr ")"`. AST construction passes the child through.
  Bracket,
  /// Layout insensitivity flag. Carried for consumers; the parser itself
  /// never inserts layout.
  NoLayout,
  /// The production delimits an embedded fragment that has no structure to
  /// visit.
  Opaque,
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Attributes(BTreeSet<Attr>);

impl Attributes {
  pub fn new() -> Self {
    Attributes(BTreeSet::new())
  }

  pub fn has(&self, attr: Attr) -> bool {
    self.0.contains(&attr)
  }

  pub fn iter(&self) -> impl Iterator<Item = Attr> + '_ {
    self.0.iter().copied()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  fn with(&self, attr: Attr) -> Self {
    let mut attrs = self.0.clone();
    attrs.insert(attr);
    Attributes(attrs)
  }
}

impl std::iter::FromIterator<Attr> for Attributes {
  fn from_iter<I: IntoIterator<Item = Attr>>(iter: I) -> Self {
    Attributes(iter.into_iter().collect())
  }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ProdKind {
  /// The rhs is matched in order, once.
  Default,
  /// The rhs is `[element, separators..]`, repeated as a separated list.
  List(Repetition),
}

/// A production of a grammar: `lhs ::= rhs`.
///
/// The label is the production's tag. It identifies the production within
/// its grammar, and is what forest nodes carry and what AST construction
/// dispatches on.
///
/// Productions are immutable values; the `with_*` methods return an
/// updated copy.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Production {
  label: Name,
  lhs: Symbol,
  rhs: Vec<Symbol>,
  attributes: Attributes,
  kind: ProdKind,
}

impl Production {
  pub fn new(
    label: impl Into<Name>,
    lhs: impl Into<Symbol>,
    rhs: impl IntoIterator<Item = Symbol>,
  ) -> Self {
    Production {
      label: label.into(),
      lhs: lhs.into(),
      rhs: rhs.into_iter().collect(),
      attributes: Attributes::new(),
      kind: ProdKind::Default,
    }
  }

  /// Creates a list production for `lhs`, whose rhs is the element followed
  /// by the separators.
  pub fn list(
    label: impl Into<Name>,
    lhs: impl Into<Symbol>,
    element: Symbol,
    separators: impl IntoIterator<Item = Symbol>,
    repetition: Repetition,
  ) -> Self {
    Production {
      label: label.into(),
      lhs: lhs.into(),
      rhs: std::iter::once(element).chain(separators).collect(),
      attributes: Attributes::new(),
      kind: ProdKind::List(repetition),
    }
  }

  /// Creates the list production that defines a `SeparatedList` symbol.
  /// Returns `None` for any other kind of symbol.
  pub fn for_list_symbol(list: &Symbol) -> Option<Self> {
    match list {
      Symbol::SeparatedList {
        element,
        separators,
        repetition,
      } => Some(Production::list(
        format!("{:?}", list),
        list.clone(),
        (**element).clone(),
        separators.iter().cloned(),
        *repetition,
      )),
      _ => None,
    }
  }

  pub fn with_attr(&self, attr: Attr) -> Self {
    Production {
      attributes: self.attributes.with(attr),
      ..self.clone()
    }
  }

  pub fn with_label(&self, label: impl Into<Name>) -> Self {
    Production {
      label: label.into(),
      ..self.clone()
    }
  }

  pub fn label(&self) -> &Name {
    &self.label
  }

  pub fn lhs(&self) -> &Symbol {
    &self.lhs
  }

  pub fn rhs(&self) -> &[Symbol] {
    &self.rhs
  }

  pub fn arity(&self) -> usize {
    self.rhs.len()
  }

  pub fn attributes(&self) -> &Attributes {
    &self.attributes
  }

  pub fn has_attr(&self, attr: Attr) -> bool {
    self.attributes.has(attr)
  }

  pub fn kind(&self) -> ProdKind {
    self.kind
  }

  pub fn is_list(&self) -> bool {
    matches!(self.kind, ProdKind::List(_))
  }

  /// For list productions, the number of separator symbols between two
  /// elements.
  pub fn separator_arity(&self) -> usize {
    match self.kind {
      ProdKind::List(_) => self.rhs.len().saturating_sub(1),
      ProdKind::Default => 0,
    }
  }
}

impl std::fmt::Debug for Production {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    let mut dbg_struct = fmt.debug_struct("Production");
    dbg_struct.field("label", &self.label);
    dbg_struct.field("lhs", &self.lhs);
    dbg_struct.field("rhs", &self.rhs);
    if !self.attributes.is_empty() {
      dbg_struct.field("attributes", &self.attributes);
    }
    dbg_struct.field("kind", &self.kind);
    dbg_struct.finish()
  }
}

impl ToDoc for Production {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA>
  where
    DA::Doc: Clone,
  {
    let body = match self.kind {
      ProdKind::Default if self.rhs.is_empty() => da.text("ε"),
      ProdKind::Default => da.intersperse(
        self.rhs.iter().map(|s| s.to_doc(da)),
        da.softline(),
      ),
      ProdKind::List(rep) => da
        .text("{")
        .append(da.intersperse(
          self.rhs.iter().map(|s| s.to_doc(da)),
          da.softline(),
        ))
        .append(da.text("}"))
        .append(da.text(match rep {
          Repetition::Plus => "+",
          Repetition::Star => "*",
        })),
    };

    let attrs = if self.attributes.is_empty() {
      da.nil()
    } else {
      da.softline().append(da.text(format!(
        "{{{}}}",
        self
          .attributes
          .iter()
          .map(|a| format!("{:?}", a).to_lowercase())
          .collect::<Vec<_>>()
          .join(", ")
      )))
    };

    self
      .label
      .to_doc(da)
      .append(da.text(":"))
      .append(da.softline())
      .append(body)
      .append(attrs)
      .group()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_with_attr_returns_new_value() {
    let prod = Production::new(
      "E_paren",
      Symbol::non_terminal("E"),
      vec![
        Symbol::literal("("),
        Symbol::non_terminal("E"),
        Symbol::literal(")"),
      ],
    );
    let bracket = prod.with_attr(Attr::Bracket);
    assert!(!prod.has_attr(Attr::Bracket));
    assert!(bracket.has_attr(Attr::Bracket));
    assert_eq!(bracket.rhs(), prod.rhs());
    assert_ne!(bracket, prod);
  }

  #[test]
  fn test_list_symbol_production() {
    let list = Symbol::plus_list(
      Symbol::non_terminal("A"),
      vec![Symbol::literal("b")],
    );
    let prod = Production::for_list_symbol(&list).unwrap();
    assert_eq!(prod.lhs(), &list);
    assert_eq!(prod.arity(), 2);
    assert_eq!(prod.separator_arity(), 1);
    assert_eq!(prod.kind(), ProdKind::List(Repetition::Plus));
    assert!(Production::for_list_symbol(&Symbol::literal("b")).is_none());
  }
}
