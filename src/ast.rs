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

//! Typed trees built from forests by dispatching on production tags.

mod builder;

use crate::{
  forest::{Node, Span},
  grammar::Symbol,
  parsers::AmbiguityDetected,
  utils::Name,
};

pub use builder::AstBuilder;

/// A typed tree, or the unresolved alternatives of an ambiguous one.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Ast<T> {
  Node(T),
  Ambiguity(Vec<Ast<T>>),
}

impl<T> Ast<T> {
  pub fn node(&self) -> Option<&T> {
    match self {
      Ast::Node(t) => Some(t),
      Ast::Ambiguity(_) => None,
    }
  }

  pub fn into_node(self) -> Option<T> {
    match self {
      Ast::Node(t) => Some(t),
      Ast::Ambiguity(_) => None,
    }
  }

  pub fn is_ambiguous(&self) -> bool {
    matches!(self, Ast::Ambiguity(_))
  }

  /// Returns the alternatives of an ambiguity; empty for a plain node.
  pub fn alternatives(&self) -> &[Ast<T>] {
    match self {
      Ast::Node(_) => &[],
      Ast::Ambiguity(alts) => alts,
    }
  }

  /// Applies `f` to every typed node, keeping the ambiguity structure.
  pub fn map<U>(self, f: &impl Fn(T) -> U) -> Ast<U> {
    match self {
      Ast::Node(t) => Ast::Node(f(t)),
      Ast::Ambiguity(alts) => {
        Ast::Ambiguity(alts.into_iter().map(|alt| alt.map(f)).collect())
      }
    }
  }
}

/// An argument passed to a constructor: one per nonterminal or list child
/// of the reduction, in rhs order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Arg<T> {
  Node(Ast<T>),
  /// The elements of a separated list. Separators are not passed.
  List(Vec<Ast<T>>),
  /// A list child with more than one derivation, each given as its
  /// elements.
  AmbiguousList(Vec<Vec<Ast<T>>>),
}

impl<T> Arg<T> {
  pub fn into_node(self) -> Option<Ast<T>> {
    match self {
      Arg::Node(ast) => Some(ast),
      _ => None,
    }
  }

  pub fn into_list(self) -> Option<Vec<Ast<T>>> {
    match self {
      Arg::List(list) => Some(list),
      _ => None,
    }
  }
}

/// The reduction a constructor is building.
#[derive(Clone, Copy, Debug)]
pub struct Site<'f> {
  node: &'f Node,
}

impl<'f> Site<'f> {
  pub fn tag(&self) -> &'f str {
    self.node.tag().map(|t| t.str()).unwrap_or_default()
  }

  pub fn symbol(&self) -> &'f Symbol {
    self.node.symbol()
  }

  pub fn span(&self) -> Span {
    self.node.span()
  }

  /// The input text matched by the reduction.
  pub fn text(&self) -> String {
    self.node.yield_text()
  }

  pub fn node(&self) -> &'f Node {
    self.node
  }
}

#[derive(thiserror::Error, Debug)]
pub enum AstError {
  #[error("cannot build {tag} over {span:?}: {reason}")]
  UnsupportedConstruct {
    tag: Name,
    span: Span,
    reason: &'static str,
  },
  #[error(transparent)]
  Ambiguous(#[from] AmbiguityDetected),
  #[error("no alternative of {symbol:?} over {span:?} passed the filter")]
  NoAlternatives { symbol: Symbol, span: Span },
  #[error(transparent)]
  Constructor(#[from] anyhow::Error),
}
