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
  super::{Arg, Ast, AstError, Site},
  crate::{
    forest::{Node, NodeContents},
    grammar::{Attr, Attributes, Grammar, Symbol},
    parsers::AmbiguityDetected,
    utils::Name,
  },
  anyhow::Context,
  std::collections::BTreeMap,
};

type Handler<'g, T> = Box<dyn Fn(&Site, Vec<Arg<T>>) -> anyhow::Result<T> + 'g>;
type Filter<'g> = Box<dyn Fn(&Node) -> bool + 'g>;

/// Builds typed trees from a forest.
///
/// Each reduction is dispatched on its production tag to the handler
/// registered with [`AstBuilder::on`], which receives the already built
/// arguments of the reduction. Production attributes adjust the dispatch:
///
/// - `Lexical` reductions get no arguments; the handler reads the matched
///   text from the [`Site`].
/// - `Bracket` reductions are replaced by their single nonterminal child.
/// - `Opaque` reductions cannot be built and fail with
///   [`AstError::UnsupportedConstruct`], as do tags with no handler.
///
/// Ambiguity nodes become [`Ast::Ambiguity`] unless the builder is told to
/// fail on ambiguity, or given a filter that narrows the alternatives.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct AstBuilder<'g, T> {
  grammar: &'g Grammar,
  #[derivative(Debug = "ignore")]
  handlers: BTreeMap<Name, Handler<'g, T>>,
  #[derivative(Debug = "ignore")]
  filter: Option<Filter<'g>>,
  fail_on_ambiguity: bool,
}

impl<'g, T> AstBuilder<'g, T> {
  pub fn new(grammar: &'g Grammar) -> Self {
    AstBuilder {
      grammar,
      handlers: BTreeMap::new(),
      filter: None,
      fail_on_ambiguity: false,
    }
  }

  /// Registers the constructor for reductions tagged `tag`.
  pub fn on(
    mut self,
    tag: impl Into<Name>,
    handler: impl Fn(&Site, Vec<Arg<T>>) -> anyhow::Result<T> + 'g,
  ) -> Self {
    self.handlers.insert(tag.into(), Box::new(handler));
    self
  }

  /// Fails with [`AstError::Ambiguous`] instead of building
  /// [`Ast::Ambiguity`].
  pub fn fail_on_ambiguity(self) -> Self {
    AstBuilder {
      fail_on_ambiguity: true,
      ..self
    }
  }

  /// Keeps only the alternatives of each ambiguity node for which `filter`
  /// returns true.
  pub fn with_filter(self, filter: impl Fn(&Node) -> bool + 'g) -> Self {
    AstBuilder {
      filter: Some(Box::new(filter)),
      ..self
    }
  }

  pub fn build(&self, node: &Node) -> Result<Ast<T>, AstError> {
    let alts = self.resolve(node)?;
    if alts.len() == 1 {
      self.build_reduction(alts[0])
    } else {
      log::trace!(
        "Keeping {} alternatives of {:?} over {:?}",
        alts.len(),
        node.symbol(),
        node.span()
      );
      let alts = alts
        .into_iter()
        .map(|alt| self.build_reduction(alt))
        .collect::<Result<_, _>>()?;
      Ok(Ast::Ambiguity(alts))
    }
  }

  /// Returns the alternatives of `node` left by the filter and the
  /// ambiguity policy.
  fn resolve<'n>(&self, node: &'n Node) -> Result<Vec<&'n Node>, AstError> {
    if !node.is_ambiguous() {
      return Ok(vec![node]);
    }

    let alts: Vec<&Node> = node
      .alternatives()
      .filter(|alt| self.filter.as_ref().map_or(true, |f| f(alt)))
      .collect();

    if alts.is_empty() {
      return Err(AstError::NoAlternatives {
        symbol: node.symbol().clone(),
        span: node.span(),
      });
    }
    if alts.len() > 1 && self.fail_on_ambiguity {
      return Err(
        AmbiguityDetected {
          symbol: node.symbol().clone(),
          span: node.span(),
        }
        .into(),
      );
    }
    Ok(alts)
  }

  fn attributes(&self, tag: &Name) -> Attributes {
    self
      .grammar
      .prod_by_label(tag.str())
      .map(|prod| prod.production().attributes().clone())
      .unwrap_or_default()
  }

  fn build_reduction(&self, node: &Node) -> Result<Ast<T>, AstError> {
    let tag = match node.tag() {
      Some(tag) => tag,
      None => {
        return Err(AstError::UnsupportedConstruct {
          tag: Name::new(&format!("{:?}", node.symbol())),
          span: node.span(),
          reason: "terminals have no constructor",
        })
      }
    };
    let unsupported = |reason| AstError::UnsupportedConstruct {
      tag: tag.clone(),
      span: node.span(),
      reason,
    };

    let attrs = self.attributes(tag);
    if attrs.has(Attr::Opaque) {
      return Err(unsupported("opaque fragments cannot be visited"));
    }
    if attrs.has(Attr::Bracket) {
      let mut inner = node.children().filter(|c| !is_terminal(c));
      return match (inner.next(), inner.next()) {
        (Some(child), None) => self.build(child),
        _ => Err(unsupported("bracket productions need exactly one nonterminal")),
      };
    }

    let handler = self
      .handlers
      .get(tag)
      .ok_or_else(|| unsupported("no constructor is registered"))?;
    let args = if attrs.has(Attr::Lexical) {
      Vec::new()
    } else {
      self.args(node)?
    };

    let site = Site { node };
    let value = handler(&site, args)
      .with_context(|| format!("building {} over {:?}", tag, node.span()))?;
    Ok(Ast::Node(value))
  }

  fn args(&self, node: &Node) -> Result<Vec<Arg<T>>, AstError> {
    if let Some(list) = node.as_list() {
      return Ok(vec![Arg::List(self.elements(list.elements())?)]);
    }

    let mut args = Vec::new();
    for child in node.children().filter(|c| !is_terminal(c)) {
      let arg = if is_list_symbol(child.symbol()) {
        let alts = self.resolve(child)?;
        let mut lists = alts
          .into_iter()
          .map(|alt| match alt.as_list() {
            Some(list) => self.elements(list.elements()),
            None => Ok(vec![self.build(alt)?]),
          })
          .collect::<Result<Vec<_>, _>>()?;
        if lists.len() == 1 {
          Arg::List(lists.remove(0))
        } else {
          Arg::AmbiguousList(lists)
        }
      } else {
        Arg::Node(self.build(child)?)
      };
      args.push(arg);
    }
    Ok(args)
  }

  fn elements<'n>(
    &self,
    elements: impl Iterator<Item = &'n Node>,
  ) -> Result<Vec<Ast<T>>, AstError> {
    elements.map(|e| self.build(e)).collect()
  }
}

fn is_terminal(node: &Node) -> bool {
  matches!(node.contents(), NodeContents::Leaf(_))
}

fn is_list_symbol(symbol: &Symbol) -> bool {
  symbol.repetition().is_some()
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{grammar::examples, parsers::Parser};

  #[derive(Clone, PartialEq, Eq, Debug)]
  enum Expr {
    Num(u64),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
  }

  fn binary(
    args: Vec<Arg<Expr>>,
    make: fn(Box<Expr>, Box<Expr>) -> Expr,
  ) -> anyhow::Result<Expr> {
    let mut nodes = args
      .into_iter()
      .filter_map(|a| a.into_node().and_then(Ast::into_node));
    match (nodes.next(), nodes.next()) {
      (Some(l), Some(r)) => Ok(make(Box::new(l), Box::new(r))),
      _ => anyhow::bail!("expected two unambiguous operands"),
    }
  }

  fn expr_builder(g: &Grammar) -> AstBuilder<'_, Expr> {
    AstBuilder::new(g)
      .on("Num", |site, _| Ok(Expr::Num(site.text().parse()?)))
      .on("NumExpr", |_, mut args| {
        match args.pop().and_then(Arg::into_node) {
          Some(Ast::Node(e)) => Ok(e),
          _ => anyhow::bail!("ambiguous number"),
        }
      })
      .on("Add", |_, args| binary(args, Expr::Add))
      .on("Mul", |_, args| binary(args, Expr::Mul))
  }

  #[test]
  fn test_brackets_pass_through() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("(1+2)*3").unwrap();
    let ast = expr_builder(&g).build(&forest).unwrap();
    assert_eq!(
      ast,
      Ast::Node(Expr::Mul(
        Box::new(Expr::Add(Box::new(Expr::Num(1)), Box::new(Expr::Num(2)))),
        Box::new(Expr::Num(3)),
      ))
    );
  }

  #[test]
  fn test_ambiguity_is_preserved() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("1+2*3").unwrap();
    let ast = expr_builder(&g).build(&forest).unwrap();
    assert!(ast.is_ambiguous());
    assert_eq!(ast.alternatives().len(), 2);
  }

  #[test]
  fn test_fail_on_ambiguity() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("1+2*3").unwrap();
    let err = expr_builder(&g).fail_on_ambiguity().build(&forest).unwrap_err();
    assert!(matches!(err, AstError::Ambiguous(_)));
  }

  #[test]
  fn test_filter_picks_alternative() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("1+2*3").unwrap();
    // Multiplication binds tighter: reject alternatives rooted at Mul.
    let ast = expr_builder(&g)
      .with_filter(|alt| alt.tag().map(|t| t.str()) != Some("Mul"))
      .build(&forest)
      .unwrap();
    assert_eq!(
      ast,
      Ast::Node(Expr::Add(
        Box::new(Expr::Num(1)),
        Box::new(Expr::Mul(Box::new(Expr::Num(2)), Box::new(Expr::Num(3)))),
      ))
    );

    let err = expr_builder(&g)
      .with_filter(|_| false)
      .build(&forest)
      .unwrap_err();
    assert!(matches!(err, AstError::NoAlternatives { .. }));
  }

  #[test]
  fn test_missing_handler_is_unsupported() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("1").unwrap();
    let err = AstBuilder::<Expr>::new(&g).build(&forest).unwrap_err();
    assert!(matches!(err, AstError::UnsupportedConstruct { .. }));
  }

  #[test]
  fn test_constructor_errors_carry_context() {
    let g = examples::make_expr().unwrap();
    let forest = Parser::new(&g).parse("99999999999999999999999").unwrap();
    let err = expr_builder(&g).build(&forest).unwrap_err();
    assert!(matches!(err, AstError::Constructor(_)));
    assert!(format!("{:#}", err).contains("building Num"));
  }

  #[derive(Clone, PartialEq, Eq, Debug)]
  enum Stmt {
    Ident(String),
    Body(Vec<Stmt>),
  }

  fn stmt_builder(g: &Grammar) -> AstBuilder<'_, Stmt> {
    AstBuilder::new(g)
      .on("Ident", |site, _| Ok(Stmt::Ident(site.text())))
      .on("Body", |_, args| {
        let stmts = args
          .into_iter()
          .filter_map(Arg::into_list)
          .flatten()
          .filter_map(Ast::into_node)
          .collect();
        Ok(Stmt::Body(stmts))
      })
  }

  #[test]
  fn test_lists_pass_elements() {
    let g = examples::make_opaque().unwrap();
    let forest = Parser::new(&g).parse("ab;c").unwrap();
    let ast = stmt_builder(&g).build(&forest).unwrap();
    assert_eq!(
      ast,
      Ast::Node(Stmt::Body(vec![
        Stmt::Ident("ab".to_string()),
        Stmt::Ident("c".to_string()),
      ]))
    );
  }

  #[test]
  fn test_opaque_fragment_fails_fast() {
    let g = examples::make_opaque().unwrap();
    let forest = Parser::new(&g).parse("ab;native{xyz}").unwrap();
    let err = stmt_builder(&g)
      .on("Native", |_, _| Ok(Stmt::Body(vec![])))
      .build(&forest)
      .unwrap_err();
    match err {
      AstError::UnsupportedConstruct { tag, .. } => {
        assert_eq!(tag.str(), "Native")
      }
      other => panic!("unexpected error: {}", other),
    }
  }
}
