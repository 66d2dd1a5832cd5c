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

//! Small reference grammars.

use crate::grammar::{
  build, Attr, CharRange, ConfigurationError, Grammar, Production, Repetition,
  Symbol,
};

fn a_rule(gb: &mut crate::grammar::GrammarBuilder) {
  gb.add_rule("A", |rb| {
    rb.add_prod("A", |pb| {
      pb.add_literal("a");
    });
  });
}

/// `S ::= {A "b"}+ ; A ::= "a"`, with the list stack nodes wired by hand.
///
/// `S` is itself a list production, so a successful parse yields a list
/// node of `A`s separated by `"b"`s.
pub fn make_separated_plus() -> Result<Grammar, ConfigurationError> {
  build("S", |gb| {
    let a = gb.non_terminal(1, "A");
    let b = gb.literal(2, "b");
    gb.expect(
      Production::list(
        "S",
        "S",
        Symbol::non_terminal("A"),
        vec![Symbol::literal("b")],
        Repetition::Plus,
      ),
      &[a, b],
    );
    a_rule(gb);
  })
}

/// `S ::= A* ; A ::= "a"`.
pub fn make_star() -> Result<Grammar, ConfigurationError> {
  build("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_list_prod("S", "A", vec![], Repetition::Star);
    });
    a_rule(gb);
  })
}

/// `S ::= A | B ; A ::= "a" ; B ::= "a"`: every `"a"` has two derivations.
pub fn make_ambiguous() -> Result<Grammar, ConfigurationError> {
  build("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_prod("ViaA", |pb| {
        pb.add_nonterm("A");
      })
      .add_prod("ViaB", |pb| {
        pb.add_nonterm("B");
      });
    });
    a_rule(gb);
    gb.add_rule("B", |rb| {
      rb.add_prod("B", |pb| {
        pb.add_literal("a");
      });
    });
  })
}

/// An ambiguous, left recursive expression grammar:
///
/// ```text
/// Expr ::= Expr "+" Expr   (Add)
///        | Expr "*" Expr   (Mul)
///        | "(" Expr ")"    (Paren, bracket)
///        | Num
/// Num  ::= [0-9]+          (lexical)
/// ```
pub fn make_expr() -> Result<Grammar, ConfigurationError> {
  let digits = Symbol::plus_list(
    Symbol::char_class(vec![CharRange::new('0', '9')]),
    vec![],
  );
  build("Expr", |gb| {
    gb.add_rule("Expr", |rb| {
      rb.add_prod("Add", |pb| {
        pb.add_nonterm("Expr").add_literal("+").add_nonterm("Expr");
      })
      .add_prod("Mul", |pb| {
        pb.add_nonterm("Expr").add_literal("*").add_nonterm("Expr");
      })
      .add_prod("Paren", |pb| {
        pb.add_literal("(")
          .add_nonterm("Expr")
          .add_literal(")")
          .add_attr(Attr::Bracket);
      })
      .add_prod("NumExpr", |pb| {
        pb.add_nonterm("Num");
      });
    })
    .add_rule("Num", |rb| {
      rb.add_prod("Num", |pb| {
        pb.add_symbol(&digits).add_attr(Attr::Lexical);
      });
    });
  })
}

/// `S ::= S | "a"`: every `S` derives itself over the same span.
pub fn make_cyclic() -> Result<Grammar, ConfigurationError> {
  build("S", |gb| {
    gb.add_rule("S", |rb| {
      rb.add_prod("Loop", |pb| {
        pb.add_nonterm("S");
      })
      .add_prod("Leaf", |pb| {
        pb.add_literal("a");
      });
    });
  })
}

/// A statement list where a `native { ... }` body is an opaque fragment.
///
/// ```text
/// Body  ::= {Stmt ";"}*
/// Stmt  ::= [a-z]+                 (Ident, lexical)
///         | "native{" [a-z]* "}"   (Native, opaque)
/// ```
pub fn make_opaque() -> Result<Grammar, ConfigurationError> {
  let lower = Symbol::char_class(vec![CharRange::new('a', 'z')]);
  build("Body", |gb| {
    gb.add_rule("Body", |rb| {
      rb.add_list_prod(
        "Body",
        "Stmt",
        vec![Symbol::literal(";")],
        Repetition::Star,
      );
    })
    .add_rule("Stmt", |rb| {
      rb.add_prod("Ident", |pb| {
        pb.add_symbol(Symbol::plus_list(lower.clone(), vec![]))
          .add_attr(Attr::Lexical);
      })
      .add_prod("Native", |pb| {
        pb.add_literal("native{")
          .add_symbol(Symbol::star_list(lower.clone(), vec![]))
          .add_literal("}")
          .add_attr(Attr::Opaque);
      });
    });
  })
}
