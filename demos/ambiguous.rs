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

use sgll::{
  ast::{Arg, Ast, AstBuilder},
  grammar::examples,
  parsers::Parser,
};

fn operands(args: Vec<Arg<String>>) -> Vec<String> {
  args
    .into_iter()
    .filter_map(Arg::into_node)
    .map(|ast| match ast {
      Ast::Node(text) => text,
      Ast::Ambiguity(alts) => format!("<{} readings>", alts.len()),
    })
    .collect()
}

fn main() -> anyhow::Result<()> {
  let g = examples::make_expr()?;
  let input = std::env::args()
    .nth(1)
    .unwrap_or_else(|| "1+2*3".to_string());
  let forest = Parser::new(&g).parse(&input)?;

  eprintln!("{} trees", forest.count_trees());
  eprintln!("{}", forest.to_pretty());

  let builder = AstBuilder::new(&g)
    .on("Num", |site, _| Ok(site.text()))
    .on("NumExpr", |_, args| Ok(operands(args).concat()))
    .on("Add", |_, args| Ok(format!("({})", operands(args).join(" + "))))
    .on("Mul", |_, args| Ok(format!("({})", operands(args).join(" * "))));

  match builder.build(&forest)? {
    Ast::Node(text) => println!("{}", text),
    Ast::Ambiguity(alts) => {
      for alt in alts {
        if let Ast::Node(text) = alt {
          println!("{}", text);
        }
      }
    }
  }

  println!("{}", forest.to_dot());
  Ok(())
}
