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

use sgll::{grammar::examples, parsers::Parser};

fn main() -> anyhow::Result<()> {
  let g = examples::make_separated_plus()?;
  eprintln!("Grammar:\n{}", g.to_pretty());

  let input = std::env::args().nth(1).unwrap_or_else(|| "ababa".to_string());
  let forest = Parser::new(&g).parse(&input)?;

  eprintln!("{}", forest.to_pretty());
  println!("{}", forest.to_dot());
  Ok(())
}
