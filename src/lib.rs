// Copyright 2018 Google LLC
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

//! A scannerless, generalized parsing core.
//!
//! A [`grammar::Grammar`] is built once from symbols, productions and the
//! stack nodes wired into them. A [`parsers::Parser`] then recognizes raw
//! text against it without a tokenizer, exploring every derivation, and
//! returns a shared [`forest::Node`] in which ambiguity is an explicit
//! node kind. An [`ast::AstBuilder`] maps a forest to typed trees by
//! dispatching on production tags.
//!
//! ```rust
//! use sgll::{grammar::examples, parsers::Parser};
//!
//! let g = examples::make_separated_plus().unwrap();
//! let forest = Parser::new(&g).parse("ababa").unwrap();
//! assert_eq!(forest.as_list().unwrap().elements().count(), 3);
//! ```

#[macro_use]
extern crate derivative;

pub mod ast;
pub mod forest;
pub mod grammar;
pub mod parsers;
pub mod stack;
pub mod state;
pub mod utils;
