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

//! Parse forests: shared trees whose ambiguity is explicit.

mod builder;
mod dot;
mod node;

pub use {
  crate::parsers::Span,
  builder::ForestBuilder,
  node::{Ambiguity, Branch, Leaf, ListBranch, Node, NodeContents},
};
