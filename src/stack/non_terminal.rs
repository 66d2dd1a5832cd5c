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

use crate::utils::Name;

/// Refers to the productions of a named nonterminal.
#[derive(Clone, Debug)]
pub struct NonTerminalNode {
  name: Name,
}

impl NonTerminalNode {
  pub fn new(name: impl Into<Name>) -> Self {
    NonTerminalNode { name: name.into() }
  }

  pub fn name(&self) -> &Name {
    &self.name
  }
}
