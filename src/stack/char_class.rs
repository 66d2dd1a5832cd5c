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

use super::Matcher;
use crate::{grammar::CharClass, parsers::Input};

/// Matches exactly one character from a class.
#[derive(Clone, Debug)]
pub struct CharClassNode {
  class: CharClass,
}

impl CharClassNode {
  pub fn new(class: CharClass) -> Self {
    CharClassNode { class }
  }

  pub fn class(&self) -> &CharClass {
    &self.class
  }
}

impl Matcher for CharClassNode {
  fn match_at(&self, input: &Input, offset: usize) -> Option<usize> {
    input
      .char_at(offset)
      .filter(|c| self.class.contains(*c))
      .map(|_| offset + 1)
  }
}
