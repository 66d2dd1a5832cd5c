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
use crate::parsers::Input;

/// Matches a fixed character sequence.
#[derive(Clone, Debug)]
pub struct LiteralNode {
  chars: Vec<char>,
}

impl LiteralNode {
  pub fn new(text: &str) -> Self {
    LiteralNode {
      chars: text.chars().collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.chars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.chars.is_empty()
  }
}

impl Matcher for LiteralNode {
  fn match_at(&self, input: &Input, offset: usize) -> Option<usize> {
    let end = offset + self.chars.len();
    if input.chars(offset, end)? == self.chars.as_slice() {
      Some(end)
    } else {
      None
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_empty_literal_matches_everywhere() {
    let lit = LiteralNode::new("");
    let input = Input::new("ab");
    assert!(lit.is_empty());
    assert_eq!(lit.match_at(&input, 0), Some(0));
    assert_eq!(lit.match_at(&input, 2), Some(2));
  }

  #[test]
  fn test_literal_at_end_of_input() {
    let lit = LiteralNode::new("if");
    assert_eq!(lit.match_at(&Input::new("if"), 0), Some(2));
    assert_eq!(lit.match_at(&Input::new("i"), 0), None);
  }
}
