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

use super::StackNodeId;
use crate::grammar::Repetition;

/// A separated list, `element (separators element)*`.
///
/// The node keeps the ids of the element and separator nodes it was built
/// from. The list production of the list symbol is wired to exactly those
/// nodes, so the repetition reuses the existing grammar state.
#[derive(Clone, Debug)]
pub struct SeparatedListNode {
  element: StackNodeId,
  separators: Vec<StackNodeId>,
  repetition: Repetition,
}

impl SeparatedListNode {
  pub fn new(
    element: StackNodeId,
    separators: Vec<StackNodeId>,
    repetition: Repetition,
  ) -> Self {
    SeparatedListNode {
      element,
      separators,
      repetition,
    }
  }

  pub fn element(&self) -> StackNodeId {
    self.element
  }

  pub fn separators(&self) -> &[StackNodeId] {
    &self.separators
  }

  pub fn repetition(&self) -> Repetition {
    self.repetition
  }

  /// The wiring of the list production: the element, then the separators.
  pub fn wiring(&self) -> Vec<StackNodeId> {
    std::iter::once(self.element)
      .chain(self.separators.iter().copied())
      .collect()
  }
}
