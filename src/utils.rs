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

use std::collections::BTreeSet;
use std::sync::Arc;

pub mod fmt;

pub trait ToDoc {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA, ()>
  where
    DA::Doc: Clone;
}

/// Renders any `ToDoc` value at the given width.
pub fn to_pretty_string(value: &impl ToDoc, width: usize) -> String {
  let arena = pretty::Arena::new();
  format!("{}", value.to_doc(&arena).into_doc().pretty(width))
}

/// A shared name type, used to avoid duplicating common string values
/// throughout grammars and forests.
///
/// Names are `Send + Sync`, so grammars holding them can be shared between
/// threads parsing different inputs.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(Arc<str>);

impl Name {
  /// Creates a new Name containing the given string.
  pub fn new(s: &(impl AsRef<str> + ?Sized)) -> Self {
    Name(Arc::from(s.as_ref()))
  }

  /// Returns a reference to the internal string.
  pub fn str(&self) -> &str {
    &*self.0
  }
}

impl AsRef<str> for Name {
  fn as_ref(&self) -> &str {
    self.str()
  }
}

impl From<&str> for Name {
  fn from(s: &str) -> Self {
    Name::new(s)
  }
}

impl From<String> for Name {
  fn from(s: String) -> Self {
    Name(Arc::from(s))
  }
}

impl std::fmt::Debug for Name {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    fmt.write_str(&self.0)
  }
}

impl std::fmt::Display for Name {
  fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
    fmt.write_str(&self.0)
  }
}

impl ToDoc for Name {
  fn to_doc<'a, DA: pretty::DocAllocator<'a>>(
    &self,
    da: &'a DA,
  ) -> pretty::DocBuilder<'a, DA> {
    da.text(self.str().to_string())
  }
}

pub fn breadth_first_search<T, InitI, StepI, F>(
  initial: InitI,
  mut f: F,
) -> BTreeSet<T>
where
  T: Ord + Clone,
  InitI: IntoIterator<Item = T>,
  StepI: IntoIterator<Item = T>,
  F: FnMut(&T) -> StepI,
{
  let mut next_set = BTreeSet::new();
  let mut curr_set: BTreeSet<_> = initial.into_iter().collect();
  let mut seen_set = curr_set.clone();

  while !curr_set.is_empty() {
    for next_item in &curr_set {
      for step_item in f(next_item) {
        if !seen_set.contains(&step_item) {
          next_set.insert(step_item.clone());
          seen_set.insert(step_item);
        }
      }
    }

    std::mem::swap(&mut curr_set, &mut next_set);
    next_set.clear();
  }

  seen_set
}
