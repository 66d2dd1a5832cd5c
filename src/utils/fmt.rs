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

//! `Debug` output for grammar and chart tables that are only reachable
//! through iterators.

use std::fmt::{Debug, Formatter, Result};

#[derive(Clone, Copy)]
enum Brackets {
  Square,
  Curly,
}

/// Iterates a fresh clone of `items` on every format call.
#[derive(Clone)]
struct Entries<C> {
  items: C,
  brackets: Brackets,
}

impl<C> Debug for Entries<C>
where
  C: IntoIterator + Clone,
  C::Item: Debug,
{
  fn fmt(&self, fmt: &mut Formatter) -> Result {
    let items = self.items.clone();
    match self.brackets {
      Brackets::Square => fmt.debug_list().entries(items).finish(),
      Brackets::Curly => fmt.debug_set().entries(items).finish(),
    }
  }
}

#[derive(Clone)]
struct Pairs<C>(C);

impl<C, K, V> Debug for Pairs<C>
where
  C: IntoIterator<Item = (K, V)> + Clone,
  K: Debug,
  V: Debug,
{
  fn fmt(&self, fmt: &mut Formatter) -> Result {
    fmt.debug_map().entries(self.0.clone()).finish()
  }
}

/// Formats `items` as `[a, b, ..]`.
pub fn list_fmt<C>(items: C) -> impl Debug
where
  C: IntoIterator + Clone,
  C::Item: Debug,
{
  Entries {
    items,
    brackets: Brackets::Square,
  }
}

/// Formats `items` as `{a, b, ..}`.
pub fn set_fmt<C>(items: C) -> impl Debug
where
  C: IntoIterator + Clone,
  C::Item: Debug,
{
  Entries {
    items,
    brackets: Brackets::Curly,
  }
}

pub fn map_fmt<C, K, V>(items: C) -> impl Debug
where
  C: IntoIterator<Item = (K, V)> + Clone,
  K: Debug,
  V: Debug,
{
  Pairs(items)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_brackets() {
    let items = vec![1, 2];
    assert_eq!(format!("{:?}", list_fmt(&items)), "[1, 2]");
    assert_eq!(format!("{:?}", set_fmt(&items)), "{1, 2}");
    assert_eq!(
      format!("{:?}", map_fmt(items.iter().map(|i| (i, i * 10)))),
      "{1: 10, 2: 20}"
    );
  }
}
