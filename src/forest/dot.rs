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

//! Graphviz rendering of forests.

use std::{borrow::Cow, collections::BTreeMap};

use super::{Node, NodeContents};

type Edge = (usize, usize, bool);

/// A forest flattened to numbered nodes. Shared subtrees appear once.
struct ForestGraph {
  labels: Vec<String>,
  edges: Vec<Edge>,
}

impl ForestGraph {
  fn new(root: &Node) -> Self {
    let mut graph = ForestGraph {
      labels: Vec::new(),
      edges: Vec::new(),
    };
    graph.add(root, &mut BTreeMap::new());
    graph
  }

  fn add(
    &mut self,
    node: &Node,
    seen: &mut BTreeMap<*const NodeContents, usize>,
  ) -> usize {
    let key = node.as_ptr();
    if let Some(index) = seen.get(&key) {
      return *index;
    }

    let index = self.labels.len();
    seen.insert(key, index);
    let span = node.span();
    self.labels.push(match node.contents() {
      NodeContents::Leaf(leaf) => format!("{:?} {:?}", leaf.text(), span),
      NodeContents::Ambiguity(_) => format!("amb {:?} {:?}", node.symbol(), span),
      _ => format!(
        "{} {:?}",
        node.tag().map(|t| t.str()).unwrap_or_default(),
        span
      ),
    });

    let is_amb = node.is_ambiguous();
    let targets: Vec<&Node> = if is_amb {
      node.alternatives().collect()
    } else {
      node.children().collect()
    };
    for target in targets {
      let target_index = self.add(target, seen);
      self.edges.push((index, target_index, is_amb));
    }
    index
  }
}

impl<'a> dot::Labeller<'a, usize, Edge> for ForestGraph {
  fn graph_id(&'a self) -> dot::Id<'a> {
    dot::Id::new("forest").expect("Graph id is a valid identifier.")
  }

  fn node_id(&'a self, n: &usize) -> dot::Id<'a> {
    dot::Id::new(format!("n{}", n)).expect("Node ids are valid identifiers.")
  }

  fn node_label(&'a self, n: &usize) -> dot::LabelText<'a> {
    dot::LabelText::LabelStr(Cow::Borrowed(&self.labels[*n]))
  }

  fn edge_label(&'a self, e: &Edge) -> dot::LabelText<'a> {
    dot::LabelText::LabelStr(Cow::Borrowed(if e.2 { "alt" } else { "" }))
  }
}

impl<'a> dot::GraphWalk<'a, usize, Edge> for ForestGraph {
  fn nodes(&'a self) -> dot::Nodes<'a, usize> {
    Cow::Owned((0..self.labels.len()).collect())
  }

  fn edges(&'a self) -> dot::Edges<'a, Edge> {
    Cow::Borrowed(&self.edges)
  }

  fn source(&'a self, e: &Edge) -> usize {
    e.0
  }

  fn target(&'a self, e: &Edge) -> usize {
    e.1
  }
}

impl Node {
  /// Renders this forest in graphviz dot syntax. Ambiguity nodes point at
  /// their alternatives with edges labelled `alt`.
  pub fn to_dot(&self) -> String {
    let graph = ForestGraph::new(self);
    let mut output = Vec::new();
    dot::render(&graph, &mut output).expect("Writing to a Vec cannot fail.");
    String::from_utf8(output).expect("Dot output is UTF-8.")
  }
}

#[cfg(test)]
mod test {
  use crate::{
    forest::{Node, Span},
    grammar::Symbol,
  };

  #[test]
  fn test_shared_nodes_render_once() {
    let sym = Symbol::non_terminal("S");
    let span = Span::new(0, 1);
    let a = Node::new_leaf(Symbol::literal("a"), "a", span);
    let alt1 = Node::new_branch("X", sym.clone(), span, vec![a.clone()]);
    let alt2 = Node::new_branch("Y", sym.clone(), span, vec![a]);
    let amb = Node::new_ambiguity(sym, span, vec![alt1, alt2]).unwrap();

    let text = amb.to_dot();
    assert!(text.starts_with("digraph forest {"));
    assert!(text.contains("alt"));
    // amb, X, Y and one shared leaf.
    assert!(text.contains("n3"));
    assert!(!text.contains("n4"));
  }
}
