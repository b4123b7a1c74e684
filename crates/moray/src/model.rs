//! The external view of a diagram graph.
//!
//! These types are intentionally lightweight and `Clone`-friendly: the graph
//! compiler upstream owns them, the placer mutates node boxes exactly once,
//! and the routers mutate edge routes and label positions exactly once.
//! Nothing here touches topology (source, destination, identity).

use crate::geom::{Point, Rect, rect};
use std::collections::BTreeMap;

/// Direction hint on the root of a diagram; influences BFS expansion order
/// during grid placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

/// Where a node or edge label is anchored relative to its owner's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPosition {
    InsideMiddleCenter,
    InsideTopCenter,
    OutsideTopCenter,
    OutsideBottomCenter,
}

/// Shape class, as far as the router cares: image/person-like shapes get
/// their labels placed below the box instead of inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    #[default]
    Rectangle,
    Image,
    Person,
}

impl NodeShape {
    pub fn label_goes_below(self) -> bool {
        matches!(self, NodeShape::Image | NodeShape::Person)
    }
}

/// Measured label text.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct LabelInfo {
    pub text: String,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Absolute box; the placer sets it, the corridor router reads it.
    pub rect: Rect,
    /// Indices of child nodes (containers). The routers treat containers as
    /// opaque obstacles; recursive layout happens upstream.
    pub children: Vec<usize>,
    pub shape: NodeShape,
    pub has_icon: bool,
    pub language: Option<String>,
    pub label: Option<LabelInfo>,
    pub label_position: Option<LabelPosition>,
    /// Attributes the router does not interpret; carried through untouched.
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: String::new(),
            rect: rect(0.0, 0.0, 0.0, 0.0),
            children: Vec::new(),
            shape: NodeShape::Rectangle,
            has_icon: false,
            language: None,
            label: None,
            label_position: None,
            extras: BTreeMap::new(),
        }
    }
}

impl Node {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            rect: rect(0.0, 0.0, width, height),
            ..Default::default()
        }
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub src: usize,
    pub dst: usize,
    pub label: Option<LabelInfo>,
    pub label_position: Option<LabelPosition>,
    /// Ordered orthogonal polyline; the router sets it exactly once.
    pub route: Vec<Point>,
    pub extras: BTreeMap<String, serde_json::Value>,
}

impl Edge {
    pub fn new(src: usize, dst: usize) -> Self {
        Self {
            src,
            dst,
            label: None,
            label_position: None,
            route: Vec::new(),
            extras: BTreeMap::new(),
        }
    }

    pub fn with_label(src: usize, dst: usize, label: LabelInfo) -> Self {
        Self {
            label: Some(label),
            ..Self::new(src, dst)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub direction: LayoutDirection,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, edge: Edge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    /// Parent index of each node, derived from the children lists.
    pub fn parents(&self) -> Vec<Option<usize>> {
        let mut parents = vec![None; self.nodes.len()];
        for (idx, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child < parents.len() {
                    parents[child] = Some(idx);
                }
            }
        }
        parents
    }

    /// Indices of root nodes: those that are nobody's child.
    pub fn roots(&self) -> Vec<usize> {
        self.parents()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_and_parents_follow_children_lists() {
        let mut g = Graph::new();
        let a = g.add_node(Node::new("a", 10.0, 10.0));
        let b = g.add_node(Node::new("b", 10.0, 10.0));
        let c = g.add_node(Node::new("c", 10.0, 10.0));
        g.nodes[a].children.push(b);

        assert_eq!(g.parents(), vec![None, Some(a), None]);
        assert_eq!(g.roots(), vec![a, c]);
    }
}
