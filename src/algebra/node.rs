/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Single path component.
pub type Name = String;

/// A filesystem node, identified by its path.
///
/// Nodes are plain values; two nodes with equal paths are the same
/// node. The derived order is lexicographic over the components, with
/// a strict prefix sorting before any of its extensions, so ancestors
/// always precede their descendants.
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Node(Vec<Name>);

impl Node {
    pub fn new(path: Vec<Name>) -> Node {
        Node(path)
    }

    pub fn components(&self) -> &[Name] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The parent node, or None for the root.
    pub fn parent(&self) -> Option<Node> {
        if self.0.is_empty() {
            None
        } else {
            Some(Node(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Whether this node is a strict ancestor of the other node.
    pub fn is_ancestor_of(&self, other: &Node) -> bool {
        self.0.len() < other.0.len() && self.0 == other.0[..self.0.len()]
    }

    /// Whether this node is a strict descendant of the other node.
    pub fn is_descendant_of(&self, other: &Node) -> bool {
        other.is_ancestor_of(self)
    }

    pub fn is_parent_of(&self, other: &Node) -> bool {
        !other.0.is_empty() && self.0 == other.0[..other.0.len() - 1]
    }
}

impl From<&str> for Node {
    fn from(path: &str) -> Node {
        Node(
            path.split('/')
                .filter(|name| !name.is_empty())
                .map(|name| name.to_owned())
                .collect(),
        )
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinship() {
        assert!(Node::from("a/b/c").is_descendant_of(&Node::from("a")));
        assert!(!Node::from("a/c").is_descendant_of(&Node::from("x")));
        assert!(!Node::from("a").is_ancestor_of(&Node::from("a")));
        assert!(Node::from("a/b").is_parent_of(&Node::from("a/b/c")));
        assert!(!Node::from("a").is_parent_of(&Node::from("a/b/c")));
        assert!(Node::new(vec![]).is_parent_of(&Node::from("a")));
    }

    #[test]
    fn test_parent() {
        assert_eq!(Some(Node::from("a/b/c")), Node::from("a/b/c/d").parent());
        assert_eq!(Some(Node::new(vec![])), Node::from("a").parent());
        assert_eq!(None, Node::new(vec![]).parent());
    }

    #[test]
    fn test_order() {
        assert!(Node::from("a/b/c") < Node::from("a/c"));
        assert!(Node::from("a") < Node::from("a/b"));
        assert!(Node::from("b") > Node::from("a/b/c"));
        assert_eq!(Node::from("a/b"), Node::new(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_display() {
        assert_eq!("d1/d2/f3", Node::from("d1/d2/f3").to_string());
    }
}
