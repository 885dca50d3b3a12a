/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::node::Node;
use super::value::Value;

/// A command `<node|before|after>`: the assertion that the filesystem
/// held `before` at `node` and now holds `after`.
///
/// The derived order is (node, before, after).
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Command {
    pub node: Node,
    pub before: Value,
    pub after: Value,
}

impl Command {
    pub fn new(node: Node, before: Value, after: Value) -> Command {
        Command {
            node,
            before,
            after,
        }
    }

    /// Whether the command changes nothing.
    pub fn is_null(&self) -> bool {
        self.before == self.after
    }

    /// Whether the command grows structure (kind of `after` above kind
    /// of `before`).
    pub fn is_constructor(&self) -> bool {
        self.after.type_greater(&self.before)
    }

    /// Whether the command shrinks structure.
    pub fn is_destructor(&self) -> bool {
        self.after.type_less(&self.before)
    }

    /// Whether the command replaces contents without changing kind.
    /// Only File to File edits are meaningful.
    pub fn is_edit(&self) -> bool {
        self.before.type_eq(&self.after) && !self.is_null()
    }

    /// Whether this command and `other`, in this order, form a
    /// constructor pair: this builds a directory and `other` builds
    /// something from Empty directly below it.
    pub fn is_constructor_pair_with_next(&self, other: &Command) -> bool {
        self.is_constructor()
            && self.after.is_dir()
            && other.is_constructor()
            && other.before.is_empty()
            && self.node.is_parent_of(&other.node)
    }

    /// Whether this command and `other`, in this order, form a
    /// destructor pair: this empties a node and `other` tears down the
    /// directory directly above it.
    pub fn is_destructor_pair_with_next(&self, other: &Command) -> bool {
        self.is_destructor()
            && self.after.is_empty()
            && other.is_destructor()
            && other.before.is_dir()
            && other.node.is_parent_of(&self.node)
    }

    /// Weak conflict relation between two distinct commands: they touch
    /// the same node, or one touches an ancestor whose output is not a
    /// directory while the other leaves a non-Empty descendant.
    ///
    /// Must not be called on equal commands.
    pub fn weak_conflict_with(&self, other: &Command) -> bool {
        debug_assert!(self != other);
        if self.node == other.node {
            return true;
        }
        let (ancestor, descendant) = if self.node.is_ancestor_of(&other.node) {
            (self, other)
        } else if self.node.is_descendant_of(&other.node) {
            (other, self)
        } else {
            return false;
        };
        !ancestor.after.is_dir() && !descendant.after.is_empty()
    }

    /// Render the command, optionally with the delimiters highlighted.
    pub fn render(&self, color: bool) -> String {
        let (on, off) = if color { ("\x1b[31;1m", "\x1b[0m") } else { ("", "") };
        format!(
            "{on}<{off}{}{on}|{off}{}{on}|{off}{}{on}>{off}",
            self.node, self.before, self.after
        )
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(path: &str, before: Value, after: Value) -> Command {
        Command::new(path.into(), before, after)
    }

    #[test]
    fn test_classification() {
        assert!(cmd("a", Value::file("f1"), Value::file("f1")).is_null());
        assert!(cmd("a", Value::Empty, Value::Dir).is_constructor());
        assert!(cmd("a", Value::Empty, Value::file("f1")).is_constructor());
        assert!(cmd("a", Value::file("f1"), Value::Dir).is_constructor());
        assert!(cmd("a", Value::Dir, Value::file("f1")).is_destructor());
        assert!(cmd("a", Value::file("f1"), Value::Empty).is_destructor());
        assert!(cmd("a", Value::file("f1"), Value::file("f2")).is_edit());
        assert!(!cmd("a", Value::file("f1"), Value::file("f1")).is_edit());
        assert!(!cmd("a", Value::Empty, Value::Dir).is_edit());
    }

    #[test]
    fn test_constructor_pair() {
        let parent = cmd("d1", Value::Empty, Value::Dir);
        let child = cmd("d1/f2", Value::Empty, Value::file("f"));
        assert!(parent.is_constructor_pair_with_next(&child));
        // A file cannot be built under a file.
        let file_parent = cmd("d1", Value::Empty, Value::file("f"));
        assert!(!file_parent.is_constructor_pair_with_next(&child));
        // The pair must be parent and child, not further apart.
        let grandchild = cmd("d1/d2/f3", Value::Empty, Value::file("f"));
        assert!(!parent.is_constructor_pair_with_next(&grandchild));
    }

    #[test]
    fn test_destructor_pair() {
        let child = cmd("d1/f2", Value::file("f"), Value::Empty);
        let parent = cmd("d1", Value::Dir, Value::Empty);
        assert!(child.is_destructor_pair_with_next(&parent));
        let partial = cmd("d1/f2", Value::Dir, Value::file("f"));
        assert!(!partial.is_destructor_pair_with_next(&parent));
    }

    #[test]
    fn test_weak_conflict() {
        let a = cmd("d1", Value::Empty, Value::Dir);
        let b = cmd("d1", Value::Empty, Value::file("f"));
        assert!(a.weak_conflict_with(&b));

        // Directory output above a non-Empty descendant output is fine.
        let c = cmd("d1/f2", Value::Empty, Value::file("f"));
        assert!(!a.weak_conflict_with(&c));
        assert!(b.weak_conflict_with(&c));

        // Emptying a descendant never conflicts with the ancestor.
        let d = cmd("d1/f2", Value::file("f"), Value::Empty);
        assert!(!b.weak_conflict_with(&d));

        // Unrelated nodes never conflict.
        let e = cmd("d9", Value::Dir, Value::Empty);
        assert!(!a.weak_conflict_with(&e));
    }

    #[test]
    fn test_render() {
        let c = cmd("d1/d2/f3", Value::Empty, Value::file("f2"));
        assert_eq!("<d1/d2/f3|E|F(f2)>", c.to_string());
        assert_eq!(
            "\x1b[31;1m<\x1b[0md1\x1b[31;1m|\x1b[0mE\x1b[31;1m|\x1b[0mD\x1b[31;1m>\x1b[0m",
            cmd("d1", Value::Empty, Value::Dir).render(true)
        );
    }
}
