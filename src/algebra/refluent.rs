/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::{HashMap, HashSet};

use super::node::Node;
use super::sequence::CommandSequence;
use super::set::CommandSet;

/// Whether the canonical sets can be merged without contradiction on
/// their shared nodes.
///
/// Four conditions are checked over the node-ordered union, with a
/// side table recording which replicas touch each node:
///   (a) commands on the same node agree on their input value;
///   (b) a command's nearest-ancestor command, when present, sits on
///       the parent of its node;
///   (c) below a parent whose input is not a directory, every replica
///       touching the child also touches the parent;
///   (d) a command with a non-Empty input requires every replica
///       touching its nearest command ancestor to touch it too.
pub fn check_refluent(sets: &[CommandSet]) -> bool {
    let mut index: HashMap<Node, HashSet<usize>> = HashMap::new();
    for (replica, set) in sets.iter().enumerate() {
        for command in set.iter() {
            index.entry(command.node.clone()).or_default().insert(replica);
        }
    }

    let union = CommandSequence::from_set_union(sets);
    let up = union.up_pointers();

    for (i, command) in union.iter().enumerate() {
        if i > 0 {
            let previous = &union.commands[i - 1];
            if previous.node == command.node && previous.before != command.before {
                return false;
            }
        }
        if let Some(u) = up[i] {
            let ancestor = &union.commands[u];
            if !ancestor.node.is_parent_of(&command.node) {
                return false;
            }
            if !ancestor.before.is_dir() {
                if !index[&command.node].is_subset(&index[&ancestor.node]) {
                    return false;
                }
            }
            if !command.before.is_empty() {
                if !index[&ancestor.node].is_subset(&index[&command.node]) {
                    return false;
                }
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::session::Session;

    fn sets(spec: &str) -> Vec<CommandSet> {
        Session::try_parse(spec)
            .unwrap()
            .sequences()
            .map(|seq| seq.as_set())
            .collect()
    }

    #[test]
    fn test_file_below_replaced_file() {
        assert!(check_refluent(&sets(
            "a=<1|D|Ff1>;
             b=<1/2|E|Ff2>"
        )));
    }

    #[test]
    fn test_file_below_kept_file_is_rejected() {
        // The child's ancestor stays a file, so it cannot hold
        // descendants.
        assert!(!check_refluent(&sets(
            "a=<1|Ff1|Ff2>;
             b=<1/2|E|Ff3>"
        )));
    }

    #[test]
    fn test_five_replicas_agree() {
        assert!(check_refluent(&sets(
            "a=<1/2|D|E>.<1|D|E>;
             b=<1/2/3|E|D>;
             c=<1/2|D|Ff2>.<0|E|D>;
             d=<1/2/3|E|D>.<1/2/3/4|E|Ff3>;
             e=<1/2/3|E|D>.<1/2/3/4b|E|Ff4>"
        )));
    }

    #[test]
    fn test_disagreeing_input_value_is_rejected() {
        // d starts from F at 1/2/3 while b and e start from E.
        assert!(!check_refluent(&sets(
            "a=<1/2|D|E>.<1|D|E>;
             b=<1/2/3|E|D>;
             c=<1/2|D|Ff2>.<0|E|D>;
             d=<1/2/3|F|D>.<1/2/3/4|E|Ff3>;
             e=<1/2/3|E|D>.<1/2/3/4b|E|Ff4>"
        )));
    }

    #[test]
    fn test_disagreeing_parent_kind_is_rejected() {
        // a and c assume a file at 1/2, the others a directory below it.
        assert!(!check_refluent(&sets(
            "a=<1/2|F|E>.<1|D|E>;
             b=<1/2/3|E|D>;
             c=<1/2|F|Ff2>.<0|E|D>;
             d=<1/2/3|E|D>.<1/2/3/4|E|Ff3>;
             e=<1/2/3|E|D>.<1/2/3/4b|E|Ff4>"
        )));
    }

    #[test]
    fn test_distant_descendant_of_destroyed_dir_is_rejected() {
        assert!(!check_refluent(&sets(
            "a=<1/2|D|E>.<1|D|E>;
             b=<1/2/3/4/5/6|E|D>"
        )));
    }

    #[test]
    fn test_content_disagreement_is_refluent() {
        assert!(check_refluent(&sets(
            "a=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>;
             b=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff2>"
        )));
    }

    #[test]
    fn test_destroy_parent_versus_build_children_is_refluent() {
        assert!(check_refluent(&sets(
            "a=<1/2|D|E>.<1|D|E>;
             b=<1/2/3|E|D>"
        )));
    }
}
