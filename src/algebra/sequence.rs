/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashSet;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::command::Command;
use super::set::CommandSet;

/// An ordered sequence of commands.
///
/// Commands are held in a vector; algorithms that need the tree
/// structure thread it through parallel index arrays (see
/// [`CommandSequence::up_pointers`]) instead of linking the commands
/// themselves.
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommandSequence {
    pub commands: Vec<Command>,
}

impl CommandSequence {
    pub fn new(commands: Vec<Command>) -> CommandSequence {
        CommandSequence { commands }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Iterate the commands last to first.
    pub fn backward(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter().rev()
    }

    /// Return another sequence ordered by node. Commands on equal
    /// nodes keep their original relative order (the sort is stable),
    /// so a non-breaking sequence stays non-breaking.
    pub fn order_by_node(&self) -> CommandSequence {
        let mut commands = self.commands.clone();
        commands.sort_by(|a, b| a.node.cmp(&b.node));
        CommandSequence { commands }
    }

    /// Return another sequence ordered by (node, before, after).
    /// Structurally equal commands end up adjacent.
    pub fn order_by_node_value(&self) -> CommandSequence {
        let mut commands = self.commands.clone();
        commands.sort();
        CommandSequence { commands }
    }

    /// For every position, the index of the nearest preceding command
    /// whose node is a strict ancestor, or None.
    ///
    /// Requires the sequence to be node-ordered. Amortised linear:
    /// each lookup restarts from the previous command and follows its
    /// already-computed chain upwards.
    pub fn up_pointers(&self) -> Vec<Option<usize>> {
        let mut up: Vec<Option<usize>> = vec![None; self.commands.len()];
        for i in 1..self.commands.len() {
            let node = &self.commands[i].node;
            let mut candidate = Some(i - 1);
            while let Some(j) = candidate {
                if self.commands[j].node.is_ancestor_of(node) {
                    up[i] = Some(j);
                    break;
                }
                candidate = up[j];
            }
        }
        up
    }

    pub fn as_set(&self) -> CommandSet {
        self.commands.iter().cloned().collect()
    }

    /// Sequence a set, ordered by (node, before, after) so the result
    /// is deterministic.
    pub fn from_set(set: &CommandSet) -> CommandSequence {
        let mut commands: Vec<Command> = set.iter().cloned().collect();
        commands.sort();
        CommandSequence { commands }
    }

    /// Node-ordered union of several sets with structurally equal
    /// commands de-duplicated.
    ///
    /// Distinct commands on the same node keep the order of the sets
    /// they came from; this input-order bias is what the greedy merger
    /// breaks ties by, so callers wanting a particular winner put its
    /// set first.
    pub fn from_set_union(sets: &[CommandSet]) -> CommandSequence {
        let mut seen: HashSet<Command> = HashSet::new();
        let mut commands: Vec<Command> = vec![];
        for set in sets {
            for command in CommandSequence::from_set(set).commands {
                if seen.insert(command.clone()) {
                    commands.push(command);
                }
            }
        }
        CommandSequence { commands }.order_by_node()
    }

    /// Order a canonical set into an executable sequence: every
    /// constructor in node-ascending order, then every non-constructor
    /// in node-descending order. Applied to the shared initial state
    /// the result is non-breaking.
    pub fn order_set(set: &CommandSet) -> CommandSequence {
        let ordered = CommandSequence::from_set(set);
        let mut commands: Vec<Command> = vec![];
        commands.extend(ordered.iter().filter(|c| c.is_constructor()).cloned());
        commands.extend(ordered.backward().filter(|c| !c.is_constructor()).cloned());
        CommandSequence { commands }
    }

    pub fn render(&self, color: bool) -> String {
        self.commands
            .iter()
            .map(|c| c.render(color))
            .collect::<Vec<String>>()
            .join(".")
    }
}

impl Display for CommandSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::session::Session;

    fn seq(session: &Session, label: &str) -> CommandSequence {
        session.get(label).unwrap().clone()
    }

    #[test]
    fn test_order_by_node() {
        let s = Session::try_parse(
            "a=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>.<d1/d2/f3|Ff1|Ff2>;
             b=<d1/d2/f3|E|Ff1>.<d1/d2|E|D>.<d1/d2/f3|Ff1|Ff2>.<d1|E|D>",
        )
        .unwrap();
        assert_eq!(seq(&s, "a"), seq(&s, "b").order_by_node());
    }

    #[test]
    fn test_order_by_node_value() {
        let s = Session::try_parse(
            "a=<d1|E|Ff2>.<d1|E|Ff1>.<d1|D|E>.<d2|E|D>.<d1|E|Ff1>;
             t=<d1|E|Ff1>.<d1|E|Ff1>.<d1|E|Ff2>.<d1|D|E>.<d2|E|D>",
        )
        .unwrap();
        assert_eq!(seq(&s, "t"), seq(&s, "a").order_by_node_value());
    }

    #[test]
    fn test_up_pointers() {
        let s = Session::try_parse(
            "a=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>.<d1/d4|E|Ff2>.<d5|E|D>",
        )
        .unwrap();
        let up = seq(&s, "a").up_pointers();
        assert_eq!(vec![None, Some(0), Some(1), Some(0), None], up);
    }

    #[test]
    fn test_up_pointers_skip_same_node() {
        let s = Session::try_parse("a=<d1|E|D>.<d1/f2|E|Ff1>.<d1/f2|Ff1|Ff2>").unwrap();
        let up = seq(&s, "a").up_pointers();
        assert_eq!(vec![None, Some(0), Some(0)], up);
    }

    #[test]
    fn test_from_set_union_deduplicates() {
        let s = Session::try_parse(
            "a=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>;
             b=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff2>;
             t=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>.<d1/d2/f3|E|Ff2>",
        )
        .unwrap();
        let union =
            CommandSequence::from_set_union(&[seq(&s, "a").as_set(), seq(&s, "b").as_set()]);
        assert_eq!(seq(&s, "t").as_set(), union.as_set());
        assert_eq!(4, union.len());
    }

    #[test]
    fn test_from_set_union_keeps_input_order_on_node_ties() {
        let s = Session::try_parse(
            "a=<d1/d2/f3|E|Ff2>;
             b=<d1/d2/f3|E|Ff1>",
        )
        .unwrap();
        let union =
            CommandSequence::from_set_union(&[seq(&s, "a").as_set(), seq(&s, "b").as_set()]);
        assert_eq!(seq(&s, "a").commands[0], union.commands[0]);
        assert_eq!(seq(&s, "b").commands[0], union.commands[1]);
    }

    #[test]
    fn test_order_set() {
        let s = Session::try_parse(
            "a=<d1/d2|E|D>.<d1/d2/f3|E|Ff1>.<d1|E|D>;
             b=<d1|E|D>.<d1/d2|E|D>.<d1/d2/f3|E|Ff1>",
        )
        .unwrap();
        assert_eq!(seq(&s, "b"), CommandSequence::order_set(&seq(&s, "a").as_set()));
    }

    #[test]
    fn test_order_set_constructors_first() {
        let s = Session::try_parse(
            "a=<d1|D|E>.<d1/d2|D|E>.<d1/d2/f3|Ff1|E>.<d4|E|D>.<d4/f5|E|Ff2>.<f6|Ff3|Ff4>",
        )
        .unwrap();
        let ordered = CommandSequence::order_set(&seq(&s, "a").as_set());
        assert_eq!(seq(&s, "a").as_set(), ordered.as_set());
        let first_non_constructor = ordered
            .iter()
            .position(|c| !c.is_constructor())
            .unwrap();
        assert!(ordered
            .iter()
            .skip(first_non_constructor)
            .all(|c| !c.is_constructor()));
        // Non-constructors run deepest first.
        let tail: Vec<&Command> = ordered.iter().skip(first_non_constructor).collect();
        assert!(tail.windows(2).all(|w| w[0].node > w[1].node));
    }
}
