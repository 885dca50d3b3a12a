/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashSet;
use std::fmt::Display;

use super::command::Command;

/// An unordered set of commands. Equality is set equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    commands: HashSet<Command>,
}

impl CommandSet {
    pub fn new() -> CommandSet {
        CommandSet {
            commands: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn contains(&self, command: &Command) -> bool {
        self.commands.contains(command)
    }

    /// Inserts a command, returning whether it was not present before.
    pub fn insert(&mut self, command: Command) -> bool {
        self.commands.insert(command)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    /// Render the set, optionally with colored command delimiters.
    /// Commands are ordered by (node, before, after) so the output is
    /// deterministic.
    pub fn render(&self, color: bool) -> String {
        let mut commands: Vec<&Command> = self.commands.iter().collect();
        commands.sort();
        commands
            .iter()
            .map(|c| c.render(color))
            .collect::<Vec<String>>()
            .join(".")
    }
}

impl FromIterator<Command> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> CommandSet {
        CommandSet {
            commands: iter.into_iter().collect(),
        }
    }
}

impl Display for CommandSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::value::Value;

    fn cmd(path: &str, before: Value, after: Value) -> Command {
        Command::new(path.into(), before, after)
    }

    #[test]
    fn test_set_equality() {
        let a: CommandSet = vec![
            cmd("d1", Value::Empty, Value::Dir),
            cmd("d1/f2", Value::Empty, Value::file("f")),
        ]
        .into_iter()
        .collect();
        let b: CommandSet = vec![
            cmd("d1/f2", Value::Empty, Value::file("f")),
            cmd("d1", Value::Empty, Value::Dir),
            cmd("d1", Value::Empty, Value::Dir),
        ]
        .into_iter()
        .collect();
        assert_eq!(a, b);
        assert_eq!(2, b.len());
    }

    #[test]
    fn test_display_is_ordered() {
        let set: CommandSet = vec![
            cmd("d1/f2", Value::Empty, Value::file("f")),
            cmd("d1", Value::Empty, Value::Dir),
        ]
        .into_iter()
        .collect();
        assert_eq!("<d1|E|D>.<d1/f2|E|F(f)>", set.to_string());
    }
}
