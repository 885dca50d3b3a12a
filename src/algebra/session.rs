/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use super::command::Command;
use super::node::Node;
use super::sequence::CommandSequence;
use super::value::Value;

type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("sequence definition '{0}' is missing '='")]
    MissingLabel(String),
    #[error("empty label in sequence definition '{0}'")]
    EmptyLabel(String),
    #[error("duplicate sequence label '{0}'")]
    DuplicateLabel(String),
    #[error("command '{0}' is not delimited by '<' and '>'")]
    BadDelimiters(String),
    #[error("command '{0}' does not have three '|'-separated fields")]
    BadFieldCount(String),
    #[error("empty path in command '{0}'")]
    EmptyPath(String),
    #[error("invalid value '{0}', expected E, D or F followed by contents")]
    BadValue(String),
}

/// A batch of labelled command sequences parsed from a textual spec,
/// simulating incoming synchronization requests:
///
/// ```text
/// a=<d1/d2|E|D>.<d1/d2/f3|E|Ff1>;
/// b=<d1|D|E>
/// ```
///
/// `;` separates sequence definitions, `=` binds a label, `.`
/// separates commands, `|` separates the path and the two values, `/`
/// separates path components, and the first character of a value is
/// its kind (E, F or D) with the rest as file contents.
pub struct Session {
    sequences: Vec<(String, CommandSequence)>,
}

impl Session {
    pub fn try_parse(spec: &str) -> Result<Session> {
        let mut sequences: Vec<(String, CommandSequence)> = vec![];
        for definition in spec.split(';') {
            if definition.trim().is_empty() {
                continue;
            }
            let (label, body) = definition
                .split_once('=')
                .ok_or_else(|| SessionError::MissingLabel(definition.trim().to_owned()))?;
            let label = label.trim();
            if label.is_empty() {
                return Err(SessionError::EmptyLabel(definition.trim().to_owned()));
            }
            if sequences.iter().any(|(name, _)| name == label) {
                return Err(SessionError::DuplicateLabel(label.to_owned()));
            }
            let mut commands = vec![];
            for fragment in body.split('.') {
                commands.push(parse_command(fragment)?);
            }
            sequences.push((label.to_owned(), CommandSequence::new(commands)));
        }
        Ok(Session { sequences })
    }

    pub fn get(&self, label: &str) -> Option<&CommandSequence> {
        self.sequences
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, sequence)| sequence)
    }

    /// The sequences in definition order.
    pub fn sequences(&self) -> impl Iterator<Item = &CommandSequence> {
        self.sequences.iter().map(|(_, sequence)| sequence)
    }

    /// Labelled sequences in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandSequence)> {
        self.sequences
            .iter()
            .map(|(name, sequence)| (name.as_str(), sequence))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sequences.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

fn parse_command(fragment: &str) -> Result<Command> {
    let trimmed = fragment.trim();
    let inner = trimmed
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| SessionError::BadDelimiters(trimmed.to_owned()))?;
    let fields: Vec<&str> = inner.split('|').collect();
    if fields.len() != 3 {
        return Err(SessionError::BadFieldCount(trimmed.to_owned()));
    }
    let node = Node::from(fields[0].trim());
    if node.depth() == 0 {
        return Err(SessionError::EmptyPath(trimmed.to_owned()));
    }
    let before = parse_value(fields[1])?;
    let after = parse_value(fields[2])?;
    Ok(Command::new(node, before, after))
}

fn parse_value(field: &str) -> Result<Value> {
    let field = field.trim();
    let mut chars = field.chars();
    // Empty and Dir values carry no contents; anything trailing the
    // kind letter is ignored for them.
    match chars.next() {
        Some('E') => Ok(Value::Empty),
        Some('D') => Ok(Value::Dir),
        Some('F') => Ok(Value::file(chars.as_str())),
        _ => Err(SessionError::BadValue(field.to_owned())),
    }
}
