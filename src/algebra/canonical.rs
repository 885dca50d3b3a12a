/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use thiserror::Error;

use super::command::Command;
use super::sequence::CommandSequence;
use super::set::CommandSet;

type Result<T> = std::result::Result<T, CanonicalError>;

#[derive(Error, Debug, PartialEq)]
pub enum CanonicalError {
    #[error("breaking sequence: '{0}' is followed by '{1}'")]
    Breaking(Command, Command),
    #[error("collapsed set is not canonical")]
    NotCanonical,
}

impl CommandSequence {
    /// The canonical set equivalent to this sequence: order by node,
    /// collapse every same-node run to a single command from the
    /// run's first input value to its last output value, drop null
    /// results.
    ///
    /// The input is assumed non-breaking; use
    /// [`CommandSequence::checked_canonical_set`] to verify.
    pub fn canonical_set(&self) -> CommandSet {
        self.collapse_runs()
    }

    /// As [`CommandSequence::canonical_set`], but verify that every
    /// same-node run chains (each command's `after` equals the next
    /// command's `before`) and that the collapsed set really is
    /// canonical.
    pub fn checked_canonical_set(&self) -> Result<CommandSet> {
        let ordered = self.order_by_node();
        for pair in ordered.commands.windows(2) {
            if pair[0].node == pair[1].node && pair[0].after != pair[1].before {
                return Err(CanonicalError::Breaking(pair[0].clone(), pair[1].clone()));
            }
        }
        let set = ordered.collapse_runs();
        if !set.is_canonical() {
            return Err(CanonicalError::NotCanonical);
        }
        Ok(set)
    }

    fn collapse_runs(&self) -> CommandSet {
        let ordered = self.order_by_node();
        let mut out = CommandSet::new();
        let mut run: Option<Command> = None;
        for command in ordered.iter() {
            match run {
                Some(ref mut open) if open.node == command.node => {
                    open.after = command.after.clone();
                }
                _ => {
                    if let Some(done) = run.take() {
                        if !done.is_null() {
                            out.insert(done);
                        }
                    }
                    run = Some(command.clone());
                }
            }
        }
        if let Some(done) = run {
            if !done.is_null() {
                out.insert(done);
            }
        }
        out
    }
}

impl CommandSet {
    /// Whether the set is canonical: at most one command per node, and
    /// every command with a nearest-ancestor command pairs with it as
    /// a constructor pair (ancestor first) or a destructor pair
    /// (descendant first). Linear after the node sort.
    pub fn is_canonical(&self) -> bool {
        let seq = CommandSequence::from_set(self);
        let up = seq.up_pointers();
        for (i, command) in seq.iter().enumerate() {
            if i > 0 && seq.commands[i - 1].node == command.node {
                return false;
            }
            if let Some(u) = up[i] {
                let ancestor = &seq.commands[u];
                if !ancestor.is_constructor_pair_with_next(command)
                    && !command.is_destructor_pair_with_next(ancestor)
                {
                    return false;
                }
            }
        }
        true
    }
}
