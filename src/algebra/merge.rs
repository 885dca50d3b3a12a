/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::command::Command;
use super::node::Node;
use super::sequence::CommandSequence;
use super::set::CommandSet;

type Result<T> = std::result::Result<T, MergeError>;

#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    #[error(
        "decision {index} offers {found} options but {stored} were recorded; \
         the input changed between runs"
    )]
    DecisionMismatch {
        index: usize,
        stored: usize,
        found: usize,
    },
}

/// One recorded conflict resolution. The vector of these is the
/// external continuation of the merger enumeration: pass it back
/// unchanged and the engine advances it to the next combination.
#[derive(Debug, Clone, Hash, Deserialize, Serialize, PartialEq, Eq)]
pub struct Decision {
    pub current: usize,
    pub num_options: usize,
    pub comment: String,
}

pub type DecisionVector = Vec<Decision>;

/// Produce one merger of the canonical sets, keeping the first command
/// encountered on every conflicting node.
///
/// Ties follow the union order, which follows the order of `sets`; for
/// jointly refluent inputs the result is a valid canonical merger.
pub fn greedy_merger(sets: &[CommandSet]) -> CommandSequence {
    let union = CommandSequence::from_set_union(sets);
    let up = union.up_pointers();
    let mut delete_conflicts_down: HashSet<Node> = HashSet::new();
    let mut merger = CommandSequence::new(vec![]);
    let mut decided: Option<Node> = None;
    for (i, command) in union.iter().enumerate() {
        if decided.as_ref() == Some(&command.node) {
            continue;
        }
        if let Some(u) = up[i] {
            if delete_conflicts_down.contains(&union.commands[u].node) {
                delete_conflicts_down.insert(command.node.clone());
                if !command.after.is_empty() {
                    continue;
                }
            }
        }
        merger.push(command.clone());
        decided = Some(command.node.clone());
        if !command.after.is_dir() {
            delete_conflicts_down.insert(command.node.clone());
        }
    }
    merger
}

/// Produce the next merger of the canonical sets.
///
/// Pass `None` to start the enumeration; pass the previously returned
/// vector back to advance it (rightmost decision first, exhausted
/// decisions popped). Returns `None` once every combination has been
/// produced. Decisions are identified by the order in which the run
/// requests them, so the same prefix of choices always replays the
/// same conflicts.
pub fn any_merger(
    sets: &[CommandSet],
    decisions: Option<DecisionVector>,
) -> Result<Option<(DecisionVector, CommandSequence)>> {
    let decisions = match decisions {
        None => DecisionVector::new(),
        Some(previous) => match advance(previous) {
            None => return Ok(None),
            Some(next) => next,
        },
    };
    let union = CommandSequence::from_set_union(sets);
    let up = union.up_pointers();
    let len = union.len();
    let mut run = MergeRun {
        commands: union.commands,
        up,
        delete: vec![false; len],
        flags: HashMap::new(),
        decider: Decider::resume(decisions),
    };
    run.seed_flags();
    run.file_conflicts()?;
    run.subtree_conflicts()?;
    run.empty_conflicts()?;
    run.dir_conflicts()?;
    let merger = run.collect();
    Ok(Some((run.decider.decisions, merger)))
}

/// Iterator over every merger of the canonical sets, in lexicographic
/// decision order. See [`enumerate_mergers`].
pub struct Mergers<'a> {
    sets: &'a [CommandSet],
    decisions: Option<DecisionVector>,
    done: bool,
}

/// Drive [`any_merger`] to exhaustion. Every merger is yielded exactly
/// once, together with the decision vector that produced it.
pub fn enumerate_mergers(sets: &[CommandSet]) -> Mergers<'_> {
    Mergers {
        sets,
        decisions: None,
        done: false,
    }
}

impl Iterator for Mergers<'_> {
    type Item = Result<(DecisionVector, CommandSequence)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match any_merger(self.sets, self.decisions.take()) {
            Ok(None) => {
                self.done = true;
                None
            }
            Ok(Some((decisions, merger))) => {
                self.decisions = Some(decisions.clone());
                Some(Ok((decisions, merger)))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Advance the vector to the next combination: bump the rightmost
/// decision, popping every decision that overflows. None when the
/// whole space is exhausted.
fn advance(mut decisions: DecisionVector) -> Option<DecisionVector> {
    while let Some(last) = decisions.last_mut() {
        last.current += 1;
        if last.current < last.num_options {
            return Some(decisions);
        }
        decisions.pop();
    }
    None
}

/// Replays recorded decisions and records fresh ones at the end.
struct Decider {
    decisions: DecisionVector,
    cursor: usize,
}

impl Decider {
    fn resume(decisions: DecisionVector) -> Decider {
        Decider {
            decisions,
            cursor: 0,
        }
    }

    fn decide(&mut self, num_options: usize, comment: String) -> Result<usize> {
        if self.cursor == self.decisions.len() {
            self.decisions.push(Decision {
                current: 0,
                num_options,
                comment,
            });
            self.cursor += 1;
            return Ok(0);
        }
        let decision = &self.decisions[self.cursor];
        if decision.num_options != num_options {
            return Err(MergeError::DecisionMismatch {
                index: self.cursor,
                stored: decision.num_options,
                found: num_options,
            });
        }
        self.cursor += 1;
        Ok(self.decisions[self.cursor - 1].current)
    }
}

/// Transient per-node state of one `any_merger` run.
#[derive(Debug, Default, Clone, Copy)]
struct NodeFlags {
    has_destructor_on_dir: bool,
    has_constructor_on_empty_child: bool,
    delete_creators_down: bool,
    delete_creators_strictly_down: bool,
    delete_destructors_up: bool,
}

/// State of one `any_merger` invocation: the de-duplicated union with
/// its up pointers, per-command delete marks and the per-node flag
/// table. Dropped at the end of the run, which is what resets the
/// flags between runs.
struct MergeRun {
    commands: Vec<Command>,
    up: Vec<Option<usize>>,
    delete: Vec<bool>,
    flags: HashMap<Node, NodeFlags>,
    decider: Decider,
}

impl MergeRun {
    fn flag(&self, node: &Node) -> NodeFlags {
        self.flags.get(node).copied().unwrap_or_default()
    }

    fn flag_mut(&mut self, node: &Node) -> &mut NodeFlags {
        self.flags.entry(node.clone()).or_default()
    }

    fn seed_flags(&mut self) {
        for i in 0..self.commands.len() {
            let command = &self.commands[i];
            let node = command.node.clone();
            let destructor_on_dir = command.is_destructor() && command.before.is_dir();
            let constructor_on_empty = command.is_constructor() && command.before.is_empty();
            if destructor_on_dir {
                self.flag_mut(&node).has_destructor_on_dir = true;
            }
            if constructor_on_empty {
                if let Some(parent) = node.parent() {
                    self.flag_mut(&parent).has_constructor_on_empty_child = true;
                }
            }
        }
    }

    /// Carry the creator-deletion flags down from the nearest command
    /// ancestor, then apply both deletion rules to command i.
    fn process_flags(&mut self, i: usize) {
        if let Some(u) = self.up[i] {
            let ancestor = self.flag(&self.commands[u].node);
            if ancestor.delete_creators_strictly_down || ancestor.delete_creators_down {
                let node = self.commands[i].node.clone();
                self.flag_mut(&node).delete_creators_down = true;
            }
        }
        let flags = self.flag(&self.commands[i].node);
        if flags.delete_creators_down && !self.commands[i].after.is_empty() {
            self.delete[i] = true;
        }
        if flags.delete_destructors_up && self.commands[i].is_destructor() {
            self.delete[i] = true;
        }
    }

    /// Cancel destructors from command i upwards along the up chain,
    /// stopping at the first node already cancelled. Clearing
    /// `has_destructor_on_dir` keeps the backward passes from deciding
    /// conflicts whose destructor side is already gone.
    fn mark_delete_destructors_up(&mut self, i: usize) {
        let mut current = Some(i);
        while let Some(j) = current {
            let node = self.commands[j].node.clone();
            let flags = self.flag_mut(&node);
            if flags.delete_destructors_up {
                break;
            }
            flags.delete_destructors_up = true;
            flags.has_destructor_on_dir = false;
            current = self.up[j];
        }
    }

    /// Node-local part of the deletion rules, enough for the backward
    /// passes where the downward carry cannot run.
    fn cancel_destructor(&mut self, i: usize) {
        let flags = self.flag(&self.commands[i].node);
        if flags.delete_destructors_up && self.commands[i].is_destructor() {
            self.delete[i] = true;
        }
    }

    /// Pass 1: conflicting commands on File nodes, forward. The winner
    /// shapes the subtree: a removal forbids creations below, a
    /// directory promotion cancels destructors above, an edit does
    /// both.
    fn file_conflicts(&mut self) -> Result<()> {
        let mut i = 0;
        while i < self.commands.len() {
            let node = self.commands[i].node.clone();
            let mut group = vec![];
            let mut j = i;
            while j < self.commands.len() && self.commands[j].node == node {
                self.process_flags(j);
                if !self.delete[j] {
                    group.push(j);
                }
                j += 1;
            }
            if group.len() > 1 && self.commands[group[0]].before.is_file() {
                let comment = format!("conflicting updates of file '{}'", node);
                let keep = group[self.decider.decide(group.len(), comment)?];
                for &g in &group {
                    if g != keep {
                        self.delete[g] = true;
                    }
                }
                if self.commands[keep].is_destructor() {
                    self.flag_mut(&node).delete_creators_strictly_down = true;
                } else if self.commands[keep].is_edit() {
                    self.mark_delete_destructors_up(keep);
                    self.flag_mut(&node).delete_creators_strictly_down = true;
                } else {
                    self.mark_delete_destructors_up(keep);
                }
            }
            i = j;
        }
        Ok(())
    }

    /// Pass 2: a directory torn down by one replica while another
    /// builds inside it, backward so deeper conflicts resolve first.
    /// Option 0 destroys the directory, option 1 keeps the builds.
    fn subtree_conflicts(&mut self) -> Result<()> {
        let mut end = self.commands.len();
        while end > 0 {
            let node = self.commands[end - 1].node.clone();
            let mut start = end - 1;
            while start > 0 && self.commands[start - 1].node == node {
                start -= 1;
            }
            for j in start..end {
                self.cancel_destructor(j);
            }
            let flags = self.flag(&node);
            if flags.has_destructor_on_dir && flags.has_constructor_on_empty_child {
                let dir_destructor = (start..end).find(|&j| {
                    !self.delete[j]
                        && self.commands[j].is_destructor()
                        && self.commands[j].before.is_dir()
                });
                if let Some(d) = dir_destructor {
                    let comment = format!("destroy directory '{}' or build inside it", node);
                    if self.decider.decide(2, comment)? == 0 {
                        self.flag_mut(&node).delete_creators_strictly_down = true;
                    } else {
                        self.mark_delete_destructors_up(d);
                    }
                }
            }
            end = start;
        }
        Ok(())
    }

    /// Pass 3: conflicting creations on Empty nodes, forward. A file
    /// winner forbids creations below it.
    fn empty_conflicts(&mut self) -> Result<()> {
        let mut i = 0;
        while i < self.commands.len() {
            let node = self.commands[i].node.clone();
            let mut group = vec![];
            let mut j = i;
            while j < self.commands.len() && self.commands[j].node == node {
                self.process_flags(j);
                if !self.delete[j] {
                    group.push(j);
                }
                j += 1;
            }
            if group.len() > 1 && self.commands[group[0]].before.is_empty() {
                let comment = format!("conflicting creations of '{}'", node);
                let keep = group[self.decider.decide(group.len(), comment)?];
                for &g in &group {
                    if g != keep {
                        self.delete[g] = true;
                    }
                }
                if self.commands[keep].after.is_file() {
                    self.flag_mut(&node).delete_creators_strictly_down = true;
                }
            }
            i = j;
        }
        Ok(())
    }

    /// Pass 4: conflicting teardowns of Directory nodes, backward. A
    /// winner leaving a file needs its ancestors kept alive.
    fn dir_conflicts(&mut self) -> Result<()> {
        let mut end = self.commands.len();
        while end > 0 {
            let node = self.commands[end - 1].node.clone();
            let mut start = end - 1;
            while start > 0 && self.commands[start - 1].node == node {
                start -= 1;
            }
            let mut group = vec![];
            for j in start..end {
                self.cancel_destructor(j);
                if !self.delete[j] {
                    group.push(j);
                }
            }
            if group.len() > 1 && self.commands[group[0]].before.is_dir() {
                let comment = format!("conflicting teardowns of directory '{}'", node);
                let keep = group[self.decider.decide(group.len(), comment)?];
                for &g in &group {
                    if g != keep {
                        self.delete[g] = true;
                    }
                }
                if self.commands[keep].after.is_file() {
                    if let Some(u) = self.up[keep] {
                        self.mark_delete_destructors_up(u);
                    }
                }
            }
            end = start;
        }
        Ok(())
    }

    /// Pass 5: final forward walk; flags settle and every undeleted
    /// command joins the merger.
    fn collect(&mut self) -> CommandSequence {
        let mut merger = CommandSequence::new(vec![]);
        for i in 0..self.commands.len() {
            self.process_flags(i);
            if !self.delete[i] {
                merger.push(self.commands[i].clone());
            }
        }
        merger
    }
}
