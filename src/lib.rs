/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Merge engine for a filesystem-synchronization algebra.
//!
//! Replicas record their local changes as sequences of commands
//! `<node|before|after>` over a shared tree of paths. The engine
//! collapses a sequence into its canonical set, decides whether a
//! batch of canonical sets can be merged without contradiction (joint
//! refluency), and produces the mergers: greedily, or all of them
//! through a replayable decision vector.

pub mod algebra;
