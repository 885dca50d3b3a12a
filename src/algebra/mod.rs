/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

pub mod canonical;
pub mod command;
pub mod merge;
pub mod node;
pub mod refluent;
pub mod sequence;
pub mod session;
pub mod set;
pub mod value;
