/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// Stop enumerating after this many mergers (0 - no limit)
    pub max_mergers: u64,
    /// Render commands with ANSI colored delimiters
    pub color: bool,
    /// Log a progress line after this many mergers during enumeration
    pub heartbeat_interval: u16,
}
