/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file in TOML format
    #[arg(long, default_value_t = String::from("./config.toml"))]
    pub config_path: String,

    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, PartialEq, Clone, Subcommand)]
#[clap(rename_all = "kebab_case")]
pub enum Mode {
    /// Print the canonical set of every sequence in a session file
    Canon {
        /// Path to session file
        #[arg(short, long)]
        session_file: String,
    },
    /// Check every sequence for canonicality and the batch for joint refluency
    Check {
        /// Path to session file
        #[arg(short, long)]
        session_file: String,
    },
    /// Produce the greedy merger of the session's canonical sets
    Merge {
        /// Path to session file
        #[arg(short, long)]
        session_file: String,
    },
    /// Enumerate every merger of the session's canonical sets
    Enumerate {
        /// Path to session file
        #[arg(short, long)]
        session_file: String,
        /// Print mergers with their decision vectors as JSON
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },
}
