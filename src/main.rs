/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fs;

use anyhow::{bail, Context};
use args::Args;
use clap::Parser;
use config::Config;
use log::{error, info};
use serde::Serialize;

use reconciler::algebra::command::Command;
use reconciler::algebra::merge::{enumerate_mergers, greedy_merger, Decision};
use reconciler::algebra::refluent::check_refluent;
use reconciler::algebra::session::Session;
use reconciler::algebra::set::CommandSet;

mod args;
mod config;

fn main() {
    let status = run();
    if let Err(ref err) = status {
        error!("{:?}", err);
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    log4rs::init_file("log4rs.yml", Default::default()).with_context(|| "failed to init logger")?;
    info!("init logger");

    info!("read configuration");
    let config = fs::read_to_string(&args.config_path)
        .with_context(|| "failed to read configuration file")?;
    let config: Config =
        toml::from_str(&config).with_context(|| "failed to parse configuration")?;

    match args.mode {
        args::Mode::Canon { session_file } => {
            let session = read_session(&session_file)?;
            for (label, sequence) in session.iter() {
                let canonical = sequence
                    .checked_canonical_set()
                    .with_context(|| format!("sequence '{}' cannot be canonicalized", label))?;
                println!("{} = {}", label, canonical.render(config.color));
            }
        }
        args::Mode::Check { session_file } => {
            let session = read_session(&session_file)?;
            let mut all_canonical = true;
            for (label, sequence) in session.iter() {
                let verdict = sequence.as_set().is_canonical();
                all_canonical &= verdict;
                println!("{}: {}", label, if verdict { "canonical" } else { "NOT canonical" });
            }
            if all_canonical {
                let sets: Vec<CommandSet> =
                    session.sequences().map(|sequence| sequence.as_set()).collect();
                let refluent = check_refluent(&sets);
                println!(
                    "batch: {}",
                    if refluent { "jointly refluent" } else { "NOT jointly refluent" }
                );
            }
        }
        args::Mode::Merge { session_file } => {
            let sets = canonical_batch(&read_session(&session_file)?)?;
            let merger = greedy_merger(&sets);
            println!("{}", merger.render(config.color));
        }
        args::Mode::Enumerate { session_file, json } => {
            let sets = canonical_batch(&read_session(&session_file)?)?;
            let mut produced: u64 = 0;
            for item in enumerate_mergers(&sets) {
                let (decisions, merger) = item?;
                if json {
                    let record = MergerRecord {
                        decisions: &decisions,
                        merger: &merger.commands,
                    };
                    println!("{}", serde_json::to_string(&record)?);
                } else {
                    println!("{}", merger.render(config.color));
                }
                produced += 1;
                if config.heartbeat_interval > 0
                    && produced % u64::from(config.heartbeat_interval) == 0
                {
                    info!("{} mergers produced", produced);
                }
                if config.max_mergers > 0 && produced >= config.max_mergers {
                    info!("stopping at the configured limit of {} mergers", config.max_mergers);
                    break;
                }
            }
            info!("enumeration finished with {} mergers", produced);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct MergerRecord<'a> {
    decisions: &'a [Decision],
    merger: &'a [Command],
}

fn read_session(path: &str) -> anyhow::Result<Session> {
    let spec =
        fs::read_to_string(path).with_context(|| format!("failed to read session file '{}'", path))?;
    Session::try_parse(&spec).with_context(|| "failed to parse session spec")
}

/// The canonical sets of the batch, in definition order. The merger
/// operations assume canonical, jointly refluent inputs, so both are
/// verified here.
fn canonical_batch(session: &Session) -> anyhow::Result<Vec<CommandSet>> {
    let mut sets = vec![];
    for (label, sequence) in session.iter() {
        let set = sequence.as_set();
        if !set.is_canonical() {
            bail!("sequence '{}' is not canonical", label);
        }
        sets.push(set);
    }
    if !check_refluent(&sets) {
        bail!("the sequences are not jointly refluent, no merger exists");
    }
    Ok(sets)
}
