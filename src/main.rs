use std::fs;
use std::io;

use anyhow::{bail, Context};
use clap::Parser;
use tilesim::sim::log::init_logging;
use tilesim::sim::trace::load_trace;
use tilesim::ui::{make_replay, TilesimArgs};

pub fn main() -> anyhow::Result<()> {
    let argv = TilesimArgs::parse();
    let config = fs::read_to_string(&argv.config_path)
        .with_context(|| format!("failed to read config file {}", argv.config_path.display()))?;

    let mut replay = make_replay(&config, Some(&argv))?;
    init_logging(replay.sim_config().log_level);

    let trace_path = match &replay.sim_config().trace {
        Some(path) => path.clone(),
        None => bail!("no trace given, set sim.trace or pass --trace"),
    };
    let records = load_trace(&trace_path)?;
    replay.run(&records)?;

    if argv.json {
        println!("{}", serde_json::to_string_pretty(&replay.report())?);
    } else {
        replay.output_summary(&mut io::stdout().lock())?;
    }
    Ok(())
}
