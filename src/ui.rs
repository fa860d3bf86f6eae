use std::path::PathBuf;

use clap::Parser;

use crate::cache::CacheConfig;
use crate::coherence::DirectoryConfig;
use crate::core_model::CoreModelConfig;
use crate::sim::config::{parse_config_table, Config, SimConfig};
use crate::sim::replay::Replay;

#[derive(Parser)]
#[command(version, about)]
pub struct TilesimArgs {
    #[arg(help = "Path to config.toml")]
    pub config_path: PathBuf,
    #[arg(long, help = "Override trace path")]
    pub trace: Option<PathBuf>,
    #[arg(long, help = "Enable log at level (0:RUST_LOG, 1:info, 2:debug)")]
    pub log: Option<u64>,
    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,
}

/// Make a Replay from the TOML configuration.
/// If `cli_args` is given, override TOML options with CLI arguments.
pub fn make_replay(toml_string: &str, cli_args: Option<&TilesimArgs>) -> anyhow::Result<Replay> {
    let config_table = parse_config_table(toml_string)?;
    let mut sim_config = SimConfig::from_section(config_table.get("sim"));
    let cache_config = CacheConfig::from_section(config_table.get("cache"));
    let core_config = CoreModelConfig::from_section(config_table.get("core"));
    let directory_config = DirectoryConfig::from_section(config_table.get("directory"));

    // override toml configs with CLI args
    if let Some(args) = cli_args {
        sim_config.log_level = args.log.unwrap_or(sim_config.log_level);
        if args.trace.is_some() {
            sim_config.trace = args.trace.clone();
        }
    }

    Ok(Replay::new(sim_config, cache_config, core_config, directory_config))
}
