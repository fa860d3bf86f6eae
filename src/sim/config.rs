use std::path::PathBuf;

use anyhow::Context;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::*;

/// Top-level knobs of the replay driver. The three models have their own sections.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub log_level: u64,
    pub trace: Option<PathBuf>,
    /// dcache access time charged to a load or store that hits in the modeled L1
    pub hit_latency: u64,
    /// latency charged when the modeled L1 misses
    pub miss_latency: u64,
    /// fixed execution cost of every replayed memory instruction
    pub instruction_cost: u64,
}

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> Self {
        match section {
            Some(value) => value.clone().try_into().expect("cannot deserialize config"),
            None => {
                warn!("config section not found");
                Self::default()
            }
        }
    }
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            log_level: 0,
            trace: None,
            hit_latency: 1,
            miss_latency: 100,
            instruction_cost: 1,
        }
    }
}

pub fn parse_config_table(toml_string: &str) -> anyhow::Result<Table> {
    toml::from_str(toml_string).context("cannot parse config toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let table = parse_config_table("[other]\nx = 1\n").unwrap();
        let sim = SimConfig::from_section(table.get("sim"));
        assert_eq!(sim.miss_latency, 100);
        assert!(sim.trace.is_none());
    }

    #[test]
    fn partial_section_keeps_unset_defaults() {
        let table = parse_config_table("[sim]\nmiss_latency = 40\n").unwrap();
        let sim = SimConfig::from_section(table.get("sim"));
        assert_eq!(sim.miss_latency, 40);
        assert_eq!(sim.hit_latency, 1);
        assert_eq!(sim.instruction_cost, 1);
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(parse_config_table("[sim\n").is_err());
    }
}
