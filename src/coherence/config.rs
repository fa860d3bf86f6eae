use std::str::FromStr;

use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryScheme {
    /// Limited pointers with a software trap once the hardware pointers run out
    #[default]
    Limitless,
    /// Limited pointers that fall back to broadcasting to every tile
    LimitedBroadcast,
}

impl FromStr for DirectoryScheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "limitless" => Ok(Self::Limitless),
            "limited_broadcast" => Ok(Self::LimitedBroadcast),
            _ => Err(format!(
                "unsupported directory scheme '{}', expected one of: limitless, limited_broadcast",
                value
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DirectoryConfig {
    pub scheme: DirectoryScheme,
    /// sharers the hardware can track before overflowing
    pub max_hw_sharers: usize,
    /// total number of tiles, i.e. the logical sharer capacity
    pub max_num_sharers: usize,
    pub software_trap_penalty: u64,
    pub seed: u64,
}

impl Config for DirectoryConfig {}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            scheme: DirectoryScheme::Limitless,
            max_hw_sharers: 4,
            max_num_sharers: 64,
            software_trap_penalty: 0,
            seed: 0,
        }
    }
}

impl DirectoryConfig {
    pub fn ensure_valid(&self) {
        assert!(self.max_hw_sharers > 0, "max_hw_sharers must be > 0");
        assert!(self.max_num_sharers > 0, "max_num_sharers must be > 0");
        assert!(
            self.max_hw_sharers <= self.max_num_sharers,
            "max_hw_sharers ({}) exceeds max_num_sharers ({})",
            self.max_hw_sharers,
            self.max_num_sharers
        );
    }
}
