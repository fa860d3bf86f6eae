use std::str::FromStr;

use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    Random,
    #[default]
    Lru,
}

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "random" => Ok(Self::Random),
            "lru" => Ok(Self::Lru),
            _ => Err(format!(
                "unsupported replacement policy '{}', expected one of: random, lru",
                value
            )),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CacheConfig {
    pub line_size: u64,
    pub num_sets: usize,
    pub associativity: usize,
    pub victim_cache_size: usize,
    pub replacement_policy: ReplacementPolicy,
    /// starting value of the way-selection counter used by `random`
    pub seed: u64,
}

impl Config for CacheConfig {}

impl Default for CacheConfig {
    fn default() -> Self {
        let s = Self {
            line_size: 64,
            num_sets: 64,
            associativity: 4,
            victim_cache_size: 8,
            replacement_policy: ReplacementPolicy::Lru,
            seed: 0,
        };
        s.ensure_valid();
        s
    }
}

impl CacheConfig {
    /// Address splitting is done with shifts and masks, so the geometry has to be a power of
    /// two. Anything else is a fatal configuration error.
    pub fn ensure_valid(&self) {
        assert!(
            self.line_size.is_power_of_two(),
            "line_size must be a power of two, got {}",
            self.line_size
        );
        assert!(
            self.num_sets.is_power_of_two(),
            "num_sets must be a power of two, got {}",
            self.num_sets
        );
        assert!(self.associativity > 0, "associativity must be > 0");
    }

    pub fn size_bytes(&self) -> u64 {
        self.line_size * self.num_sets as u64 * self.associativity as u64
    }
}
