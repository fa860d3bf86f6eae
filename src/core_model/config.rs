use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CoreModelConfig {
    pub num_registers: usize,
    pub num_store_buffer_entries: usize,
    pub num_outstanding_loads: usize,
    /// costs at or above this are reported as suspicious
    pub max_instruction_cost: u64,
}

impl Config for CoreModelConfig {}

impl Default for CoreModelConfig {
    fn default() -> Self {
        Self {
            num_registers: 512,
            num_store_buffer_entries: 1,
            num_outstanding_loads: 3,
            max_instruction_cost: 10000,
        }
    }
}

impl CoreModelConfig {
    pub fn ensure_valid(&self) {
        assert!(self.num_registers > 0, "num_registers must be > 0");
        assert!(self.num_store_buffer_entries > 0, "num_store_buffer_entries must be > 0");
        assert!(self.num_outstanding_loads > 0, "num_outstanding_loads must be > 0");
    }
}
