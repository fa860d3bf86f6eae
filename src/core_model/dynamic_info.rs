use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

/// Per-operand information computed by the functional side while executing an instruction,
/// handed to the timing model in operand order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicInstructionInfo {
    MemoryRead { addr: u64, latency: u64 },
    MemoryWrite { addr: u64, latency: u64 },
    Branch { taken: bool, target: u64 },
}

impl DynamicInstructionInfo {
    pub fn memory_read(addr: u64, latency: u64) -> Self {
        Self::MemoryRead { addr, latency }
    }

    pub fn memory_write(addr: u64, latency: u64) -> Self {
        Self::MemoryWrite { addr, latency }
    }
}

impl Display for DynamicInstructionInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoryRead { addr, latency } => write!(f, "memory read [addr: {:#x}, latency: {}]", addr, latency),
            Self::MemoryWrite { addr, latency } => write!(f, "memory write [addr: {:#x}, latency: {}]", addr, latency),
            Self::Branch { taken, target } => write!(f, "branch [taken: {}, target: {:#x}]", taken, target),
        }
    }
}

/// Producer/consumer handoff between instruction execution and the timing model.
pub type DynamicInfoQueue = VecDeque<DynamicInstructionInfo>;
