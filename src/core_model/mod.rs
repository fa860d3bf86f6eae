pub mod config;
pub mod dynamic_info;
pub mod instruction;
pub mod iocoom;
pub mod units;

#[cfg(test)]
mod unit_tests;

pub use config::CoreModelConfig;
pub use dynamic_info::{DynamicInfoQueue, DynamicInstructionInfo};
pub use instruction::{Direction, Instruction, Operand, OperandKind};
pub use iocoom::{CoreModelSummary, CoreTimingModel};
pub use units::{ExecutionUnit, StoreBuffer};
