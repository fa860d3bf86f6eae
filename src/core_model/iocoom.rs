use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::base::behavior::*;
use crate::base::module::{module, Cycle, IsModule, ModuleBase};
use crate::core_model::config::CoreModelConfig;
use crate::core_model::dynamic_info::{DynamicInfoQueue, DynamicInstructionInfo};
use crate::core_model::instruction::{Direction, Instruction, OperandKind};
use crate::core_model::units::{ExecutionUnit, StoreBuffer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoreModelSummary {
    pub instructions: u64,
    pub cycles: Cycle,
}

#[derive(Debug, Default)]
pub struct CoreTimingState {
    /// cycle at which each register's latest value becomes available
    register_scoreboard: Vec<Cycle>,
    store_buffer: StoreBuffer,
    load_unit: ExecutionUnit,
    instruction_count: u64,
}

/// In-order issue, out-of-order completion timing model of one core.
///
/// Instructions are handled in program order. Loads wait on an outstanding-load slot unless
/// they can forward from the store buffer; stores retire into the store buffer and only
/// stall the core when the buffer is full. The module cycle is the core's cycle count.
pub struct CoreTimingModel {
    base: ModuleBase<CoreTimingState, CoreModelConfig>,
}

module!(CoreTimingModel, CoreTimingState, CoreModelConfig,);

impl ModuleBehaviors for CoreTimingModel {
    fn reset(&mut self) {
        let conf = *self.conf();
        self.base.cycle = 0;
        self.base.state = Self::initial_state(&conf);
    }
}

impl CoreTimingModel {
    pub fn new(config: Arc<CoreModelConfig>) -> Self {
        config.ensure_valid();
        let mut me = CoreTimingModel {
            base: ModuleBase {
                state: Self::initial_state(&config),
                ..ModuleBase::default()
            },
        };
        me.init_conf(config);
        me
    }

    fn initial_state(config: &CoreModelConfig) -> CoreTimingState {
        CoreTimingState {
            register_scoreboard: vec![0; config.num_registers],
            store_buffer: StoreBuffer::new(config.num_store_buffer_entries),
            load_unit: ExecutionUnit::new(config.num_outstanding_loads),
            instruction_count: 0,
        }
    }

    pub fn cycle_count(&self) -> Cycle {
        self.base.cycle
    }

    pub fn instruction_count(&self) -> u64 {
        self.base.state.instruction_count
    }

    pub fn register_ready(&self, reg: u64) -> Cycle {
        let reg = self.check_register(reg);
        self.base.state.register_scoreboard[reg]
    }

    pub fn store_buffer(&self) -> &StoreBuffer {
        &self.base.state.store_buffer
    }

    pub fn load_unit(&self) -> &ExecutionUnit {
        &self.base.state.load_unit
    }

    fn check_register(&self, reg: u64) -> usize {
        let num_registers = self.base.state.register_scoreboard.len();
        assert!(
            reg < num_registers as u64,
            "register value out of range: {} >= {}",
            reg,
            num_registers
        );
        reg as usize
    }

    /// Advance the core past `instruction`, consuming one entry of `info_queue` per memory
    /// operand in operand order.
    pub fn handle_instruction(&mut self, instruction: &Instruction, info_queue: &mut DynamicInfoQueue) {
        let ops = instruction.operands();

        // memory writes are buffered so they drain after the instruction executes
        let mut write_info: VecDeque<(u64, u64)> = VecDeque::with_capacity(instruction.num_memory_operands());

        let mut operands_ready = self.base.cycle;
        let mut write_operands_ready = self.base.cycle;

        for o in ops {
            match o.kind {
                OperandKind::Memory => {
                    let info = info_queue
                        .pop_front()
                        .unwrap_or_else(|| panic!("no dynamic info left for memory operand {:?}", o));
                    match (o.direction, info) {
                        (Direction::Read, DynamicInstructionInfo::MemoryRead { addr, latency }) => {
                            let load_ready = self.execute_load(latency, addr);
                            operands_ready = operands_ready.max(load_ready);
                        }
                        (Direction::Write, DynamicInstructionInfo::MemoryWrite { addr, latency }) => {
                            write_info.push_back((addr, latency));
                        }
                        (Direction::Read, other) => panic!("expected memory read info, got: {}", other),
                        (Direction::Write, other) => panic!("expected memory write info, got: {}", other),
                    }
                }
                OperandKind::Register => {
                    let reg = self.check_register(o.value);
                    let ready = self.base.state.register_scoreboard[reg];
                    match o.direction {
                        Direction::Read => operands_ready = operands_ready.max(ready),
                        // WAW: the new value may not land before the pending one
                        Direction::Write => write_operands_ready = write_operands_ready.max(ready),
                    }
                }
                OperandKind::Immediate => {}
            }
        }

        let cost = instruction.cost();
        if cost >= self.conf().max_instruction_cost {
            warn!("cost is too big - cost: {}, cycle_count: {}", cost, self.base.cycle);
        }

        self.base.state.instruction_count += 1;
        self.base.cycle = operands_ready + cost;

        // memory writes go before register writes so the scoreboard sees the stall
        for _ in ops.iter().filter(|o| o.is_mem_write()) {
            let (addr, latency) = write_info
                .pop_front()
                .expect("buffered one write info per memory write operand");
            let store_time = self.execute_store(latency, addr);
            self.base.cycle = self.base.cycle.max(store_time);
            write_operands_ready = write_operands_ready.max(store_time);
        }

        // in-order at register write: a register still being written out of order stalls us
        if write_operands_ready > self.base.cycle {
            debug!(
                "stalling {} cycles for pending register writes",
                write_operands_ready - self.base.cycle
            );
            self.base.cycle = write_operands_ready;
        }

        let cycle = self.base.cycle;
        for o in ops.iter().filter(|o| o.is_reg_write()) {
            let reg = o.value as usize;
            let pending = self.base.state.register_scoreboard[reg];
            assert!(
                pending <= cycle,
                "expected cycle count to exceed destination register times, {} > {}",
                pending,
                cycle
            );
            self.base.state.register_scoreboard[reg] = cycle;
        }

        assert!(write_info.is_empty(), "some write info left over?");
    }

    /// Cycle at which the value read from `addr` is available to the core.
    pub fn execute_load(&mut self, latency: u64, addr: u64) -> Cycle {
        let now = self.base.cycle;
        if self.base.state.store_buffer.is_address_available(now, addr) {
            debug!("load {:#x} forwarded from store buffer at cycle {}", addr, now);
            return now;
        }
        self.base.state.load_unit.execute(now, latency) + latency
    }

    /// Cycle at which the store to `addr` is accepted by the store buffer.
    pub fn execute_store(&mut self, latency: u64, addr: u64) -> Cycle {
        let now = self.base.cycle;
        self.base.state.store_buffer.execute_store(now, latency, addr)
    }

    pub fn summary(&self) -> CoreModelSummary {
        CoreModelSummary {
            instructions: self.instruction_count(),
            cycles: self.cycle_count(),
        }
    }

    pub fn output_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "  Instructions: {}", self.instruction_count())?;
        writeln!(out, "  Cycles: {}", self.cycle_count())
    }
}
