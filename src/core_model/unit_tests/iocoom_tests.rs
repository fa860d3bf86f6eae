use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::base::behavior::ModuleBehaviors;
use crate::core_model::{
    CoreModelConfig, CoreTimingModel, DynamicInfoQueue, DynamicInstructionInfo, Instruction, Operand,
};

fn model(store_entries: usize, load_units: usize) -> CoreTimingModel {
    CoreTimingModel::new(Arc::new(CoreModelConfig {
        num_registers: 16,
        num_store_buffer_entries: store_entries,
        num_outstanding_loads: load_units,
        ..CoreModelConfig::default()
    }))
}

fn load(dst: u64, cost: u64) -> Instruction {
    Instruction::new([Operand::mem_read(), Operand::reg_write(dst)], cost)
}

fn store(src: u64, cost: u64) -> Instruction {
    Instruction::new([Operand::reg_read(src), Operand::mem_write()], cost)
}

fn run(core: &mut CoreTimingModel, inst: &Instruction, infos: &[DynamicInstructionInfo]) {
    let mut queue: DynamicInfoQueue = infos.iter().copied().collect();
    core.handle_instruction(inst, &mut queue);
    assert!(queue.is_empty());
}

#[test]
fn load_advances_by_latency_plus_cost() {
    let mut core = model(1, 3);
    run(&mut core, &Instruction::new([], 4), &[]);
    assert_eq!(core.cycle_count(), 4);

    run(&mut core, &load(1, 2), &[DynamicInstructionInfo::memory_read(0x40, 100)]);
    assert_eq!(core.cycle_count(), 4 + 100 + 2);
    assert_eq!(core.register_ready(1), 106);
    assert_eq!(core.instruction_count(), 2);
}

#[test]
fn zero_latency_load_costs_at_least_instruction_cost() {
    let mut core = model(1, 3);
    run(&mut core, &load(1, 3), &[DynamicInstructionInfo::memory_read(0x40, 0)]);
    assert_eq!(core.cycle_count(), 3);
}

#[test]
fn load_after_store_to_same_address_forwards() {
    let mut core = model(1, 3);
    run(&mut core, &store(2, 1), &[DynamicInstructionInfo::memory_write(0x80, 100)]);
    let store_done = core.cycle_count();
    assert_eq!(store_done, 1);

    run(&mut core, &load(3, 1), &[DynamicInstructionInfo::memory_read(0x80, 100)]);
    assert_eq!(core.cycle_count(), store_done + 1);
    assert_eq!(core.register_ready(3), store_done + 1);
}

#[test]
fn load_from_other_address_does_not_forward() {
    let mut core = model(1, 3);
    run(&mut core, &store(2, 1), &[DynamicInstructionInfo::memory_write(0x80, 100)]);
    run(&mut core, &load(3, 1), &[DynamicInstructionInfo::memory_read(0xc0, 100)]);
    assert_eq!(core.cycle_count(), 1 + 100 + 1);
}

#[test]
fn full_store_buffer_stalls_on_oldest_slot() {
    let mut core = model(1, 3);
    let mut cycles = Vec::new();
    for i in 0..3 {
        run(&mut core, &store(1, 1), &[DynamicInstructionInfo::memory_write(0x100 * i, 100)]);
        cycles.push(core.cycle_count());
    }
    assert_eq!(cycles, vec![1, 101, 201]);
}

#[test]
fn deeper_store_buffer_absorbs_bursts() {
    let mut core = model(4, 3);
    for i in 0..4 {
        run(&mut core, &store(1, 1), &[DynamicInstructionInfo::memory_write(0x100 * i, 100)]);
    }
    assert_eq!(core.cycle_count(), 4);
}

#[test]
fn register_write_waits_for_store_stall() {
    let mut core = model(1, 3);
    run(&mut core, &store(1, 1), &[DynamicInstructionInfo::memory_write(0x10, 50)]);
    let inst = Instruction::new([Operand::mem_write(), Operand::reg_write(5)], 1);
    run(&mut core, &inst, &[DynamicInstructionInfo::memory_write(0x20, 50)]);
    assert_eq!(core.cycle_count(), 51);
    assert_eq!(core.register_ready(5), 51);
}

#[test]
fn dependent_instruction_waits_for_source_register() {
    let mut core = model(1, 3);
    run(&mut core, &load(1, 1), &[DynamicInstructionInfo::memory_read(0x40, 30)]);
    let add = Instruction::new(
        [Operand::reg_read(1), Operand::immediate(7), Operand::reg_write(2)],
        2,
    );
    run(&mut core, &add, &[]);
    assert_eq!(core.register_ready(2), 31 + 2);
}

#[test]
fn outstanding_load_slots_bound_parallel_loads() {
    let mut narrow = model(1, 1);
    assert_eq!(narrow.execute_load(10, 0x0), 10);
    assert_eq!(narrow.execute_load(10, 0x40), 20);
    assert_eq!(narrow.load_unit().busy_until(), &[20]);

    let mut wide = model(1, 3);
    assert_eq!(wide.execute_load(10, 0x0), 10);
    assert_eq!(wide.execute_load(10, 0x40), 10);
}

#[test]
fn each_instruction_pops_only_its_own_infos() {
    let mut core = model(2, 3);
    let mut queue: DynamicInfoQueue = [
        DynamicInstructionInfo::memory_read(0x40, 5),
        DynamicInstructionInfo::memory_write(0x80, 5),
    ]
    .into_iter()
    .collect();
    core.handle_instruction(&load(1, 1), &mut queue);
    assert_eq!(queue.len(), 1);
    core.handle_instruction(&store(1, 1), &mut queue);
    assert!(queue.is_empty());
}

#[test]
fn writes_drain_in_operand_order() {
    let mut core = model(2, 3);
    let inst = Instruction::new([Operand::mem_write(), Operand::mem_write()], 1);
    run(
        &mut core,
        &inst,
        &[
            DynamicInstructionInfo::memory_write(0x100, 10),
            DynamicInstructionInfo::memory_write(0x200, 20),
        ],
    );
    assert_eq!(core.store_buffer().busy_until(), &[11, 21]);
}

#[test]
#[should_panic(expected = "register value out of range")]
fn register_out_of_range_is_fatal() {
    let mut core = model(1, 3);
    run(&mut core, &Instruction::new([Operand::reg_read(16)], 1), &[]);
}

#[test]
#[should_panic(expected = "expected memory read info")]
fn read_operand_with_write_info_is_fatal() {
    let mut core = model(1, 3);
    run(&mut core, &load(1, 1), &[DynamicInstructionInfo::memory_write(0x40, 1)]);
}

#[test]
#[should_panic(expected = "expected memory write info")]
fn write_operand_with_branch_info_is_fatal() {
    let mut core = model(1, 3);
    run(
        &mut core,
        &store(1, 1),
        &[DynamicInstructionInfo::Branch { taken: true, target: 0x1000 }],
    );
}

#[test]
#[should_panic(expected = "no dynamic info left")]
fn missing_info_is_fatal() {
    let mut core = model(1, 3);
    run(&mut core, &load(1, 1), &[]);
}

#[test]
fn summary_reports_counts() {
    let mut core = model(1, 3);
    run(&mut core, &load(1, 1), &[DynamicInstructionInfo::memory_read(0x40, 100)]);
    let mut out = Vec::new();
    core.output_summary(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "  Instructions: 1\n  Cycles: 101\n");
    let json = serde_json::to_string(&core.summary()).unwrap();
    assert_eq!(json, r#"{"instructions":1,"cycles":101}"#);
}

#[test]
fn reset_starts_fresh_lifetime() {
    let mut core = model(1, 3);
    run(&mut core, &store(1, 1), &[DynamicInstructionInfo::memory_write(0x80, 100)]);
    run(&mut core, &load(2, 1), &[DynamicInstructionInfo::memory_read(0x40, 100)]);
    core.reset();
    assert_eq!(core.cycle_count(), 0);
    assert_eq!(core.instruction_count(), 0);
    assert_eq!(core.register_ready(2), 0);
    assert!(!core.store_buffer().is_address_available(0, 0x80));
}

#[test]
fn random_stream_keeps_counters_monotonic() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut core = model(2, 3);
    let mut last_cycle = 0;
    for n in 1..=500u64 {
        let reg = rng.gen_range(0..16);
        let addr = rng.gen_range(0..8u64) * 64;
        let latency = rng.gen_range(0..200);
        let cost = rng.gen_range(1..4);
        match rng.gen_range(0..3) {
            0 => run(&mut core, &load(reg, cost), &[DynamicInstructionInfo::memory_read(addr, latency)]),
            1 => run(&mut core, &store(reg, cost), &[DynamicInstructionInfo::memory_write(addr, latency)]),
            _ => run(
                &mut core,
                &Instruction::new([Operand::reg_read(reg), Operand::reg_write((reg + 1) % 16)], cost),
                &[],
            ),
        }
        assert!(core.cycle_count() >= last_cycle + cost);
        assert_eq!(core.instruction_count(), n);
        last_cycle = core.cycle_count();
    }
}
