use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Register,
    Memory,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operand {
    pub kind: OperandKind,
    pub direction: Direction,
    /// register id for register operands; unused for memory operands, whose address comes
    /// from the dynamic info queue
    pub value: u64,
}

impl Operand {
    pub fn reg_read(reg: u64) -> Self {
        Self { kind: OperandKind::Register, direction: Direction::Read, value: reg }
    }

    pub fn reg_write(reg: u64) -> Self {
        Self { kind: OperandKind::Register, direction: Direction::Write, value: reg }
    }

    pub fn mem_read() -> Self {
        Self { kind: OperandKind::Memory, direction: Direction::Read, value: 0 }
    }

    pub fn mem_write() -> Self {
        Self { kind: OperandKind::Memory, direction: Direction::Write, value: 0 }
    }

    pub fn immediate(value: u64) -> Self {
        Self { kind: OperandKind::Immediate, direction: Direction::Read, value }
    }

    pub fn is_mem_write(&self) -> bool {
        self.kind == OperandKind::Memory && self.direction == Direction::Write
    }

    pub fn is_reg_write(&self) -> bool {
        self.kind == OperandKind::Register && self.direction == Direction::Write
    }
}

pub type OperandList = SmallVec<[Operand; 4]>;

/// An instruction as seen by the timing model: its operands in program order plus a fixed
/// execution cost in cycles.
#[derive(Debug, Clone)]
pub struct Instruction {
    operands: OperandList,
    cost: u64,
}

impl Instruction {
    pub fn new(operands: impl IntoIterator<Item = Operand>, cost: u64) -> Self {
        Self {
            operands: operands.into_iter().collect(),
            cost,
        }
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Number of entries this instruction will pop from the dynamic info queue.
    pub fn num_memory_operands(&self) -> usize {
        self.operands
            .iter()
            .filter(|op| op.kind == OperandKind::Memory)
            .count()
    }
}
