use crate::base::module::Cycle;

/// Pick a slot for an operation issued at `time` that occupies it for `occupancy` cycles.
///
/// The first slot already free by `time` is taken. Failing that, the operation queues behind
/// the slot that frees up earliest. Returns the slot and the cycle the operation starts.
fn allocate(scoreboard: &mut [Cycle], time: Cycle, occupancy: u64) -> (usize, Cycle) {
    assert!(!scoreboard.is_empty(), "no execution slots");
    if let Some(slot) = scoreboard.iter().position(|&ready| ready <= time) {
        scoreboard[slot] = time + occupancy;
        return (slot, time);
    }
    let mut slot = 0;
    for (i, &ready) in scoreboard.iter().enumerate() {
        if ready < scoreboard[slot] {
            slot = i;
        }
    }
    scoreboard[slot] += occupancy;
    (slot, scoreboard[slot] - occupancy)
}

/// Pool of identical units, e.g. the outstanding-load slots of a core.
#[derive(Debug, Clone, Default)]
pub struct ExecutionUnit {
    scoreboard: Vec<Cycle>,
}

impl ExecutionUnit {
    pub fn new(num_units: usize) -> Self {
        Self {
            scoreboard: vec![0; num_units],
        }
    }

    /// Returns the cycle the operation starts executing.
    pub fn execute(&mut self, time: Cycle, occupancy: u64) -> Cycle {
        allocate(&mut self.scoreboard, time, occupancy).1
    }

    pub fn busy_until(&self) -> &[Cycle] {
        &self.scoreboard
    }

    pub fn reset(&mut self) {
        self.scoreboard.iter_mut().for_each(|c| *c = 0);
    }
}

#[derive(Debug, Clone, Default)]
pub struct StoreBuffer {
    scoreboard: Vec<Cycle>,
    addresses: Vec<Option<u64>>,
}

impl StoreBuffer {
    pub fn new(num_entries: usize) -> Self {
        Self {
            scoreboard: vec![0; num_entries],
            addresses: vec![None; num_entries],
        }
    }

    /// Same slot policy as `ExecutionUnit`, remembering the address for forwarding.
    /// Returns the cycle the store enters the buffer.
    pub fn execute_store(&mut self, time: Cycle, occupancy: u64, addr: u64) -> Cycle {
        let (slot, start) = allocate(&mut self.scoreboard, time, occupancy);
        self.addresses[slot] = Some(addr);
        start
    }

    /// Whether a store to `addr` is still buffered at `time`, so a load can forward from it.
    pub fn is_address_available(&self, time: Cycle, addr: u64) -> bool {
        self.scoreboard
            .iter()
            .zip(self.addresses.iter())
            .any(|(&ready, &a)| a == Some(addr) && ready >= time)
    }

    pub fn busy_until(&self) -> &[Cycle] {
        &self.scoreboard
    }

    pub fn reset(&mut self) {
        self.scoreboard.iter_mut().for_each(|c| *c = 0);
        self.addresses.iter_mut().for_each(|a| *a = None);
    }
}
