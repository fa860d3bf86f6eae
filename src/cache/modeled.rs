use std::sync::Arc;

use log::debug;

use crate::base::behavior::*;
use crate::base::module::{module, IsModule, ModuleBase};
use crate::cache::config::{CacheConfig, ReplacementPolicy};
use crate::cache::stats::CacheStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    /// Missed in the main array but found in the victim cache; the line was swapped back in.
    VictimHit,
    Miss,
}

impl AccessOutcome {
    pub fn is_hit(self) -> bool {
        !matches!(self, Self::Miss)
    }
}

type Set = Vec<Option<u64>>;

#[derive(Debug, Default)]
pub struct ModeledCacheState {
    /// per set, way 0 is the MRU position under LRU
    sets: Vec<Set>,
    victims: Vec<Option<u64>>,
    next_victim: usize,
    random_counter: u64,
    stats: CacheStats,
}

/// Hit/miss model of a set-associative cache backed by a small fully-associative victim
/// cache. Only tags are kept; no data is simulated.
pub struct ModeledCache {
    base: ModuleBase<ModeledCacheState, CacheConfig>,
    line_size_log2: u32,
    num_sets_log2: u32,
}

module!(ModeledCache, ModeledCacheState, CacheConfig,);

impl ModuleBehaviors for ModeledCache {
    fn reset(&mut self) {
        let conf = *self.conf();
        self.base.state = Self::empty_state(&conf);
    }
}

impl ModeledCache {
    pub fn new(config: Arc<CacheConfig>) -> Self {
        config.ensure_valid();
        let mut me = ModeledCache {
            base: ModuleBase {
                state: Self::empty_state(&config),
                ..ModuleBase::default()
            },
            line_size_log2: config.line_size.trailing_zeros(),
            num_sets_log2: config.num_sets.trailing_zeros(),
        };
        me.init_conf(config);
        me
    }

    fn empty_state(config: &CacheConfig) -> ModeledCacheState {
        ModeledCacheState {
            sets: vec![vec![None; config.associativity]; config.num_sets],
            victims: vec![None; config.victim_cache_size],
            next_victim: 0,
            random_counter: config.seed,
            stats: CacheStats::default(),
        }
    }

    /// Total capacity of the main array in bytes.
    pub fn size(&self) -> u64 {
        self.conf().size_bytes()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.state().stats
    }

    pub fn split_address(&self, addr: u64) -> (usize, u64) {
        let index = (addr >> self.line_size_log2) & ((1u64 << self.num_sets_log2) - 1);
        let tag = addr
            .checked_shr(self.line_size_log2 + self.num_sets_log2)
            .unwrap_or(0);
        (index as usize, tag)
    }

    /// Ways of set `index`, MRU first under LRU. Empty ways are `None`.
    pub fn set_ways(&self, index: usize) -> &[Option<u64>] {
        &self.base.state.sets[index]
    }

    pub fn victim_ways(&self) -> &[Option<u64>] {
        &self.base.state.victims
    }

    /// Whether the line holding `addr` sits in the main array. Does not touch replacement state.
    pub fn in_main_array(&self, addr: u64) -> bool {
        let (index, tag) = self.split_address(addr);
        self.set_ways(index).contains(&Some(tag))
    }

    pub fn in_victim_cache(&self, addr: u64) -> bool {
        let (_, tag) = self.split_address(addr);
        self.victim_ways().contains(&Some(tag))
    }

    /// Drop the line holding `addr` from the main array or the victim cache. Returns whether
    /// it was present. Stats and replacement counters are left alone.
    pub fn invalidate(&mut self, addr: u64) -> bool {
        let (index, tag) = self.split_address(addr);
        let state = self.state_mut();
        let set = &mut state.sets[index];
        if let Some(way) = set.iter().position(|&t| t == Some(tag)) {
            // keep valid lines packed towards the MRU end
            set[way..].rotate_left(1);
            if let Some(last) = set.last_mut() {
                *last = None;
            }
            return true;
        }
        if let Some(slot) = state.victims.iter_mut().find(|t| **t == Some(tag)) {
            *slot = None;
            return true;
        }
        false
    }

    pub fn access(&mut self, addr: u64) -> bool {
        self.lookup(addr).is_hit()
    }

    pub fn lookup(&mut self, addr: u64) -> AccessOutcome {
        let (index, tag) = self.split_address(addr);
        let policy = self.conf().replacement_policy;
        let state = self.state_mut();
        assert!(index < state.sets.len(), "bad set index {} >= {}", index, state.sets.len());

        if let Some(way) = state.sets[index].iter().position(|&t| t == Some(tag)) {
            Self::update(&mut state.sets[index], policy, way);
            state.stats.record_hit(false);
            return AccessOutcome::Hit;
        }

        if let Some(victim_way) = state.victims.iter().position(|&t| t == Some(tag)) {
            Self::swap(state, policy, index, victim_way, tag);
            state.stats.record_hit(true);
            debug!("addr {:#x} hit in victim cache, swapped into set {}", addr, index);
            return AccessOutcome::VictimHit;
        }

        Self::insert(state, policy, index, tag);
        state.stats.record_miss();
        AccessOutcome::Miss
    }

    // hit in the main array
    fn update(set: &mut Set, policy: ReplacementPolicy, way: usize) {
        match policy {
            ReplacementPolicy::Random => {}
            ReplacementPolicy::Lru => set[..=way].rotate_right(1),
        }
    }

    /// Put `tag` into set `index`, returning the line it displaced.
    fn replace_way(state: &mut ModeledCacheState, policy: ReplacementPolicy, index: usize, tag: u64) -> Option<u64> {
        let set = &mut state.sets[index];
        match policy {
            ReplacementPolicy::Random => {
                let way = (state.random_counter % set.len() as u64) as usize;
                state.random_counter = state.random_counter.wrapping_add(1);
                set[way].replace(tag)
            }
            ReplacementPolicy::Lru => {
                set.rotate_right(1);
                set[0].replace(tag)
            }
        }
    }

    // hit in the victim cache: the displaced line takes the victim slot that hit
    fn swap(state: &mut ModeledCacheState, policy: ReplacementPolicy, index: usize, victim_way: usize, tag: u64) {
        let evicted = Self::replace_way(state, policy, index, tag);
        if evicted.is_some() {
            state.stats.record_victim_eviction();
        }
        state.victims[victim_way] = evicted;
    }

    // miss in both
    fn insert(state: &mut ModeledCacheState, policy: ReplacementPolicy, index: usize, tag: u64) {
        let Some(evicted) = Self::replace_way(state, policy, index, tag) else {
            return;
        };
        if !state.victims.is_empty() {
            // the cursor advances before writing, so the first eviction lands in slot 1
            state.next_victim = state.next_victim.wrapping_add(1);
            let slot = state.next_victim % state.victims.len();
            state.victims[slot] = Some(evicted);
            state.stats.record_victim_eviction();
        }
    }
}
