use serde::Serialize;
use std::ops::AddAssign;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    accesses: u64,
    hits: u64,
    victim_hits: u64,
    misses: u64,
    victim_evictions: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    /// Hits in either the main array or the victim cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn victim_hits(&self) -> u64 {
        self.victim_hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn victim_evictions(&self) -> u64 {
        self.victim_evictions
    }

    pub fn hit_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64
        }
    }

    pub(crate) fn record_hit(&mut self, victim: bool) {
        self.accesses = self.accesses.saturating_add(1);
        self.hits = self.hits.saturating_add(1);
        if victim {
            self.victim_hits = self.victim_hits.saturating_add(1);
        }
    }

    pub(crate) fn record_miss(&mut self) {
        self.accesses = self.accesses.saturating_add(1);
        self.misses = self.misses.saturating_add(1);
    }

    pub(crate) fn record_victim_eviction(&mut self) {
        self.victim_evictions = self.victim_evictions.saturating_add(1);
    }
}

impl AddAssign<&CacheStats> for CacheStats {
    fn add_assign(&mut self, other: &CacheStats) {
        self.accesses = self.accesses.saturating_add(other.accesses);
        self.hits = self.hits.saturating_add(other.hits);
        self.victim_hits = self.victim_hits.saturating_add(other.victim_hits);
        self.misses = self.misses.saturating_add(other.misses);
        self.victim_evictions = self.victim_evictions.saturating_add(other.victim_evictions);
    }
}

impl AddAssign<CacheStats> for CacheStats {
    fn add_assign(&mut self, other: CacheStats) {
        *self += &other;
    }
}
