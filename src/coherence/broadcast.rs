use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::DirectoryConfig;
use super::sharers::SharerSet;
use super::{DirectoryEntry, TileId};

/// Limited-pointer directory entry that overflows into broadcast mode.
///
/// While in broadcast mode every tile counts as a sharer, and the protocol must collect one
/// reply per tile (`remove_sharer(_, true)`) before the entry returns to exact tracking.
#[derive(Debug, Clone)]
pub struct LimitedBroadcastEntry {
    sharers: SharerSet,
    owner: Option<TileId>,
    max_hw_sharers: usize,
    global_enabled: bool,
    broadcast_sharers: usize,
    rng: StdRng,
}

impl LimitedBroadcastEntry {
    pub fn new(max_hw_sharers: usize, max_num_sharers: usize, seed: u64) -> Self {
        Self {
            sharers: SharerSet::new(max_num_sharers),
            owner: None,
            max_hw_sharers,
            global_enabled: false,
            broadcast_sharers: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        config.ensure_valid();
        Self::new(config.max_hw_sharers, config.max_num_sharers, config.seed)
    }

    fn total_tiles(&self) -> usize {
        self.sharers.capacity()
    }
}

impl DirectoryEntry for LimitedBroadcastEntry {
    fn has_sharer(&self, tile: TileId) -> bool {
        self.sharers.contains(tile)
    }

    fn add_sharer(&mut self, tile: TileId) -> bool {
        if self.global_enabled {
            assert_eq!(self.broadcast_sharers, self.total_tiles());
            return true;
        }
        assert!(!self.sharers.contains(tile), "tile {} is already a sharer", tile);
        if self.sharers.len() == self.max_hw_sharers {
            debug!("hw pointers exhausted adding tile {}, switching to broadcast", tile);
            self.global_enabled = true;
            self.broadcast_sharers = self.total_tiles();
        } else {
            self.sharers.insert(tile);
        }
        true
    }

    fn remove_sharer(&mut self, tile: TileId, reply_expected: bool) {
        if self.global_enabled {
            self.sharers.remove(tile);
        } else {
            assert!(self.sharers.remove(tile), "tile {} is not a sharer", tile);
        }
        if self.owner == Some(tile) {
            self.owner = None;
        }

        if reply_expected {
            assert!(self.global_enabled, "reply expected outside broadcast mode (tile {})", tile);
            self.broadcast_sharers -= 1;
            if self.broadcast_sharers == 0 {
                self.global_enabled = false;
                assert!(self.sharers.is_empty(), "sharers left after broadcast drained");
            }
        }
    }

    fn num_sharers(&self) -> usize {
        if self.global_enabled {
            self.total_tiles()
        } else {
            self.sharers.len()
        }
    }

    fn owner(&self) -> Option<TileId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<TileId>) {
        if let Some(tile) = owner {
            assert!(
                self.sharers.contains(tile),
                "owner {} is not a sharer (num sharers {})",
                tile,
                self.num_sharers()
            );
        }
        self.owner = owner;
    }

    fn one_sharer(&mut self) -> Option<TileId> {
        let tracked = self.sharers_list();
        assert!(
            self.global_enabled || !tracked.is_empty(),
            "directory entry has no sharers"
        );
        if tracked.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..tracked.len());
        Some(tracked[index])
    }

    fn sharers_list(&self) -> Vec<TileId> {
        self.sharers.iter().collect()
    }

    fn all_tiles_sharers(&self) -> bool {
        self.global_enabled
    }

    fn latency(&self) -> u64 {
        0
    }
}
