use log::debug;

use super::config::DirectoryConfig;
use super::sharers::SharerSet;
use super::{DirectoryEntry, TileId};

/// Limited-pointer directory entry whose overflow is handled by a (modeled) software trap.
///
/// Sharers are tracked exactly in a bitset for the whole life of the entry; the hardware
/// limit only decides when the trap engages. Once engaged the trap never disengages, so
/// every later coherence action on this block pays `software_trap_penalty`.
#[derive(Debug, Clone)]
pub struct LimitlessEntry {
    sharers: SharerSet,
    owner: Option<TileId>,
    max_hw_sharers: usize,
    software_trap_enabled: bool,
    software_trap_penalty: u64,
}

impl LimitlessEntry {
    pub fn new(max_hw_sharers: usize, max_num_sharers: usize, software_trap_penalty: u64) -> Self {
        Self {
            sharers: SharerSet::new(max_num_sharers),
            owner: None,
            max_hw_sharers,
            software_trap_enabled: false,
            software_trap_penalty,
        }
    }

    pub fn from_config(config: &DirectoryConfig) -> Self {
        config.ensure_valid();
        Self::new(
            config.max_hw_sharers,
            config.max_num_sharers,
            config.software_trap_penalty,
        )
    }

    pub fn software_trap_enabled(&self) -> bool {
        self.software_trap_enabled
    }
}

impl DirectoryEntry for LimitlessEntry {
    fn has_sharer(&self, tile: TileId) -> bool {
        self.sharers.contains(tile)
    }

    fn add_sharer(&mut self, tile: TileId) -> bool {
        assert!(!self.sharers.contains(tile), "tile {} is already a sharer", tile);
        if !self.software_trap_enabled && self.sharers.len() + 1 >= self.max_hw_sharers {
            debug!(
                "directory entry reached {} hw sharers adding tile {}, software trap engaged",
                self.max_hw_sharers, tile
            );
            self.software_trap_enabled = true;
        }
        self.sharers.insert(tile);
        // eviction-before-add is left to the protocol, so the add always succeeds
        true
    }

    fn remove_sharer(&mut self, tile: TileId, reply_expected: bool) {
        assert!(!reply_expected, "limitless entry never expects a reply (tile {})", tile);
        assert!(self.sharers.remove(tile), "tile {} is not a sharer", tile);
        if self.owner == Some(tile) {
            self.owner = None;
        }
    }

    fn num_sharers(&self) -> usize {
        self.sharers.len()
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
                self.sharers.len()
            );
        }
        self.owner = owner;
    }

    fn one_sharer(&mut self) -> Option<TileId> {
        let sharer = self.sharers.first();
        assert!(sharer.is_some(), "directory entry has no sharers");
        sharer
    }

    fn sharers_list(&self) -> Vec<TileId> {
        self.sharers.iter().collect()
    }

    fn latency(&self) -> u64 {
        if self.software_trap_enabled {
            self.software_trap_penalty
        } else {
            0
        }
    }
}
