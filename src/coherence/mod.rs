mod broadcast;
pub mod config;
mod limitless;
pub mod sharers;


pub use broadcast::LimitedBroadcastEntry;
pub use config::{DirectoryConfig, DirectoryScheme};
pub use limitless::LimitlessEntry;
pub use sharers::SharerSet;

/// Identifier of a simulated tile. "No tile" is spelled `None` wherever a tile is optional.
pub type TileId = usize;

/// Per-block coherence bookkeeping driven by the directory protocol.
///
/// Entries carry no internal locking. A block's entry may be reached from the thread of any
/// tile touching that block, so the protocol must serialize access per block (e.g. hold the
/// entry behind the block's lock). All protocol violations panic.
pub trait DirectoryEntry {
    fn has_sharer(&self, tile: TileId) -> bool;

    /// Record `tile` as a sharer. Panics if it already is one.
    ///
    /// The return value says whether the sharer was added without an eviction; current
    /// schemes always return `true` because the protocol evicts before adding.
    fn add_sharer(&mut self, tile: TileId) -> bool;

    fn remove_sharer(&mut self, tile: TileId, reply_expected: bool);

    fn num_sharers(&self) -> usize;

    fn owner(&self) -> Option<TileId>;

    /// Panics if `owner` is a tile that is not currently a sharer.
    fn set_owner(&mut self, owner: Option<TileId>);

    /// Some sharer of the block; panics if the block has no sharer at all. `None` means the
    /// sharers exist but are not individually tracked.
    fn one_sharer(&mut self) -> Option<TileId>;

    /// Fresh snapshot of the individually tracked sharers, in ascending tile order.
    fn sharers_list(&self) -> Vec<TileId>;

    /// Whether every tile must be treated as a sharer regardless of `sharers_list`.
    fn all_tiles_sharers(&self) -> bool {
        false
    }

    /// Extra cycles charged to a coherence action on this block.
    fn latency(&self) -> u64;
}

pub fn new_directory_entry(config: &DirectoryConfig) -> Box<dyn DirectoryEntry + Send> {
    match config.scheme {
        DirectoryScheme::Limitless => Box::new(LimitlessEntry::from_config(config)),
        DirectoryScheme::LimitedBroadcast => Box::new(LimitedBroadcastEntry::from_config(config)),
    }
}
