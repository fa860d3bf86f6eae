use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::bail;
use log::{debug, info};
use serde::Serialize;

use crate::cache::{CacheConfig, CacheStats, ModeledCache};
use crate::coherence::{new_directory_entry, DirectoryConfig, DirectoryEntry, TileId};
use crate::core_model::{
    CoreModelConfig, CoreModelSummary, CoreTimingModel, DynamicInfoQueue, DynamicInstructionInfo,
    Instruction, Operand,
};
use crate::sim::config::SimConfig;
use crate::sim::trace::{TraceOp, TraceRecord};

// loads write this register and stores read it, so stores depend on the previous load
const DATA_REG: u64 = 1;

struct TileModel {
    dcache: ModeledCache,
    core: CoreTimingModel,
    info_queue: DynamicInfoQueue,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileReport {
    pub tile: TileId,
    pub cache: CacheStats,
    pub core: CoreModelSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub tiles: Vec<TileReport>,
    pub total_cache: CacheStats,
    pub directory_entries: usize,
    /// entries that charge a coherence penalty
    pub trapped_entries: usize,
}

/// Drives the three models from an address trace, playing the part of the instruction
/// execution and coherence protocol collaborators: per tile, the modeled L1 decides each
/// access's latency, a per-line directory entry adds its coherence latency, and the
/// result is fed to the tile's timing model as a load or store.
pub struct Replay {
    sim_config: SimConfig,
    cache_config: Arc<CacheConfig>,
    core_config: Arc<CoreModelConfig>,
    directory_config: DirectoryConfig,
    tiles: BTreeMap<TileId, TileModel>,
    directory: HashMap<u64, Box<dyn DirectoryEntry + Send>>,
}

impl Replay {
    pub fn new(
        sim_config: SimConfig,
        cache_config: CacheConfig,
        core_config: CoreModelConfig,
        directory_config: DirectoryConfig,
    ) -> Self {
        cache_config.ensure_valid();
        core_config.ensure_valid();
        directory_config.ensure_valid();
        Self {
            sim_config,
            cache_config: Arc::new(cache_config),
            core_config: Arc::new(core_config),
            directory_config,
            tiles: BTreeMap::new(),
            directory: HashMap::new(),
        }
    }

    pub fn sim_config(&self) -> &SimConfig {
        &self.sim_config
    }

    pub fn step(&mut self, record: &TraceRecord) -> anyhow::Result<()> {
        let Self {
            sim_config,
            cache_config,
            core_config,
            directory_config,
            tiles,
            directory,
        } = self;

        if record.tile >= directory_config.max_num_sharers {
            bail!(
                "tile {} out of range, directory tracks {} tiles",
                record.tile,
                directory_config.max_num_sharers
            );
        }

        let tile = tiles.entry(record.tile).or_insert_with(|| {
            info!("creating models for tile {}", record.tile);
            TileModel {
                dcache: ModeledCache::new(Arc::clone(cache_config)),
                core: CoreTimingModel::new(Arc::clone(core_config)),
                info_queue: DynamicInfoQueue::new(),
            }
        });
        let line = record.addr >> cache_config.line_size.trailing_zeros();
        let entry = directory
            .entry(line)
            .or_insert_with(|| new_directory_entry(directory_config));

        // a copy the directory no longer tracks was invalidated by a remote write
        let tracked = entry.all_tiles_sharers() || entry.has_sharer(record.tile);
        if !tracked && tile.dcache.invalidate(record.addr) {
            debug!("tile {} lost line {:#x} to a remote write", record.tile, line);
        }
        let hit = tile.dcache.access(record.addr);

        let mut latency = if hit {
            sim_config.hit_latency
        } else {
            sim_config.miss_latency
        };
        if !hit || record.op == TraceOp::Write {
            latency += coherence_action(entry.as_mut(), directory_config, record.tile, record.op);
        }

        let cost = sim_config.instruction_cost;
        let (instruction, info) = match record.op {
            TraceOp::Read => (
                Instruction::new([Operand::mem_read(), Operand::reg_write(DATA_REG)], cost),
                DynamicInstructionInfo::memory_read(record.addr, latency),
            ),
            TraceOp::Write => (
                Instruction::new([Operand::reg_read(DATA_REG), Operand::mem_write()], cost),
                DynamicInstructionInfo::memory_write(record.addr, latency),
            ),
        };

        tile.info_queue.push_back(info);
        tile.core.handle_instruction(&instruction, &mut tile.info_queue);
        debug!(
            "tile {} {:?} {:#x} hit={} latency={} cycle={}",
            record.tile,
            record.op,
            record.addr,
            hit,
            latency,
            tile.core.cycle_count()
        );
        Ok(())
    }

    pub fn run(&mut self, records: &[TraceRecord]) -> anyhow::Result<()> {
        for record in records {
            self.step(record)?;
        }
        Ok(())
    }

    pub fn report(&self) -> ReplayReport {
        let mut total_cache = CacheStats::default();
        let tiles = self
            .tiles
            .iter()
            .map(|(&tile, model)| {
                total_cache += model.dcache.stats();
                TileReport {
                    tile,
                    cache: *model.dcache.stats(),
                    core: model.core.summary(),
                }
            })
            .collect();
        ReplayReport {
            tiles,
            total_cache,
            directory_entries: self.directory.len(),
            trapped_entries: self.directory.values().filter(|e| e.latency() > 0).count(),
        }
    }

    pub fn output_summary<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (tile, model) in &self.tiles {
            let stats = model.dcache.stats();
            writeln!(out, "Tile {}:", tile)?;
            writeln!(
                out,
                "  Cache accesses: {}, hits: {} ({} from victim cache), misses: {}",
                stats.accesses(),
                stats.hits(),
                stats.victim_hits(),
                stats.misses()
            )?;
            model.core.output_summary(out)?;
        }
        let report = self.report();
        writeln!(
            out,
            "Directory entries: {} ({} trapped)",
            report.directory_entries, report.trapped_entries
        )
    }
}

/// Directory side of one access; returns the coherence latency charged to it. A write
/// invalidates every other sharer and takes ownership.
fn coherence_action(
    entry: &mut (dyn DirectoryEntry + Send),
    config: &DirectoryConfig,
    tile: TileId,
    op: TraceOp,
) -> u64 {
    let latency = entry.latency();

    if op == TraceOp::Write {
        if entry.all_tiles_sharers() {
            // broadcast invalidation, one reply per tile
            for other in 0..config.max_num_sharers {
                entry.remove_sharer(other, true);
            }
        } else {
            for other in entry.sharers_list() {
                if other != tile {
                    entry.remove_sharer(other, false);
                }
            }
        }
    }
    if !entry.all_tiles_sharers() && !entry.has_sharer(tile) {
        entry.add_sharer(tile);
    }
    if op == TraceOp::Write && entry.has_sharer(tile) {
        entry.set_owner(Some(tile));
    }
    latency
}
