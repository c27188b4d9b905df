//! run‑time terrain streaming: chunk memoisation & the world view
//!
//! The world itself is stateless (`classify(sample(x, y))` everywhere); the
//! chunk cache only remembers whole chunks that were already generated so a
//! revisited region costs a hash lookup instead of a noise evaluation.

use std::collections::HashMap;

use bevy::prelude::*;
use tracing::debug;

use crate::config::SimConfig;
use crate::constants::{CHUNK_HEIGHT, CHUNK_WIDTH};
use crate::terrain::{NoiseField, Symbol};

/* ===========================================================
   chunk coordinates
   =========================================================== */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    /// floor‑divide a cell into its chunk (negative cells land west/north)
    #[inline]
    pub fn of_cell(cell: IVec2) -> Self {
        Self {
            x: cell.x.div_euclid(CHUNK_WIDTH as i32),
            y: cell.y.div_euclid(CHUNK_HEIGHT as i32),
        }
    }

    #[inline]
    pub fn of_world(pos: Vec2) -> Self {
        Self::of_cell(pos.floor().as_ivec2())
    }

    /// top‑left cell of the chunk
    #[inline]
    pub fn origin(self) -> IVec2 {
        IVec2::new(self.x * CHUNK_WIDTH as i32, self.y * CHUNK_HEIGHT as i32)
    }
}

/// Chunks a `width`x`height` viewport can overlap at any offset.
///
/// A bounded cache smaller than this evicts chunks the same frame still
/// needs, so every frame regenerates them.
pub fn chunks_spanned(width: usize, height: usize) -> usize {
    (width.div_ceil(CHUNK_WIDTH) + 1) * (height.div_ceil(CHUNK_HEIGHT) + 1)
}

/* ===========================================================
   chunk
   =========================================================== */
struct Chunk {
    symbols: Vec<Symbol>,
    last_used: u64,
}

impl Chunk {
    /// whole chunk in one pass, row‑major
    fn generate(coord: ChunkCoord, noise: &NoiseField) -> Self {
        let origin = coord.origin();
        let mut symbols = Vec::with_capacity(CHUNK_WIDTH * CHUNK_HEIGHT);
        for ly in 0..CHUNK_HEIGHT as i32 {
            for lx in 0..CHUNK_WIDTH as i32 {
                symbols.push(noise.symbol((origin.x + lx) as f64, (origin.y + ly) as f64));
            }
        }
        Self {
            symbols,
            last_used: 0,
        }
    }

    #[inline]
    fn symbol(&self, local: IVec2) -> Symbol {
        self.symbols[local.y as usize * CHUNK_WIDTH + local.x as usize]
    }
}

/* ===========================================================
   chunk cache
   =========================================================== */

/// Memoised chunks keyed by `ChunkCoord`.
///
/// `capacity == 0` keeps every visited chunk forever, which grows without
/// bound on long walks. Any other capacity evicts the least recently used
/// chunk when a new one is needed.
pub struct ChunkCache {
    chunks: HashMap<ChunkCoord, Chunk>,
    capacity: usize,
    clock: u64,
    generated: u64,
    evicted: u64,
}

impl ChunkCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: HashMap::new(),
            capacity,
            clock: 0,
            generated: 0,
            evicted: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn symbol_at(&mut self, noise: &NoiseField, cell: IVec2) -> Symbol {
        let coord = ChunkCoord::of_cell(cell);
        let local = cell - coord.origin();
        self.chunk(noise, coord).symbol(local)
    }

    /// make sure `coord` is resident, generating it if needed
    pub fn ensure(&mut self, noise: &NoiseField, coord: ChunkCoord) {
        self.chunk(noise, coord);
    }

    fn chunk(&mut self, noise: &NoiseField, coord: ChunkCoord) -> &Chunk {
        if !self.chunks.contains_key(&coord) {
            if self.capacity > 0 && self.chunks.len() >= self.capacity {
                self.evict_oldest();
            }
            self.generated += 1;
            debug!(target: "wanderer::terrain", x = coord.x, y = coord.y, "chunk generated");
        }

        self.clock += 1;
        let stamp = self.clock;
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Chunk::generate(coord, noise));
        chunk.last_used = stamp;
        chunk
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .chunks
            .iter()
            .min_by_key(|(_, chunk)| chunk.last_used)
            .map(|(coord, _)| *coord);
        if let Some(coord) = oldest {
            self.chunks.remove(&coord);
            self.evicted += 1;
            debug!(target: "wanderer::terrain", x = coord.x, y = coord.y, "chunk evicted");
        }
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// chunks generated since creation (re‑generation after eviction counts)
    pub fn generated(&self) -> u64 {
        self.generated
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }
}

/* ===========================================================
   world view resource
   =========================================================== */

/// Terrain lookup used by the renderer, with or without a chunk cache.
#[derive(Resource)]
pub struct WorldView {
    noise: NoiseField,
    cache: Option<ChunkCache>,
}

impl WorldView {
    pub fn new(noise: NoiseField, cache: Option<ChunkCache>) -> Self {
        Self { noise, cache }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            NoiseField::new(config.seed, config.frequency),
            config.chunk_cache.map(ChunkCache::new),
        )
    }

    #[inline]
    pub fn symbol_at(&mut self, cell: IVec2) -> Symbol {
        match self.cache.as_mut() {
            Some(cache) => cache.symbol_at(&self.noise, cell),
            None => self.noise.symbol(cell.x as f64, cell.y as f64),
        }
    }

    /// generate every chunk overlapping the inclusive cell rect `min..=max`
    /// before a frame reads from it
    pub fn prefetch(&mut self, min: IVec2, max: IVec2) {
        let Some(cache) = self.cache.as_mut() else { return };
        let lo = ChunkCoord::of_cell(min);
        let hi = ChunkCoord::of_cell(max);
        for y in lo.y..=hi.y {
            for x in lo.x..=hi.x {
                cache.ensure(&self.noise, ChunkCoord { x, y });
            }
        }
    }

    pub fn cache(&self) -> Option<&ChunkCache> {
        self.cache.as_ref()
    }
}
