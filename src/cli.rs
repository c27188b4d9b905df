use std::path::PathBuf;

use bevy::prelude::*;
use clap::Parser;

use crate::config::{ConfigError, HoldPolicy, SimConfig, WorldBounds};
use crate::constants::*;

/// Walk an endless noise‑generated world while patrols hunt you down
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// World seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u32,

    /// Noise frequency; lower values give larger regions
    #[arg(long, default_value_t = DEFAULT_FREQUENCY)]
    pub frequency: f64,

    /// Viewport width in cells
    #[arg(long, default_value_t = VIEWPORT_WIDTH)]
    pub width: usize,

    /// Viewport height in cells
    #[arg(long, default_value_t = VIEWPORT_HEIGHT)]
    pub height: usize,

    #[arg(long, default_value_t = WALK_SPEED)]
    pub walk_speed: f32,

    #[arg(long, default_value_t = RUN_SPEED)]
    pub run_speed: f32,

    /// Keep the player on a single‑screen map the size of the viewport
    #[arg(long)]
    pub bounded: bool,

    /// How long a key counts as held
    #[arg(long, value_enum, default_value_t = HoldPolicy::Timeout)]
    pub hold_policy: HoldPolicy,

    /// Chunks kept in the terrain cache (0 keeps every visited chunk)
    #[arg(long, default_value_t = DEFAULT_CACHE_CHUNKS)]
    pub cache_chunks: usize,

    /// Sample noise for every cell instead of caching chunks
    #[arg(long)]
    pub no_cache: bool,

    /// Print one frame around the start position and exit
    #[arg(long)]
    pub snapshot: bool,

    /// Write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn to_config(&self) -> Result<SimConfig, ConfigError> {
        let bounds = if self.bounded {
            WorldBounds::Bounded {
                width: self.width as f32,
                height: self.height as f32,
            }
        } else {
            WorldBounds::Unbounded
        };
        // single‑screen maps start in the middle
        let player_start = match bounds {
            WorldBounds::Bounded { width, height } => (Vec2::new(width, height) * 0.5).floor(),
            WorldBounds::Unbounded => Vec2::ZERO,
        };

        SimConfig {
            seed: self.seed,
            frequency: self.frequency,
            viewport_width: self.width,
            viewport_height: self.height,
            walk_speed: self.walk_speed,
            run_speed: self.run_speed,
            hold_policy: self.hold_policy,
            bounds,
            player_start,
            chunk_cache: (!self.no_cache).then_some(self.cache_chunks),
            ..default()
        }
        .validated()
    }
}
