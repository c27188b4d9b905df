//! simulation tunables & start‑up validation
use std::ops::RangeInclusive;
use std::time::Duration;

use bevy::prelude::*;
use clap::ValueEnum;
use thiserror::Error;

use crate::constants::*;
use crate::tile_stream::chunks_spanned;

/// how long a direction key stays "held" after its event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum HoldPolicy {
    /// held for `hold_window` after the last event, then decays
    #[default]
    Timeout,
    /// held only for the tick the event arrived in
    PerFrame,
}

/// continuous infinite world, or a fixed map the player cannot leave
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum WorldBounds {
    #[default]
    Unbounded,
    Bounded { width: f32, height: f32 },
}

impl WorldBounds {
    /// keep a position on the map; the last cell on each axis is `size - 1`
    pub fn clamp(self, pos: Vec2) -> Vec2 {
        match self {
            WorldBounds::Unbounded => pos,
            WorldBounds::Bounded { width, height } => Vec2::new(
                pos.x.clamp(0.0, width - 1.0),
                pos.y.clamp(0.0, height - 1.0),
            ),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("noise frequency must be positive and finite, got {0}")]
    Frequency(f64),
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    Viewport { width: usize, height: usize },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("walk speed {walk} must be lower than run speed {run}")]
    WalkNotSlowerThanRun { walk: f32, run: f32 },
    #[error("spawn interval {start}..={end} must be positive and ordered")]
    SpawnInterval { start: f32, end: f32 },
    #[error("spawn offset must be finite and non-negative, got {0}")]
    SpawnOffset(f32),
    #[error("bounded map must be at least 1x1 cells, got {width}x{height}")]
    Bounds { width: f32, height: f32 },
    #[error("chunk cache of {capacity} chunks cannot hold one viewport (use 0 for unbounded or at least {min})")]
    CacheTooSmall { capacity: usize, min: usize },
}

/// Every tunable of a run, inserted as a resource.
#[derive(Resource, Clone, Debug)]
pub struct SimConfig {
    pub seed: u32,
    pub frequency: f64,
    pub viewport_width: usize,
    pub viewport_height: usize,
    pub walk_speed: f32,
    pub run_speed: f32,
    pub hold_policy: HoldPolicy,
    pub hold_window: Duration,
    pub patrol_speed: f32,
    pub patrol_stamina: f32,
    pub spawn_interval: RangeInclusive<f32>,
    pub spawn_offset: f32,
    pub bounds: WorldBounds,
    pub player_start: Vec2,
    /// `None` samples noise per cell; `Some(0)` caches without a bound
    pub chunk_cache: Option<usize>,
    pub frame_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            frequency: DEFAULT_FREQUENCY,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            walk_speed: WALK_SPEED,
            run_speed: RUN_SPEED,
            hold_policy: HoldPolicy::default(),
            hold_window: HOLD_WINDOW,
            patrol_speed: PATROL_SPEED,
            patrol_stamina: PATROL_STAMINA,
            spawn_interval: SPAWN_INTERVAL,
            spawn_offset: SPAWN_OFFSET,
            bounds: WorldBounds::default(),
            player_start: Vec2::ZERO,
            chunk_cache: Some(DEFAULT_CACHE_CHUNKS),
            frame_interval: FRAME_INTERVAL,
        }
    }
}

#[inline]
fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frequency.is_finite() && self.frequency > 0.0) {
            return Err(ConfigError::Frequency(self.frequency));
        }
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        positive("walk speed", self.walk_speed)?;
        positive("run speed", self.run_speed)?;
        positive("patrol speed", self.patrol_speed)?;
        positive("patrol stamina", self.patrol_stamina)?;
        if self.walk_speed >= self.run_speed {
            return Err(ConfigError::WalkNotSlowerThanRun {
                walk: self.walk_speed,
                run: self.run_speed,
            });
        }

        let (start, end) = (*self.spawn_interval.start(), *self.spawn_interval.end());
        if !(start.is_finite() && end.is_finite() && start > 0.0 && start <= end) {
            return Err(ConfigError::SpawnInterval { start, end });
        }
        if !(self.spawn_offset.is_finite() && self.spawn_offset >= 0.0) {
            return Err(ConfigError::SpawnOffset(self.spawn_offset));
        }

        if let WorldBounds::Bounded { width, height } = self.bounds {
            if !(width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0) {
                return Err(ConfigError::Bounds { width, height });
            }
        }
        if let Some(capacity) = self.chunk_cache {
            let min = chunks_spanned(self.viewport_width, self.viewport_height);
            if capacity != 0 && capacity < min {
                return Err(ConfigError::CacheTooSmall { capacity, min });
            }
        }
        Ok(())
    }

    /// consume & validate in one go
    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
