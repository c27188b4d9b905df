use std::ops::RangeInclusive;
use std::time::Duration;

/// -------- world / noise --------
pub const DEFAULT_SEED: u32 = 1337;
pub const DEFAULT_FREQUENCY: f64 = 0.05;

/// -------- viewport --------
pub const VIEWPORT_WIDTH: usize  = 80;
pub const VIEWPORT_HEIGHT: usize = 25;

/// -------- chunk cache --------
pub const CHUNK_WIDTH: usize  = 80;
pub const CHUNK_HEIGHT: usize = 25;
pub const DEFAULT_CACHE_CHUNKS: usize = 64;

/// -------- player --------
pub const WALK_SPEED: f32 = 6.0;
pub const RUN_SPEED: f32  = 12.0;
pub const HOLD_WINDOW: Duration = Duration::from_millis(160);

/// -------- patrols --------
pub const PATROL_SPEED: f32   = 4.2;
pub const PATROL_STAMINA: f32 = 20.0;
pub const SPAWN_INTERVAL: RangeInclusive<f32> = 5.0..=12.0;
pub const SPAWN_OFFSET: f32   = 15.0;
/// below this distance a patrol counts as standing on its target
pub const STEER_EPSILON: f32  = 0.001;

/// -------- glyphs --------
pub const PLAYER_GLYPH: char = 'P';
pub const PATROL_GLYPH: char = 'X';

/// -------- pacing --------
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
