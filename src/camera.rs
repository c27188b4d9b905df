use bevy::prelude::*;

use crate::components::{Player, WorldPosition};
use crate::config::{SimConfig, WorldBounds};

/// world position the viewport is centred on; rewritten every tick
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewCamera {
    pub center: Vec2,
}

impl ViewCamera {
    /// top‑left visible cell for a `width` x `height` viewport
    #[inline]
    pub fn origin_cell(&self, width: usize, height: usize) -> IVec2 {
        self.center.floor().as_ivec2() - IVec2::new((width / 2) as i32, (height / 2) as i32)
    }
}

/// clamp one axis so the viewport stays on the map; maps narrower than the
/// viewport are simply centred
#[inline]
fn clamp_axis(v: f32, view: usize, world: f32) -> f32 {
    // visible cells are `floor(v) - view/2 .. floor(v) - view/2 + view`
    let (lo, hi) = ((view / 2) as f32, world - (view - view / 2) as f32);
    if hi < lo {
        world * 0.5
    } else {
        v.clamp(lo, hi)
    }
}

/// camera centre for a player at `player`
///
/// Unbounded worlds follow the player exactly. Bounded maps clamp the
/// camera to the world edges so the view never shows off‑map cells.
pub fn camera_center(player: Vec2, bounds: WorldBounds, width: usize, height: usize) -> Vec2 {
    match bounds {
        WorldBounds::Unbounded => player,
        WorldBounds::Bounded { width: world_w, height: world_h } => Vec2::new(
            clamp_axis(player.x, width, world_w),
            clamp_axis(player.y, height, world_h),
        ),
    }
}

/// simple camera follow, runs after all movement for the tick
pub fn camera_follow_system(
    config: Res<SimConfig>,
    player_q: Query<&WorldPosition, With<Player>>,
    mut camera: ResMut<ViewCamera>,
) {
    let Ok(player) = player_q.get_single() else { return };
    camera.center = camera_center(
        player.0,
        config.bounds,
        config.viewport_width,
        config.viewport_height,
    );
}
