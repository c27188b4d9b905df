use bevy::prelude::*;

/* ===========================================================
   shared components
   =========================================================== */

/// continuous position in world cells; `+y` points down the screen
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Deref, DerefMut)]
pub struct WorldPosition(pub Vec2);

impl WorldPosition {
    /// discrete cell this position falls in (floor, not truncation)
    #[inline]
    pub fn cell(&self) -> IVec2 {
        self.0.floor().as_ivec2()
    }
}

/* ===========================================================
   player
   =========================================================== */
#[derive(Component)]
pub struct Player;

/* ===========================================================
   patrols
   =========================================================== */
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Patrol {
    /// seconds of pursuit left
    pub stamina_remaining: f32,
    /// false once stamina ran out; never flips back
    pub active: bool,
    /// spawn order; identifies the patrol in logs
    pub serial: u64,
}

impl Patrol {
    pub fn fresh(stamina: f32, serial: u64) -> Self {
        Self {
            stamina_remaining: stamina,
            active: true,
            serial,
        }
    }
}
