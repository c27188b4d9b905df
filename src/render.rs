//! frame composition: terrain + player + patrol overlays → text grid
use std::collections::HashSet;

use bevy::prelude::*;
use tracing::error;

use crate::camera::{camera_center, ViewCamera};
use crate::components::{Patrol, Player, WorldPosition};
use crate::config::SimConfig;
use crate::constants::{PATROL_GLYPH, PLAYER_GLYPH};
use crate::patrol::active_count;
use crate::player::HeldKeys;
use crate::terminal::TerminalSession;
use crate::tile_stream::WorldView;

/// one screenful: `height` rows of exactly `width` chars, then a status line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub rows: Vec<String>,
    pub status: String,
}

/// frames handed to the terminal so far
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub presented: u64,
}

/// Character grid for the viewport whose top‑left cell is `origin`.
///
/// Priority per cell is patrol, then player, then terrain. Only the patrols
/// passed in are drawn, so callers hand over active ones only. Patrols
/// sharing a cell draw the same glyph, so their order never shows.
pub fn compose_rows(
    view: &mut WorldView,
    origin: IVec2,
    width: usize,
    height: usize,
    player: Vec2,
    patrols: &[Vec2],
) -> Vec<String> {
    let max = origin + IVec2::new(width as i32 - 1, height as i32 - 1);
    view.prefetch(origin, max);

    let patrol_cells: HashSet<IVec2> = patrols.iter().map(|p| p.floor().as_ivec2()).collect();
    let player_cell = player.floor().as_ivec2();

    let mut rows = Vec::with_capacity(height);
    for y in 0..height as i32 {
        let mut row = String::with_capacity(width);
        for x in 0..width as i32 {
            let cell = origin + IVec2::new(x, y);
            let glyph = if patrol_cells.contains(&cell) {
                PATROL_GLYPH
            } else if cell == player_cell {
                PLAYER_GLYPH
            } else {
                view.symbol_at(cell).glyph()
            };
            row.push(glyph);
        }
        rows.push(row);
    }
    rows
}

pub fn status_line(player: Vec2, active_patrols: usize, seed: u32, running: bool) -> String {
    format!(
        "pos ({:.1}, {:.1})  patrols {}  seed {}{}  [wasd move, WASD run, q quit]",
        player.x,
        player.y,
        active_patrols,
        seed,
        if running { "  RUN" } else { "" },
    )
}

/// single still frame around the start position, no patrols
pub fn snapshot(config: &SimConfig) -> Frame {
    let mut view = WorldView::from_config(config);
    let player = config.bounds.clamp(config.player_start);
    let camera = ViewCamera {
        center: camera_center(player, config.bounds, config.viewport_width, config.viewport_height),
    };
    let origin = camera.origin_cell(config.viewport_width, config.viewport_height);
    Frame {
        rows: compose_rows(
            &mut view,
            origin,
            config.viewport_width,
            config.viewport_height,
            player,
            &[],
        ),
        status: status_line(player, 0, config.seed, false),
    }
}

/* ===========================================================
   render system
   =========================================================== */
#[allow(clippy::too_many_arguments)]
pub fn render_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    camera: Res<ViewCamera>,
    held: Res<HeldKeys>,
    mut view: ResMut<WorldView>,
    mut terminal: ResMut<TerminalSession>,
    mut stats: ResMut<FrameStats>,
    mut exit: EventWriter<AppExit>,
    player_q: Query<&WorldPosition, With<Player>>,
    patrol_q: Query<(&Patrol, &WorldPosition), Without<Player>>,
) {
    let Ok(player) = player_q.get_single() else { return };

    let patrols: Vec<Vec2> = patrol_q
        .iter()
        .filter(|(p, _)| p.active)
        .map(|(_, pos)| pos.0)
        .collect();
    let active = active_count(patrol_q.iter().map(|(p, _)| p));

    let origin = camera.origin_cell(config.viewport_width, config.viewport_height);
    let frame = Frame {
        rows: compose_rows(
            &mut view,
            origin,
            config.viewport_width,
            config.viewport_height,
            player.0,
            &patrols,
        ),
        status: status_line(player.0, active, config.seed, held.is_running(time.elapsed())),
    };

    match terminal.present(&frame) {
        Ok(()) => stats.presented += 1,
        Err(err) => {
            error!(target: "wanderer::render", %err, "failed to draw frame");
            exit.send(AppExit::error());
        }
    }
}
