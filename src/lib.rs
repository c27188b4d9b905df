//! terminal noise‑world walker with pursuing patrols
//!
//! Everything runs inside a headless Bevy app: one chained `Update` pass per
//! tick (input → player → patrols → camera → render), paced by
//! [`run_session`]. Works with **Bevy 0.15** built without its multi‑threaded
//! executor.

pub mod camera;
pub mod cli;
pub mod components;
pub mod config;
pub mod constants;
pub mod logging;
pub mod patrol;
pub mod player;
pub mod render;
pub mod terminal;
pub mod terrain;
pub mod tile_stream;

use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use bevy::app::{PluginsState, ScheduleRunnerPlugin};
use bevy::prelude::*;

use camera::{camera_follow_system, ViewCamera};
use config::SimConfig;
use patrol::{
    patrol_pursuit_system, patrol_spawn_system, sweep_inactive_patrols_system, PatrolSpawner,
};
use player::{
    player_input_system, player_movement_system, simulation_running, spawn_player, HeldKeys,
    QuitRequested,
};
use render::{render_system, FrameStats};
use terminal::{TerminalSession, TerminationFlag};
use tile_stream::WorldView;

/// simulation resources & the per‑tick system chain
///
/// Expects a [`TerminalSession`] resource and Bevy's `TimePlugin`.
pub struct WandererPlugin {
    config: SimConfig,
}

impl WandererPlugin {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }
}

impl Plugin for WandererPlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;
        app.insert_resource(config.clone())
            .insert_resource(WorldView::from_config(config))
            .insert_resource(HeldKeys::new(config.hold_policy, config.hold_window))
            .insert_resource(PatrolSpawner::new(config))
            .init_resource::<ViewCamera>()
            .init_resource::<QuitRequested>()
            .init_resource::<TerminationFlag>()
            .init_resource::<FrameStats>()

            /* startup ------------------------------------------------------ */
            .add_systems(Startup, spawn_player)

            /* per tick ----------------------------------------------------- */
            .add_systems(
                Update,
                (
                    player_input_system, // drain keys, maybe quit
                    (
                        player_movement_system,        // held keys → position
                        patrol_spawn_system,           // irregular spawn timer
                        patrol_pursuit_system,         // seek + stamina
                        sweep_inactive_patrols_system, // drop exhausted
                        camera_follow_system,          // centre on player
                        render_system,                 // compose & present
                    )
                        .chain()
                        .run_if(simulation_running),
                )
                    .chain(),
            );
    }
}

/// headless app driving `session`; tick it with [`run_session`]
pub fn build_app(config: SimConfig, session: TerminalSession) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins.build().disable::<ScheduleRunnerPlugin>())
        .insert_resource(session)
        .add_plugins(WandererPlugin::new(config));
    app
}

/// Tick `app` every `frame_interval` until something asks to exit, then take
/// the terminal session back out of the world and restore it.
///
/// A failed restore is an error even after a clean quit.
pub fn run_session(mut app: App) -> Result<AppExit> {
    if app.plugins_state() == PluginsState::Ready {
        app.finish();
        app.cleanup();
    }
    let frame_interval = app.world().resource::<SimConfig>().frame_interval;

    let exit = loop {
        let started = Instant::now();
        app.update();
        if let Some(exit) = app.should_exit() {
            break exit;
        }
        if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    };

    let mut session = app
        .world_mut()
        .remove_resource::<TerminalSession>()
        .context("terminal session missing after the run loop")?;
    session.release()?;
    Ok(exit)
}
