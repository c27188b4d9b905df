//! player input (held‑key tracking) & movement

use std::time::Duration;

use bevy::prelude::*;
use tracing::{debug, error, info};

use crate::components::{Player, WorldPosition};
use crate::config::{HoldPolicy, SimConfig};
use crate::terminal::{Key, TerminalSession, TerminationFlag};

/* ===========================================================
   key interpretation
   =========================================================== */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// screen‑space unit step (`+y` is down)
    #[inline]
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up    => Vec2::NEG_Y,
            Direction::Down  => Vec2::Y,
            Direction::Left  => Vec2::NEG_X,
            Direction::Right => Vec2::X,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Move { direction: Direction, run: bool },
    Quit,
    Ignore,
}

/// lowercase `wasd` walks, uppercase runs, `q` / interrupt quits
pub fn interpret(key: Key) -> KeyAction {
    let c = match key {
        Key::Interrupt => return KeyAction::Quit,
        Key::Char(c) => c,
    };
    let direction = match c.to_ascii_lowercase() {
        'q' if c == 'q' => return KeyAction::Quit,
        'w' => Direction::Up,
        's' => Direction::Down,
        'a' => Direction::Left,
        'd' => Direction::Right,
        _ => return KeyAction::Ignore,
    };
    KeyAction::Move {
        direction,
        run: c.is_ascii_uppercase(),
    }
}

/* ===========================================================
   held‑key state
   =========================================================== */
const RUN_SLOT: usize = 4;

/// Which movement flags count as held right now.
///
/// Terminals report key presses (and auto‑repeat) but rarely releases, so a
/// flag remembers the clock time of its last event. Under
/// `HoldPolicy::Timeout` it stays held for `window` after that; under
/// `HoldPolicy::PerFrame` it is held only until `end_tick`.
#[derive(Resource, Debug)]
pub struct HeldKeys {
    policy: HoldPolicy,
    window: Duration,
    last_event: [Option<Duration>; 5],
}

/// what the held flags add up to for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    /// sum of held unit steps; opposite keys cancel, diagonals stay unnormalised
    pub direction: Vec2,
    pub running: bool,
}

impl HeldKeys {
    pub fn new(policy: HoldPolicy, window: Duration) -> Self {
        Self {
            policy,
            window,
            last_event: [None; 5],
        }
    }

    /// record a direction event seen at clock time `now`
    pub fn press(&mut self, direction: Direction, run: bool, now: Duration) {
        self.last_event[direction.slot()] = Some(now);
        if run {
            self.last_event[RUN_SLOT] = Some(now);
        } else if self.policy == HoldPolicy::Timeout {
            // a plain letter means walk again, even if a run is still decaying;
            // a per‑frame batch runs if any of its keys was uppercase
            self.last_event[RUN_SLOT] = None;
        }
    }

    #[inline]
    fn held(&self, slot: usize, now: Duration) -> bool {
        match (self.policy, self.last_event[slot]) {
            (_, None) => false,
            (HoldPolicy::PerFrame, Some(_)) => true,
            (HoldPolicy::Timeout, Some(at)) => now.saturating_sub(at) < self.window,
        }
    }

    pub fn is_held(&self, direction: Direction, now: Duration) -> bool {
        self.held(direction.slot(), now)
    }

    pub fn is_running(&self, now: Duration) -> bool {
        self.held(RUN_SLOT, now)
    }

    pub fn intent(&self, now: Duration) -> MoveIntent {
        let direction = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|d| self.is_held(*d, now))
            .map(Direction::unit)
            .sum();
        MoveIntent {
            direction,
            running: self.is_running(now),
        }
    }

    /// close out the previous tick: per‑frame flags are consumed, decayed
    /// timeout flags are forgotten
    pub fn end_tick(&mut self, now: Duration) {
        match self.policy {
            HoldPolicy::PerFrame => self.last_event = [None; 5],
            HoldPolicy::Timeout => {
                let window = self.window;
                for slot in &mut self.last_event {
                    if slot.is_some_and(|at| now.saturating_sub(at) >= window) {
                        *slot = None;
                    }
                }
            }
        }
    }
}

/// set once the quit key is seen; gates every later system
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuitRequested(pub bool);

/// run condition for everything after input
pub fn simulation_running(quit: Res<QuitRequested>) -> bool {
    !quit.0
}

/* ===========================================================
   player controller
   =========================================================== */
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerController {
    pub walk_speed: f32,
    pub run_speed: f32,
}

impl PlayerController {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            walk_speed: config.walk_speed,
            run_speed: config.run_speed,
        }
    }

    /// `direction * speed * dt`
    #[inline]
    pub fn displacement(&self, intent: MoveIntent, dt: f32) -> Vec2 {
        let speed = if intent.running { self.run_speed } else { self.walk_speed };
        intent.direction * speed * dt
    }
}

/* ===========================================================
   startup
   =========================================================== */
pub fn spawn_player(mut commands: Commands, config: Res<SimConfig>) {
    let start = config.bounds.clamp(config.player_start);
    commands.spawn((Player, WorldPosition(start)));
}

/* ===========================================================
   input: drain the terminal, update held flags
   =========================================================== */
pub fn player_input_system(
    time: Res<Time>,
    mut terminal: ResMut<TerminalSession>,
    termination: Res<TerminationFlag>,
    mut held: ResMut<HeldKeys>,
    mut quit: ResMut<QuitRequested>,
    mut exit: EventWriter<AppExit>,
) {
    if termination.is_raised() {
        info!(target: "wanderer::input", "termination signal received");
        quit.0 = true;
        exit.send(AppExit::Success);
        return;
    }

    let keys = match terminal.poll_keys() {
        Ok(keys) => keys,
        Err(err) => {
            error!(target: "wanderer::input", %err, "terminal input failed");
            quit.0 = true;
            exit.send(AppExit::error());
            return;
        }
    };

    // last tick's flags expire before this tick's events land
    let now = time.elapsed();
    held.end_tick(now);
    for key in keys {
        match interpret(key) {
            KeyAction::Move { direction, run } => held.press(direction, run, now),
            KeyAction::Quit => {
                debug!(target: "wanderer::input", ?key, "quit requested");
                quit.0 = true;
                exit.send(AppExit::Success);
                return;
            }
            KeyAction::Ignore => {}
        }
    }
}

/* ===========================================================
   movement
   =========================================================== */
pub fn player_movement_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    held: Res<HeldKeys>,
    mut q: Query<&mut WorldPosition, With<Player>>,
) {
    let Ok(mut pos) = q.get_single_mut() else { return };
    let intent = held.intent(time.elapsed());
    let delta = PlayerController::from_config(&config).displacement(intent, time.delta_secs());
    pos.0 = config.bounds.clamp(pos.0 + delta);
}
