//! patrol spawn timer, seek pursuit & stamina
use std::ops::RangeInclusive;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::components::{Patrol, Player, WorldPosition};
use crate::config::SimConfig;
use crate::constants::STEER_EPSILON;

/// keeps the spawn stream independent of other seeded streams
const SPAWN_SEED_SALT: u64 = 0x5eed_9a7e;

/* ===========================================================
   spawn timer
   =========================================================== */

/// Irregular spawn clock: fires once its accumulator passes a threshold,
/// then re‑draws the threshold uniformly from the configured interval.
#[derive(Resource, Debug)]
pub struct PatrolSpawner {
    timer: f32,
    next_threshold: f32,
    next_serial: u64,
    rng: StdRng,
}

impl PatrolSpawner {
    pub fn new(config: &SimConfig) -> Self {
        Self::with_rng(
            StdRng::seed_from_u64(u64::from(config.seed) ^ SPAWN_SEED_SALT),
            &config.spawn_interval,
        )
    }

    pub fn with_rng(mut rng: StdRng, interval: &RangeInclusive<f32>) -> Self {
        let next_threshold = rng.gen_range(interval.clone());
        Self {
            timer: 0.0,
            next_threshold,
            next_serial: 0,
            rng,
        }
    }

    /// advance by `dt`; `true` means one patrol is due this tick
    pub fn tick(&mut self, dt: f32, interval: &RangeInclusive<f32>) -> bool {
        self.timer += dt;
        if self.timer < self.next_threshold {
            return false;
        }
        self.timer = 0.0;
        self.next_threshold = self.rng.gen_range(interval.clone());
        true
    }

    /// uniform offset in `[-range, range]` on each axis
    pub fn offset(&mut self, range: f32) -> Vec2 {
        Vec2::new(
            self.rng.gen_range(-range..=range),
            self.rng.gen_range(-range..=range),
        )
    }

    pub fn next_serial(&mut self) -> u64 {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn next_threshold(&self) -> f32 {
        self.next_threshold
    }
}

/* ===========================================================
   seek steering
   =========================================================== */
impl Patrol {
    /// One update pass: expire, or step toward `target` and burn stamina.
    ///
    /// Exhaustion is noticed on the pass *after* stamina reaches zero. The
    /// step never exceeds the remaining distance, so a patrol settles on its
    /// target instead of orbiting it.
    pub fn pursue(&mut self, pos: &mut Vec2, target: Vec2, speed: f32, dt: f32) {
        if !self.active {
            return;
        }
        if self.stamina_remaining <= 0.0 {
            self.active = false;
            return;
        }

        let to_target = target - *pos;
        let dist = to_target.length();
        if dist > STEER_EPSILON {
            let step = (speed * dt).min(dist);
            *pos += to_target / dist * step;
        }
        self.stamina_remaining -= dt;
    }
}

/// fresh count of active patrols
pub fn active_count<'a>(patrols: impl IntoIterator<Item = &'a Patrol>) -> usize {
    patrols.into_iter().filter(|p| p.active).count()
}

/* ===========================================================
   systems
   =========================================================== */
pub fn patrol_spawn_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<SimConfig>,
    mut spawner: ResMut<PatrolSpawner>,
    player_q: Query<&WorldPosition, With<Player>>,
) {
    let Ok(player) = player_q.get_single() else { return };
    if !spawner.tick(time.delta_secs(), &config.spawn_interval) {
        return;
    }

    let pos = config.bounds.clamp(player.0 + spawner.offset(config.spawn_offset));
    let serial = spawner.next_serial();
    commands.spawn((Patrol::fresh(config.patrol_stamina, serial), WorldPosition(pos)));
    debug!(
        target: "wanderer::patrol",
        serial,
        x = pos.x,
        y = pos.y,
        next_in = spawner.next_threshold(),
        "patrol spawned"
    );
}

pub fn patrol_pursuit_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    player_q: Query<&WorldPosition, With<Player>>,
    mut patrols: Query<(&mut Patrol, &mut WorldPosition), Without<Player>>,
) {
    let Ok(player) = player_q.get_single() else { return };
    let dt = time.delta_secs();

    for (mut patrol, mut pos) in &mut patrols {
        patrol.pursue(&mut pos.0, player.0, config.patrol_speed, dt);
    }
}

/// batch compaction: drop every patrol that went inactive this tick
pub fn sweep_inactive_patrols_system(mut commands: Commands, patrols: Query<(Entity, &Patrol)>) {
    for (entity, patrol) in &patrols {
        if !patrol.active {
            debug!(target: "wanderer::patrol", serial = patrol.serial, "patrol exhausted");
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn interval() -> RangeInclusive<f32> {
        5.0..=12.0
    }

    #[test]
    fn spawner_fires_after_threshold_and_redraws() {
        let range = interval();
        let mut spawner = PatrolSpawner::with_rng(StdRng::seed_from_u64(9), &range);
        let first = spawner.next_threshold();
        assert!(range.contains(&first));

        let mut fired_at = None;
        for step in 1..=130 {
            if spawner.tick(0.1, &range) {
                fired_at = Some(step as f32 * 0.1);
                break;
            }
        }
        let fired_at = fired_at.expect("spawner never fired");
        assert!(fired_at >= first - 1e-3 && fired_at < first + 0.1 + 1e-3);
        assert_eq!(spawner.timer(), 0.0);
        assert!(range.contains(&spawner.next_threshold()));
    }

    #[test]
    fn spawner_is_reproducible() {
        let range = interval();
        let mut a = PatrolSpawner::with_rng(StdRng::seed_from_u64(3), &range);
        let mut b = PatrolSpawner::with_rng(StdRng::seed_from_u64(3), &range);
        assert_eq!(a.next_threshold(), b.next_threshold());
        assert_eq!(a.offset(15.0), b.offset(15.0));
    }

    #[test]
    fn offsets_stay_in_range() {
        let mut spawner = PatrolSpawner::with_rng(StdRng::seed_from_u64(11), &interval());
        for _ in 0..500 {
            let o = spawner.offset(15.0);
            assert!(o.x.abs() <= 15.0 && o.y.abs() <= 15.0);
        }
    }

    #[test]
    fn serials_increase() {
        let mut spawner = PatrolSpawner::with_rng(StdRng::seed_from_u64(1), &interval());
        assert_eq!(spawner.next_serial(), 0);
        assert_eq!(spawner.next_serial(), 1);
    }

    #[test]
    fn stamina_drains_by_dt_then_expires_next_pass() {
        let mut patrol = Patrol::fresh(0.25, 0);
        let mut pos = Vec2::new(50.0, 0.0);

        patrol.pursue(&mut pos, Vec2::ZERO, 1.0, 0.125);
        assert_eq!(patrol.stamina_remaining, 0.125);
        assert!(patrol.active);

        patrol.pursue(&mut pos, Vec2::ZERO, 1.0, 0.125);
        assert_eq!(patrol.stamina_remaining, 0.0);
        assert!(patrol.active, "must not expire on the pass that emptied stamina");

        let before = pos;
        patrol.pursue(&mut pos, Vec2::ZERO, 1.0, 0.125);
        assert!(!patrol.active);
        assert_eq!(pos, before, "an expiring patrol does not move");

        for _ in 0..10 {
            patrol.pursue(&mut pos, Vec2::ZERO, 1.0, 0.125);
            assert!(!patrol.active);
        }
        assert_eq!(pos, before);
    }

    #[test]
    fn moves_strictly_closer_without_overshoot() {
        let target = Vec2::new(3.0, -2.0);
        let mut pos = Vec2::new(-7.0, 6.0);
        let mut patrol = Patrol::fresh(100.0, 0);
        let (speed, dt) = (4.2, 1.0 / 60.0);

        let mut dist = pos.distance(target);
        while dist > speed * dt {
            patrol.pursue(&mut pos, target, speed, dt);
            let next = pos.distance(target);
            assert!(next < dist);
            assert_relative_eq!(dist - next, speed * dt, epsilon = 1e-4);
            dist = next;
        }
    }

    #[test]
    fn coincident_patrol_does_not_move() {
        let mut patrol = Patrol::fresh(5.0, 0);
        let mut pos = Vec2::new(2.0, 2.0);
        patrol.pursue(&mut pos, Vec2::new(2.0, 2.0), 4.2, 0.1);
        assert_eq!(pos, Vec2::new(2.0, 2.0));
        assert!(pos.x.is_finite() && pos.y.is_finite());
        assert_relative_eq!(patrol.stamina_remaining, 4.9);
    }

    #[test]
    fn reaches_stationary_player_before_stamina_runs_out() {
        let player = Vec2::ZERO;
        let mut pos = Vec2::new(10.0, 0.0);
        let mut patrol = Patrol::fresh(20.0, 0);
        let dt = 1.0 / 60.0;

        let mut reached_with = None;
        for _ in 0..(20.0 / dt) as usize {
            patrol.pursue(&mut pos, player, 4.2, dt);
            if pos.distance(player) < STEER_EPSILON {
                reached_with = Some(patrol.stamina_remaining);
                break;
            }
        }
        let left = reached_with.expect("patrol never reached the player");
        assert!(left > 0.0);
        assert!(patrol.active);

        // keeps tracking while stamina lasts
        for _ in 0..30 {
            patrol.pursue(&mut pos, player, 4.2, dt);
            assert!(patrol.active);
            assert!(pos.distance(player) < STEER_EPSILON);
        }

        patrol.stamina_remaining = 0.0;
        patrol.pursue(&mut pos, player, 4.2, dt);
        assert!(!patrol.active);
    }

    #[test]
    fn active_count_is_fresh() {
        let mut patrols: Vec<Patrol> = (0..5).map(|i| Patrol::fresh(1.0, i)).collect();
        assert_eq!(active_count(&patrols), 5);
        patrols[1].active = false;
        patrols[3].active = false;
        assert_eq!(active_count(&patrols), 3);
    }
}
