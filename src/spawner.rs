use log::debug;
use rand::Rng;

use crate::entities::Entity;
use crate::registry::{EntityId, EntityRegistry};

/// How the spawn interval shrinks as the score grows.
#[derive(Clone, Copy, Debug)]
pub struct Difficulty {
    pub initial_interval_ms: u64,
    pub floor_ms: u64,
    pub step_ms: u64,
    pub score_per_step: u32,
}

impl Difficulty {
    /// Interval for a given score: one step shorter for every `score_per_step`
    /// points, never below the floor.
    pub fn spawn_interval_for_score(&self, score: u32) -> u64 {
        let steps = u64::from(score / self.score_per_step.max(1));
        self.initial_interval_ms
            .saturating_sub(steps.saturating_mul(self.step_ms))
            .max(self.floor_ms)
    }
}

/// Drops asteroids from the top edge at a fixed interval.
///
/// Elapsed frame time is accumulated and one asteroid is released each time
/// the accumulator reaches the interval, so the cadence does not depend on
/// frame pacing.
pub struct AsteroidSpawner {
    accumulator_ms: u64,
    pub width: f64,
    pub height: f64,
    pub min_speed: u32,
    pub max_speed: u32,
}

impl AsteroidSpawner {
    pub fn new(width: f64, height: f64, min_speed: u32, max_speed: u32) -> Self {
        AsteroidSpawner {
            accumulator_ms: 0,
            width,
            height,
            min_speed,
            max_speed,
        }
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0;
    }

    /// Advances the timer by `elapsed_ms`, spawning at most one asteroid once
    /// `interval_ms` has built up.
    pub fn tick(
        &mut self,
        elapsed_ms: u64,
        interval_ms: u64,
        registry: &mut EntityRegistry,
        field_width: f64,
        rng: &mut impl Rng,
    ) -> Option<EntityId> {
        self.accumulator_ms += elapsed_ms;
        if self.accumulator_ms < interval_ms {
            return None;
        }
        self.accumulator_ms = 0;

        let max_x = (field_width - self.width).max(0.0);
        let x = rng.gen_range(0.0..=max_x);
        let speed = rng.gen_range(self.min_speed..=self.max_speed);
        debug!("Asteroid spawned at x={:.0} speed={}", x, speed);
        Some(registry.add(Entity::asteroid(x, self.width, self.height, f64::from(speed))))
    }
}
