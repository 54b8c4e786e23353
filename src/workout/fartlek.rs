// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Randomized fartlek generation
//!
//! A fartlek is a warmup, a run of interval/recovery pairs of random length,
//! and a cooldown. The interval plan always sums to the requested duration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::duration::{mmss_to_seconds, pace_to_ms, round_to_tenth, seconds_to_mmss};
use super::{StepType, Target, Workout, WorkoutStep};
use crate::errors::{GarminError, Result};

/// Seconds per random unit of interval and recovery length
const STEP_UNIT_SECS: u32 = 15;
/// Share of the target speed used as the slow end of the pace zone
const SLOW_PACE_FACTOR: f64 = 0.85;
/// Longest workout accepted: 24 hours
pub const MAX_WORKOUT_SECS: u32 = 24 * 60 * 60;

/// Warmup and cooldown lengths, in seconds, for a target duration
pub fn warmup_cooldown(target_seconds: u32) -> (u32, u32) {
    if target_seconds >= 40 * 60 {
        (600, 600)
    } else if target_seconds >= 25 * 60 {
        (480, 240)
    } else {
        (300, 120)
    }
}

/// Interval plan and workout builder owning its random source
pub struct FartlekGenerator<R: Rng> {
    rng: R,
}

impl FartlekGenerator<StdRng> {
    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> FartlekGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Durations in seconds: warmup, interval/recovery pairs, cooldown
    ///
    /// When the tier's warmup and cooldown already fill the target, no pairs
    /// are drawn and both are scaled down proportionally.
    pub fn interval_plan(&mut self, target_seconds: u32) -> Vec<u32> {
        let (warmup, cooldown) = warmup_cooldown(target_seconds);

        if target_seconds <= warmup + cooldown {
            let cooldown = (u64::from(target_seconds) * u64::from(cooldown)
                / u64::from(warmup + cooldown)) as u32;
            return vec![target_seconds - cooldown, cooldown];
        }

        let target = u64::from(target_seconds);
        let mut plan = vec![warmup, cooldown];
        let mut total = u64::from(warmup + cooldown);

        while total < target {
            let interval = STEP_UNIT_SECS * self.rng.gen_range(2..=8);
            let recovery = interval + STEP_UNIT_SECS * self.rng.gen_range(2..=4);

            let tail = plan.len() - 1;
            plan.insert(tail, interval);
            plan.insert(tail + 1, recovery);
            total += u64::from(interval) + u64::from(recovery);
        }

        if total > target {
            // drop the pair that overshot, then stretch one step by what is left
            let tail = plan.len() - 1;
            let removed: u64 = plan.drain(tail - 2..tail).map(u64::from).sum();
            // the rest of the plan sums below the target, so this fits in u32
            let remaining = (target - (total - removed)) as u32;

            let index = self.rng.gen_range(1..plan.len());
            plan[index] += remaining;
        }

        debug!(target_seconds, steps = plan.len(), "Interval plan computed");
        plan
    }

    /// Build a running fartlek of `duration` at `target_pace`, both `MM:SS`
    ///
    /// The name defaults to `Running workout (<duration>)`.
    pub fn create_workout(
        &mut self,
        duration: &str,
        target_pace: &str,
        name: Option<&str>,
    ) -> Result<Workout> {
        let target_seconds = mmss_to_seconds(duration)?;
        if target_seconds > MAX_WORKOUT_SECS {
            return Err(GarminError::InvalidDurationFormat(format!(
                "{} (longer than {})",
                duration,
                seconds_to_mmss(MAX_WORKOUT_SECS)
            )));
        }
        let target_ms = pace_to_ms(target_pace)?;

        let zone = Target::PaceZone {
            min_value: round_to_tenth(target_ms),
            max_value: round_to_tenth(target_ms * SLOW_PACE_FACTOR),
        };

        let plan = self.interval_plan(target_seconds);
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Running workout ({})", duration));

        let mut workout = Workout::running(name);
        // a plan always holds at least warmup and cooldown
        let (first, last) = (plan[0], plan[plan.len() - 1]);
        let interior = &plan[1..plan.len() - 1];

        workout.add_step(WorkoutStep::timed(1, StepType::Warmup, seconds_to_mmss(first), Target::NoTarget));

        for (offset, seconds) in interior.iter().enumerate() {
            let (step_type, target) = if offset % 2 == 0 {
                (StepType::Interval, zone)
            } else {
                (StepType::Recovery, Target::NoTarget)
            };
            workout.add_step(WorkoutStep::timed(
                offset as u32 + 2,
                step_type,
                seconds_to_mmss(*seconds),
                target,
            ));
        }

        let order = workout.steps.len() as u32 + 1;
        workout.add_step(WorkoutStep::timed(order, StepType::Cooldown, seconds_to_mmss(last), Target::NoTarget));

        Ok(workout)
    }
}

/// Fartlek workout with a fresh random source
pub fn generate_fartlek(duration: &str, target_pace: &str) -> Result<Workout> {
    FartlekGenerator::from_entropy().create_workout(duration, target_pace, None)
}
