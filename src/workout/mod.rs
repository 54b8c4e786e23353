// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Structured Workouts
//!
//! A [`Workout`] is an ordered list of [`WorkoutStep`]s. Durations are kept
//! as `MM:SS` strings, the way they are shown to the user; the service
//! payload built by [`Workout::to_payload`] carries them in seconds.
//!
//! ```rust
//! use garmin_workouts::workout::{StepType, Target, Workout, WorkoutStep};
//!
//! let mut workout = Workout::running("Easy");
//! workout.add_step(WorkoutStep::timed(1, StepType::Warmup, "10:00", Target::NoTarget));
//! let payload = workout.to_payload().unwrap();
//! assert_eq!(payload.workout_segments[0].workout_steps[0].end_condition_value, Some(600.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{GarminError, Result};

pub mod duration;
pub mod fartlek;

pub use duration::{mmss_to_seconds, pace_to_ms, round_to_tenth, seconds_to_mmss};
pub use fartlek::{generate_fartlek, FartlekGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    Running,
    Cycling,
    Other,
    Swimming,
    StrengthTraining,
    CardioTraining,
}

impl SportType {
    pub const fn id(self) -> u32 {
        match self {
            SportType::Running => 1,
            SportType::Cycling => 2,
            SportType::Other => 3,
            SportType::Swimming => 4,
            SportType::StrengthTraining => 5,
            SportType::CardioTraining => 6,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            SportType::Running => "running",
            SportType::Cycling => "cycling",
            SportType::Other => "other",
            SportType::Swimming => "swimming",
            SportType::StrengthTraining => "strength_training",
            SportType::CardioTraining => "cardio_training",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Warmup,
    Cooldown,
    Interval,
    Recovery,
}

impl StepType {
    pub const fn id(self) -> u32 {
        match self {
            StepType::Warmup => 1,
            StepType::Cooldown => 2,
            StepType::Interval => 3,
            StepType::Recovery => 4,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            StepType::Warmup => "warmup",
            StepType::Cooldown => "cooldown",
            StepType::Interval => "interval",
            StepType::Recovery => "recovery",
        }
    }
}

/// What ends a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndCondition {
    LapButton,
    Time,
    Distance,
}

impl EndCondition {
    pub const fn id(self) -> u32 {
        match self {
            EndCondition::LapButton => 1,
            EndCondition::Time => 2,
            EndCondition::Distance => 3,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            EndCondition::LapButton => "lap.button",
            EndCondition::Time => "time",
            EndCondition::Distance => "distance",
        }
    }
}

/// Intensity target of a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    NoTarget,
    /// Speeds in meters per second. `min_value` comes from the target pace and
    /// `max_value` from 85% of it, so `max_value` is the smaller number.
    PaceZone { min_value: f64, max_value: f64 },
}

impl Target {
    pub const fn id(&self) -> u32 {
        match self {
            Target::NoTarget => 1,
            Target::PaceZone { .. } => 6,
        }
    }

    pub const fn key(&self) -> &'static str {
        match self {
            Target::NoTarget => "no.target",
            Target::PaceZone { .. } => "pace.zone",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutStep {
    /// 1-based position in the workout
    pub order: u32,
    pub step_type: StepType,
    pub end_condition: EndCondition,
    /// `MM:SS` for timed steps, meters for distance steps, empty for lap button
    pub end_condition_value: String,
    pub target: Target,
}

impl WorkoutStep {
    pub fn timed(order: u32, step_type: StepType, duration: impl Into<String>, target: Target) -> Self {
        Self {
            order,
            step_type,
            end_condition: EndCondition::Time,
            end_condition_value: duration.into(),
            target,
        }
    }

    fn end_condition_payload(&self) -> Result<Option<f64>> {
        match self.end_condition {
            EndCondition::LapButton => Ok(None),
            EndCondition::Time => Ok(Some(f64::from(mmss_to_seconds(&self.end_condition_value)?))),
            EndCondition::Distance => self
                .end_condition_value
                .parse::<f64>()
                .map(Some)
                .map_err(|_| GarminError::InvalidDurationFormat(self.end_condition_value.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub sport_type: SportType,
    pub name: String,
    pub steps: Vec<WorkoutStep>,
}

impl Workout {
    pub fn new(sport_type: SportType, name: impl Into<String>) -> Self {
        Self {
            sport_type,
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn running(name: impl Into<String>) -> Self {
        Self::new(SportType::Running, name)
    }

    pub fn add_step(&mut self, step: WorkoutStep) {
        self.steps.push(step);
    }

    /// Total planned time of the timed steps, in seconds
    pub fn total_seconds(&self) -> Result<u32> {
        self.steps
            .iter()
            .filter(|step| step.end_condition == EndCondition::Time)
            .map(|step| mmss_to_seconds(&step.end_condition_value))
            .sum()
    }

    /// Build the body of a workout-service create request
    pub fn to_payload(&self) -> Result<WorkoutPayload> {
        let sport_type = SportTypeDto::from(self.sport_type);

        let workout_steps = self
            .steps
            .iter()
            .map(|step| {
                let (target_value_one, target_value_two) = match step.target {
                    Target::NoTarget => (None, None),
                    Target::PaceZone { min_value, max_value } => (Some(min_value), Some(max_value)),
                };

                Ok(ExecutableStepDto {
                    kind: "ExecutableStepDTO".to_string(),
                    step_order: step.order,
                    step_type: StepTypeDto {
                        step_type_id: step.step_type.id(),
                        step_type_key: step.step_type.key().to_string(),
                    },
                    end_condition: ConditionTypeDto {
                        condition_type_id: step.end_condition.id(),
                        condition_type_key: step.end_condition.key().to_string(),
                    },
                    end_condition_value: step.end_condition_payload()?,
                    target_type: TargetTypeDto {
                        workout_target_type_id: step.target.id(),
                        workout_target_type_key: step.target.key().to_string(),
                    },
                    target_value_one,
                    target_value_two,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(WorkoutPayload {
            sport_type: sport_type.clone(),
            workout_name: self.name.clone(),
            workout_segments: vec![WorkoutSegmentDto {
                segment_order: 1,
                sport_type,
                workout_steps,
            }],
        })
    }
}

/// JSON body accepted by the workout service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPayload {
    pub sport_type: SportTypeDto,
    pub workout_name: String,
    pub workout_segments: Vec<WorkoutSegmentDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SportTypeDto {
    pub sport_type_id: u32,
    pub sport_type_key: String,
}

impl From<SportType> for SportTypeDto {
    fn from(sport_type: SportType) -> Self {
        Self {
            sport_type_id: sport_type.id(),
            sport_type_key: sport_type.key().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSegmentDto {
    pub segment_order: u32,
    pub sport_type: SportTypeDto,
    pub workout_steps: Vec<ExecutableStepDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableStepDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub step_order: u32,
    pub step_type: StepTypeDto,
    pub end_condition: ConditionTypeDto,
    pub end_condition_value: Option<f64>,
    pub target_type: TargetTypeDto,
    pub target_value_one: Option<f64>,
    pub target_value_two: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTypeDto {
    pub step_type_id: u32,
    pub step_type_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionTypeDto {
    pub condition_type_id: u32,
    pub condition_type_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetTypeDto {
    pub workout_target_type_id: u32,
    pub workout_target_type_key: String,
}
