//! [`ActionDispatcher`] – maps a decoded [`Instruction`] onto the [`Effector`].
//!
//! Only `move` is wired to the effector today.  The other known verbs are
//! accepted and skipped; verbs outside the vocabulary are handled according
//! to the configured [`UnknownActionPolicy`].
//!
//! # Move mapping
//!
//! The reported distance is amplified and floored,
//! `max(MIN_STEP, distance * DISTANCE_SCALE)`, so small model outputs still
//! produce visible motion.  The displacement is taken relative to the
//! player's yaw and the target is lifted by [`STEP_UP`] to avoid clipping
//! into terrain.

use std::sync::Arc;

use craftpilot_types::{CraftError, Instruction, MoveDirection, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::effector::Effector;

/// Smallest distance a `move` will ever travel.
pub const MIN_STEP: f64 = 0.5;
/// Factor applied to the model-reported distance.
pub const DISTANCE_SCALE: f64 = 10.0;
/// Vertical lift added to every `move` target.
pub const STEP_UP: f64 = 1.0;

/// What to do with an action verb outside the known vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownActionPolicy {
    /// Skip without logging.
    #[default]
    Ignore,
    /// Skip and log a warning.
    Warn,
    /// Return [`CraftError::UnknownAction`].
    Reject,
}

/// Result of a successful [`ActionDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Moved {
        target: Vec3,
        effective_distance: f64,
    },
    /// The instruction was valid but nothing was executed.
    Skipped { function: String },
}

/// Scale a model-reported distance into the distance actually travelled.
pub fn effective_distance(raw_distance: f64) -> f64 {
    // `f64::max` discards NaN, so a NaN distance also yields MIN_STEP.
    (raw_distance * DISTANCE_SCALE).max(MIN_STEP)
}

/// Unit `(dx, dz)` displacement for `direction` at `yaw_degrees`.
///
/// Yaw `0` faces south (`+z`); the player's left is then east (`+x`).
pub fn heading_vector(direction: MoveDirection, yaw_degrees: f64) -> (f64, f64) {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    match direction {
        MoveDirection::Forward => (-sin, cos),
        MoveDirection::Backward => (sin, -cos),
        MoveDirection::Left => (cos, sin),
        MoveDirection::Right => (-cos, -sin),
    }
}

/// Routes decoded instructions to an [`Effector`].
pub struct ActionDispatcher {
    effector: Arc<dyn Effector>,
    unknown_actions: UnknownActionPolicy,
}

impl ActionDispatcher {
    pub fn new(effector: Arc<dyn Effector>) -> Self {
        Self {
            effector,
            unknown_actions: UnknownActionPolicy::default(),
        }
    }

    pub fn with_unknown_action_policy(mut self, policy: UnknownActionPolicy) -> Self {
        self.unknown_actions = policy;
        self
    }

    /// Execute `instruction`.
    ///
    /// # Errors
    ///
    /// - [`CraftError::Effector`] if no player is present or the effector
    ///   rejects the move.
    /// - [`CraftError::UnknownAction`] for unrecognised verbs under
    ///   [`UnknownActionPolicy::Reject`].
    pub fn dispatch(&self, instruction: &Instruction) -> Result<DispatchOutcome, CraftError> {
        match instruction {
            Instruction::Move {
                direction,
                distance,
                ..
            } => self.move_player(direction, *distance),
            Instruction::Unknown { function } => match self.unknown_actions {
                UnknownActionPolicy::Ignore => Ok(DispatchOutcome::Skipped {
                    function: function.clone(),
                }),
                UnknownActionPolicy::Warn => {
                    warn!(function = %function, "model requested an unknown action; skipping");
                    Ok(DispatchOutcome::Skipped {
                        function: function.clone(),
                    })
                }
                UnknownActionPolicy::Reject => Err(CraftError::UnknownAction(function.clone())),
            },
            other => {
                debug!(function = other.function(), "action is not wired to the effector; skipping");
                Ok(DispatchOutcome::Skipped {
                    function: other.function().to_string(),
                })
            }
        }
    }

    fn move_player(&self, direction: &str, distance: f64) -> Result<DispatchOutcome, CraftError> {
        let pose = self.effector.pose().ok_or_else(|| CraftError::Effector {
            details: "no player to move".to_string(),
        })?;

        let heading = MoveDirection::parse(direction).unwrap_or_else(|| {
            warn!(direction = %direction, "unknown move direction; moving forward instead");
            MoveDirection::Forward
        });

        let step = effective_distance(distance);
        let (dx, dz) = heading_vector(heading, pose.yaw_degrees);
        let target = Vec3::new(
            pose.position.x + dx * step,
            pose.position.y + STEP_UP,
            pose.position.z + dz * step,
        );

        self.effector.move_to(target, step as f32)?;
        info!(
            direction = ?heading,
            distance = step,
            x = target.x,
            y = target.y,
            z = target.z,
            "moved player"
        );
        Ok(DispatchOutcome::Moved {
            target,
            effective_distance: step,
        })
    }
}
