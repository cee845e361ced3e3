//! Recording effector for CI and headless testing.
//!
//! [`SimEffector`] keeps its own pose, applies every move to it, and records
//! the move history so tests can assert on exactly what was commanded.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use craftpilot_hal::dispatcher::ActionDispatcher;
//! use craftpilot_hal::sim::SimEffector;
//! use craftpilot_types::{Instruction, Pose};
//!
//! let effector = Arc::new(SimEffector::new(Pose::default()));
//! let dispatcher = ActionDispatcher::new(effector.clone());
//!
//! dispatcher
//!     .dispatch(&Instruction::Move {
//!         direction: "forward".into(),
//!         distance: 0.2,
//!         jumping: false,
//!     })
//!     .expect("sim move must succeed");
//! assert_eq!(effector.moves().len(), 1);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use craftpilot_types::{CraftError, Pose, Vec3};

use crate::effector::Effector;

#[derive(Debug, Default)]
struct SimEffectorState {
    pose: Option<Pose>,
    moves: Vec<(Vec3, f32)>,
}

/// A simulated effector.  Always succeeds while a player is present.
#[derive(Debug, Default)]
pub struct SimEffector {
    state: Mutex<SimEffectorState>,
}

impl SimEffector {
    /// A player standing at `pose`.
    pub fn new(pose: Pose) -> Self {
        Self {
            state: Mutex::new(SimEffectorState {
                pose: Some(pose),
                moves: Vec::new(),
            }),
        }
    }

    /// No player present; every move fails.
    pub fn detached() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimEffectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every `(target, walk_speed)` commanded so far, oldest first.
    pub fn moves(&self) -> Vec<(Vec3, f32)> {
        self.lock().moves.clone()
    }

    /// The most recent move, if any.
    pub fn last_move(&self) -> Option<(Vec3, f32)> {
        self.lock().moves.last().copied()
    }
}

impl Effector for SimEffector {
    fn pose(&self) -> Option<Pose> {
        self.lock().pose
    }

    fn move_to(&self, target: Vec3, walk_speed: f32) -> Result<(), CraftError> {
        let mut state = self.lock();
        let Some(pose) = state.pose.as_mut() else {
            return Err(CraftError::Effector {
                details: "simulated player is detached".to_string(),
            });
        };
        pose.position = target;
        state.moves.push((target, walk_speed));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_updates_pose_and_history() {
        let eff = SimEffector::new(Pose::default());
        eff.move_to(Vec3::new(1.0, 2.0, 3.0), 4.0).unwrap();
        assert_eq!(eff.pose().unwrap().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(eff.moves(), vec![(Vec3::new(1.0, 2.0, 3.0), 4.0)]);
    }

    #[test]
    fn detached_effector_rejects_moves() {
        let eff = SimEffector::detached();
        assert!(eff.pose().is_none());
        assert!(eff.move_to(Vec3::default(), 1.0).is_err());
        assert!(eff.moves().is_empty());
    }
}
