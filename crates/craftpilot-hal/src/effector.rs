//! The single capability the control loop drives.
//!
//! Hosts implement [`Effector`] over whatever moves the player (a client-side
//! entity, a bot connection, a simulator).  The rest of the loop only ever
//! talks to the trait.

use craftpilot_types::{CraftError, Pose, Vec3};

/// Something that can relocate the controlled player.
///
/// Calls arrive from the inference completion thread, so implementations
/// must be shareable across threads.
pub trait Effector: Send + Sync {
    /// Current pose, or `None` while no player is present (e.g. between
    /// worlds).
    fn pose(&self) -> Option<Pose>;

    /// Teleport the player to absolute `target` coordinates.
    ///
    /// `walk_speed` is a cosmetic hint for the walk animation.  No collision
    /// checking is performed.
    ///
    /// # Errors
    ///
    /// Returns [`CraftError::Effector`] if the host rejects the move.
    fn move_to(&self, target: Vec3, walk_speed: f32) -> Result<(), CraftError>;
}
