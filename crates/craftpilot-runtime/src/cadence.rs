//! [`Cadence`] – decides which ticks may start an inference cycle.
//!
//! A tick is *due* when any of these holds:
//!
//! - no cycle has started yet;
//! - the player's position differs from the position recorded when the last
//!   cycle started;
//! - at least `budget` ticks have elapsed since the last cycle started.
//!
//! The tick counter keeps running while a cycle is in flight, so a stationary
//! player gets a new cycle on the first due tick after the gate frees up.
//!
//! ```rust
//! use craftpilot_runtime::cadence::Cadence;
//! use craftpilot_types::Vec3;
//!
//! let here = Vec3::new(0.5, 64.0, 0.5);
//! let mut cadence = Cadence::new(20);
//! assert!(cadence.tick(here));
//! cadence.mark_cycle(here);
//!
//! let quiet = (0..19).filter(|_| cadence.tick(here)).count();
//! assert_eq!(quiet, 0);
//! assert!(cadence.tick(here));
//! ```

use craftpilot_types::Vec3;

/// Game ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

#[derive(Debug, Clone)]
pub struct Cadence {
    budget: u32,
    last_position: Option<Vec3>,
    ticks_since_cycle: u32,
}

impl Default for Cadence {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}

impl Cadence {
    /// `budget` is the maximum number of ticks a stationary player waits.
    pub fn new(budget: u32) -> Self {
        Self {
            budget,
            last_position: None,
            ticks_since_cycle: 0,
        }
    }

    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Count one tick and report whether a cycle is due at `position`.
    pub fn tick(&mut self, position: Vec3) -> bool {
        self.ticks_since_cycle = self.ticks_since_cycle.saturating_add(1);
        match self.last_position {
            None => true,
            Some(last) => last != position || self.ticks_since_cycle >= self.budget,
        }
    }

    /// Record that a cycle started with the player at `position`.
    pub fn mark_cycle(&mut self, position: Vec3) {
        self.last_position = Some(position);
        self.ticks_since_cycle = 0;
    }
}
