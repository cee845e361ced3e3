//! `craftpilot-hal` – acting on the game.
//!
//! # Modules
//!
//! - [`effector`] – [`Effector`][effector::Effector]: the single
//!   "move the player" capability a host must provide.
//! - [`dispatcher`] – [`ActionDispatcher`][dispatcher::ActionDispatcher]:
//!   clamps and translates a decoded instruction into an effector call.
//! - [`sim`] – [`SimEffector`][sim::SimEffector]: a recording stub for tests
//!   and headless runs.

pub mod dispatcher;
pub mod effector;
pub mod sim;

pub use dispatcher::{ActionDispatcher, DispatchOutcome, UnknownActionPolicy};
pub use effector::Effector;
pub use sim::SimEffector;
