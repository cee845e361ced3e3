//! `craftpilot-perception` – observing the game.
//!
//! # Modules
//!
//! - [`world`] – [`WorldView`][world::WorldView] and
//!   [`PlayerView`][world::PlayerView]: the read-only accessors the host game
//!   exposes to the control loop.
//! - [`sampler`] – [`StateSampler`][sampler::StateSampler]: builds one
//!   deterministic [`Snapshot`][craftpilot_types::Snapshot] per cycle.
//! - [`sim`] – [`SimWorld`][sim::SimWorld]: an in-process world for headless
//!   runs and tests.

pub mod sampler;
pub mod sim;
pub mod world;

pub use sampler::StateSampler;
pub use sim::SimWorld;
pub use world::{EntitySighting, ItemStack, PlayerView, WorldView};
