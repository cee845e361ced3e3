//! `craftpilot-runtime` – the control loop that lets a language model play.
//!
//! Every game tick the host hands the loop read-only views of the world and
//! the player.  On the ticks [`Cadence`][cadence::Cadence] allows, and only
//! when no other cycle is in flight, the loop snapshots the world, asks a
//! local model what the player should do next, and carries out the answer.
//!
//! # Modules
//!
//! - [`agent_loop`] – [`AgentLoop`][agent_loop::AgentLoop]: per-tick entry
//!   point; spawns one cycle at a time onto a tokio runtime.
//! - [`cadence`] – [`Cadence`][cadence::Cadence]: movement / tick-budget
//!   eligibility.
//! - [`single_flight`] – [`SingleFlight`][single_flight::SingleFlight]: the
//!   atomic Idle/Busy gate and its RAII permit.
//! - [`prompt`] – [`PromptCodec`][prompt::PromptCodec]: snapshot → YAML text
//!   and prompt assembly.
//! - [`inference`] – [`InferenceClient`][inference::InferenceClient]: HTTP
//!   client for an Ollama-style `/api/generate` endpoint, behind the
//!   [`Inference`][inference::Inference] trait.
//! - [`response_parser`] – pulls the first fenced YAML block out of a reply
//!   and decodes it into an [`Instruction`][craftpilot_types::Instruction].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: console or
//!   JSON logs plus optional OTLP span export.

pub mod agent_loop;
pub mod cadence;
pub mod inference;
pub mod prompt;
pub mod response_parser;
pub mod single_flight;
pub mod telemetry;

pub use agent_loop::{AgentLoop, AgentLoopConfig, CycleOutcome, TickOutcome};
pub use cadence::{Cadence, TICKS_PER_SECOND};
pub use inference::{Inference, InferenceClient, InferenceError, ModelTag};
pub use prompt::{PromptCodec, PromptError, SYSTEM_PREAMBLE, SnapshotDocument};
pub use response_parser::{ParseError, decode_block, extract_block, parse};
pub use single_flight::{CycleState, FlightPermit, SingleFlight};
pub use telemetry::{TracerProviderGuard, init_tracing};
