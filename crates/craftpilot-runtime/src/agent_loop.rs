//! [`AgentLoop`] – the tick-driven perceive → infer → act cycle.
//!
//! The host calls [`AgentLoop::on_tick`] from its game thread once per tick.
//! The call never blocks on the network:
//!
//! 1. **Cadence** – [`Cadence`] decides whether this tick may start a cycle.
//! 2. **Gate** – [`SingleFlight::try_acquire`]; if a cycle is already in
//!    flight the tick is skipped.
//! 3. **Perceive** – [`StateSampler`] snapshots the world on the calling
//!    thread, the snapshot is optionally recorded, rendered, and combined
//!    with the previous cycle's context into a prompt.
//! 4. **Infer / parse / act** – spawned onto the tokio runtime: the prompt is
//!    sent to the [`Inference`] back-end, the first fenced YAML block is
//!    extracted and decoded, the block is remembered for the next prompt, and
//!    the instruction is handed to the [`ActionDispatcher`].
//!
//! The [`FlightPermit`] travels with the spawned task, so the gate returns to
//! idle however that task ends.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use craftpilot_hal::SimEffector;
//! use craftpilot_perception::SimWorld;
//! use craftpilot_runtime::agent_loop::{AgentLoop, AgentLoopConfig};
//! use craftpilot_runtime::inference::InferenceClient;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let world = SimWorld::new();
//! let mut agent = AgentLoop::new(
//!     AgentLoopConfig::default(),
//!     Arc::new(InferenceClient::new("http://localhost:5555", "minecraft-ai")),
//!     Arc::new(SimEffector::new(world.pose())),
//!     rt.handle().clone(),
//! );
//! agent.on_tick(&world, &world);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use craftpilot_hal::{ActionDispatcher, DispatchOutcome, Effector, UnknownActionPolicy};
use craftpilot_memory::{PromptHistory, SnapshotRecorder};
use craftpilot_perception::{PlayerView, StateSampler, WorldView};
use craftpilot_types::CraftError;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

use crate::cadence::{Cadence, TICKS_PER_SECOND};
use crate::inference::Inference;
use crate::prompt::{PromptCodec, SnapshotDocument};
use crate::response_parser::{ParseError, decode_block, extract_block};
use crate::single_flight::{CycleState, FlightPermit, SingleFlight};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    /// Maximum ticks a stationary player waits between cycles.
    pub tick_budget: u32,
    /// What to do with a reply naming an unknown action.
    pub unknown_actions: UnknownActionPolicy,
    /// When set, every sampled snapshot is also written to disk.  The write
    /// is synchronous and happens inside [`AgentLoop::on_tick`], on the
    /// caller's thread.
    pub recorder: Option<SnapshotRecorder>,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            tick_budget: TICKS_PER_SECOND,
            unknown_actions: UnknownActionPolicy::default(),
            recorder: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// What a single [`AgentLoop::on_tick`] call did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Cadence says wait.
    NotDue,
    /// A cycle is already in flight.
    Busy,
    /// The snapshot could not be rendered; the gate was released.
    Abandoned(String),
    /// A cycle was spawned.  Dropping `task` detaches it.
    Started {
        cycle_id: Uuid,
        task: JoinHandle<CycleOutcome>,
    },
}

/// How a spawned cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Dispatched(DispatchOutcome),
    InferenceFailed(String),
    ParseFailed(ParseError),
    DispatchFailed(CraftError),
}

impl CycleOutcome {
    /// The failure, if any, as the process-wide error type.
    pub fn error(&self) -> Option<CraftError> {
        match self {
            CycleOutcome::Dispatched(_) => None,
            CycleOutcome::InferenceFailed(msg) => Some(CraftError::Inference(msg.clone())),
            CycleOutcome::ParseFailed(e) => Some(e.clone().into()),
            CycleOutcome::DispatchFailed(e) => Some(e.clone()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────────────────────────────────────

pub struct AgentLoop {
    sampler: StateSampler,
    cadence: Cadence,
    gate: Arc<SingleFlight>,
    history: Arc<Mutex<PromptHistory>>,
    inference: Arc<dyn Inference>,
    dispatcher: Arc<ActionDispatcher>,
    recorder: Option<SnapshotRecorder>,
    runtime: Handle,
}

impl AgentLoop {
    /// Cycles are spawned onto `runtime`; `on_tick` itself may be called from
    /// any thread.
    pub fn new(
        config: AgentLoopConfig,
        inference: Arc<dyn Inference>,
        effector: Arc<dyn Effector>,
        runtime: Handle,
    ) -> Self {
        let dispatcher =
            ActionDispatcher::new(effector).with_unknown_action_policy(config.unknown_actions);
        if let Some(rec) = &config.recorder {
            info!(dir = %rec.dir().display(), format = ?rec.format(), "recording snapshots");
        }
        Self {
            sampler: StateSampler::new(),
            cadence: Cadence::new(config.tick_budget),
            gate: Arc::new(SingleFlight::new()),
            history: Arc::new(Mutex::new(PromptHistory::new())),
            inference,
            dispatcher: Arc::new(dispatcher),
            recorder: config.recorder,
            runtime,
        }
    }

    pub fn cycle_state(&self) -> CycleState {
        self.gate.state()
    }

    /// A copy of the current prompt history.
    pub fn history(&self) -> PromptHistory {
        lock(&self.history).clone()
    }

    /// Advance one game tick.
    pub fn on_tick<W, P>(&mut self, world: &W, player: &P) -> TickOutcome
    where
        W: WorldView + ?Sized,
        P: PlayerView + ?Sized,
    {
        let position = player.position();
        if !self.cadence.tick(position) {
            return TickOutcome::NotDue;
        }
        let Some(permit) = self.gate.try_acquire() else {
            trace!("cycle in flight; tick skipped");
            return TickOutcome::Busy;
        };
        self.cadence.mark_cycle(position);

        let snapshot = self.sampler.sample(world, player);
        let document = SnapshotDocument::from(&snapshot);

        if let Some(recorder) = &self.recorder
            && let Err(e) = recorder.record(&document)
        {
            warn!(error = %CraftError::from(e), "failed to record snapshot");
        }

        let snapshot_text = match PromptCodec::render_document(&document) {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "failed to render snapshot; cycle abandoned");
                return TickOutcome::Abandoned(e.to_string());
            }
        };
        let context = lock(&self.history).begin_cycle(snapshot_text.clone());
        let prompt = PromptCodec::compose(&context, &snapshot_text);

        let cycle_id = Uuid::new_v4();
        debug!(%cycle_id, biome = %snapshot.environment.biome, "starting cycle");
        let task = self.runtime.spawn(run_cycle(
            permit,
            cycle_id,
            prompt,
            Arc::clone(&self.inference),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.history),
        ));
        TickOutcome::Started { cycle_id, task }
    }
}

fn lock(history: &Mutex<PromptHistory>) -> MutexGuard<'_, PromptHistory> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

#[instrument(name = "cycle", skip_all, fields(cycle_id = %cycle_id))]
async fn run_cycle(
    permit: FlightPermit,
    cycle_id: Uuid,
    prompt: String,
    inference: Arc<dyn Inference>,
    dispatcher: Arc<ActionDispatcher>,
    history: Arc<Mutex<PromptHistory>>,
) -> CycleOutcome {
    let _permit = permit;

    info!(prompt_len = prompt.len(), "requesting inference");
    let reply = match inference.infer(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "inference failed; cycle abandoned");
            return CycleOutcome::InferenceFailed(e.to_string());
        }
    };
    debug!(reply_len = reply.len(), "inference returned");

    let block = match extract_block(&reply) {
        Ok(block) => block,
        Err(e) => {
            warn!(error = %e, "no action in reply");
            return CycleOutcome::ParseFailed(e);
        }
    };
    info!(block = %block, "extracted action block");
    let instruction = match decode_block(block) {
        Ok(instruction) => instruction,
        Err(e) => {
            warn!(error = %e, "action block rejected");
            return CycleOutcome::ParseFailed(e);
        }
    };
    debug!(function = instruction.function(), "decoded action");
    lock(&history).record_reply(block);

    match dispatcher.dispatch(&instruction) {
        Ok(outcome) => CycleOutcome::Dispatched(outcome),
        Err(e) => {
            error!(error = %e, "dispatch failed");
            CycleOutcome::DispatchFailed(e)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
