//! [`PromptCodec`] – deterministic text rendering of a [`Snapshot`].
//!
//! A snapshot is rendered as a block-style YAML document with four top-level
//! keys in fixed order: `environment`, `player`, `nearby_entities`,
//! `map_blocks`.  Coordinates use two decimal places.  The document shape
//! matches the recorded gameplay the model was fine-tuned on, so the wording
//! of individual values (`Slot 0: … x12`, `… north of player`) is part of the
//! contract.
//!
//! A full prompt is the fixed [`SYSTEM_PREAMBLE`], then the previous cycle's
//! context (see [`PromptHistory`][craftpilot_memory::PromptHistory]), then the
//! new snapshot document.

use craftpilot_types::{Environment, Snapshot, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instruction placed at the head of every prompt.
pub const SYSTEM_PREAMBLE: &str = "Act as an expert Minecraft player who can understand a player's \
actions by viewing the game state at the time the action was given. I will provide you with the \
game state and the action taken in YAML form, and you will tell me why a player may have taken the \
given action using your knowledge of Minecraft and the game state, be highly detailed and provide \
your reasoning step by step for the sample data below. Always include in your response a yml block \
with your next predicted action.\n\n";

/// Errors that can arise while rendering a snapshot.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("YAML encoding failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// ─────────────────────────────────────────────────────────────────────────────
// Document shape
// ─────────────────────────────────────────────────────────────────────────────

/// The serialisable form of a [`Snapshot`].  Field order is the key order of
/// the rendered text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub environment: Environment,
    pub player: PlayerDocument,
    pub nearby_entities: Vec<EntityDocument>,
    pub map_blocks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDocument {
    pub position: String,
    pub orientation: String,
    pub health: f64,
    pub hunger: i32,
    pub inventory: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(rename = "type")]
    pub kind: String,
    pub position: String,
}

/// Two decimal places, with negative zero folded into `0.00`.
fn fixed2(v: f64) -> String {
    let s = format!("{v:.2}");
    if s == "-0.00" { "0.00".to_string() } else { s }
}

fn xyz(v: Vec3) -> String {
    format!("x={}, y={}, z={}", fixed2(v.x), fixed2(v.y), fixed2(v.z))
}

impl From<&Snapshot> for SnapshotDocument {
    fn from(s: &Snapshot) -> Self {
        let p = &s.player_state;
        Self {
            environment: s.environment.clone(),
            player: PlayerDocument {
                position: xyz(p.position),
                orientation: xyz(p.orientation),
                health: p.health,
                hunger: p.hunger,
                inventory: p
                    .inventory
                    .iter()
                    .map(|i| format!("Slot {}: {} x{}", i.slot, i.item_id, i.count))
                    .collect(),
            },
            nearby_entities: s
                .nearby_entities
                .iter()
                .map(|e| EntityDocument {
                    kind: e.kind.clone(),
                    position: format!(
                        "dx={}, dy={}, dz={}",
                        e.relative_offset.dx, e.relative_offset.dy, e.relative_offset.dz
                    ),
                })
                .collect(),
            map_blocks: s
                .surrounding_blocks
                .iter()
                .map(|b| format!("{} {} of player", b.block_id, b.direction.word()))
                .collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PromptCodec
// ─────────────────────────────────────────────────────────────────────────────

/// Stateless renderer for snapshots and prompts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptCodec;

impl PromptCodec {
    /// Render `snapshot` on its own, without preamble or history.
    pub fn render_snapshot(snapshot: &Snapshot) -> Result<String, PromptError> {
        Self::render_document(&SnapshotDocument::from(snapshot))
    }

    /// Render an already-converted document.
    pub fn render_document(document: &SnapshotDocument) -> Result<String, PromptError> {
        Ok(serde_yaml::to_string(document)?)
    }

    /// Join preamble, history and snapshot text without reordering.
    pub fn compose(history: &str, snapshot_text: &str) -> String {
        let mut prompt =
            String::with_capacity(SYSTEM_PREAMBLE.len() + history.len() + snapshot_text.len());
        prompt.push_str(SYSTEM_PREAMBLE);
        prompt.push_str(history);
        prompt.push_str(snapshot_text);
        prompt
    }

    /// Full prompt for `snapshot` given the previous cycle's `history`.
    pub fn render(snapshot: &Snapshot, history: &str) -> Result<String, PromptError> {
        Ok(Self::compose(history, &Self::render_snapshot(snapshot)?))
    }
}
