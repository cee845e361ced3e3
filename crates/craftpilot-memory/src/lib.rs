//! `craftpilot-memory` – what the loop remembers between cycles.
//!
//! # Modules
//!
//! - [`history`] – [`PromptHistory`][history::PromptHistory]: the previous
//!   snapshot and the model's last reply, prepended to the next prompt.
//! - [`recorder`] – [`SnapshotRecorder`][recorder::SnapshotRecorder]: writes
//!   each sampled snapshot to a timestamped JSON or YAML file.

pub mod history;
pub mod recorder;

pub use history::PromptHistory;
pub use recorder::{RecordFormat, RecorderError, SnapshotRecorder};
