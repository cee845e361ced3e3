//! Rolling prompt history.
//!
//! The model sees a two-turn context every cycle: the snapshot rendered on the
//! previous cycle, followed by the structured block it answered with, and then
//! the fresh snapshot.  [`PromptHistory`] holds only those most-recent values;
//! it is overwritten, never accumulated.
//!
//! ```rust
//! use craftpilot_memory::history::PromptHistory;
//!
//! let mut history = PromptHistory::new();
//! assert_eq!(history.begin_cycle("snapshot-1\n".into()), "");
//! history.record_reply("action:\n  function: move");
//!
//! let context = history.begin_cycle("snapshot-2\n".into());
//! assert_eq!(context, "snapshot-1\naction:\n  function: move\n\n");
//! ```

/// Most recent rendered snapshot plus the model's most recent reply block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptHistory {
    previous_snapshot: String,
    last_reply: Option<String>,
}

impl PromptHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text to place between the system preamble and the new snapshot.
    pub fn context(&self) -> String {
        match &self.last_reply {
            Some(reply) => format!("{}{}\n\n", self.previous_snapshot, reply),
            None => self.previous_snapshot.clone(),
        }
    }

    /// Start a new cycle with `snapshot_text`.
    ///
    /// Returns the context accumulated by the previous cycle and replaces it
    /// with the new snapshot.  Any reply recorded for the previous cycle is
    /// dropped.
    pub fn begin_cycle(&mut self, snapshot_text: String) -> String {
        let context = self.context();
        self.previous_snapshot = snapshot_text;
        self.last_reply = None;
        context
    }

    /// Attach the model's extracted reply block to the current cycle.
    /// A second call within the same cycle replaces the first.
    pub fn record_reply(&mut self, block: &str) {
        self.last_reply = Some(block.to_string());
    }

    pub fn previous_snapshot(&self) -> &str {
        &self.previous_snapshot
    }

    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_history_is_empty() {
        let h = PromptHistory::new();
        assert_eq!(h.context(), "");
        assert!(h.last_reply().is_none());
    }

    #[test]
    fn begin_cycle_overwrites_rather_than_accumulates() {
        let mut h = PromptHistory::new();
        h.begin_cycle("a\n".into());
        h.begin_cycle("b\n".into());
        let ctx = h.begin_cycle("c\n".into());
        assert_eq!(ctx, "b\n");
        assert_eq!(h.previous_snapshot(), "c\n");
    }

    #[test]
    fn reply_is_appended_once_then_dropped() {
        let mut h = PromptHistory::new();
        h.begin_cycle("a\n".into());
        h.record_reply("reply");
        assert_eq!(h.context(), "a\nreply\n\n");

        let ctx = h.begin_cycle("b\n".into());
        assert_eq!(ctx, "a\nreply\n\n");
        assert_eq!(h.context(), "b\n");
    }

    #[test]
    fn later_reply_replaces_earlier_one() {
        let mut h = PromptHistory::new();
        h.begin_cycle("a\n".into());
        h.record_reply("first");
        h.record_reply("second");
        assert_eq!(h.last_reply(), Some("second"));
    }
}
