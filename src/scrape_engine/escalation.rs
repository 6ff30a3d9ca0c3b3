//! One-way fetch-mode escalation.
//!
//! A small explicit state machine: two states, one transition. The run
//! starts lightweight; the first blocked classification switches it to
//! rendered fetching for the remainder of the run. There is no reverse
//! transition, because a lifted block is not reliably observable.

use log::info;

use crate::transport::FetchMode;

/// Escalation state for one run. Mutated only through `record_blocked`.
#[derive(Debug, Clone, Copy)]
pub struct EscalationState {
    mode: FetchMode,
    consecutive_blocks: u32,
}

impl EscalationState {
    /// Fresh state: lightweight fetching, no blocks seen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mode: FetchMode::Lightweight,
            consecutive_blocks: 0,
        }
    }

    /// The mode the next fetch should use.
    #[must_use]
    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    #[must_use]
    pub fn consecutive_blocks(&self) -> u32 {
        self.consecutive_blocks
    }

    /// Register a blocked classification. Escalates on the first block;
    /// retrying lightweight against an active challenge is presumed futile.
    ///
    /// Returns true if this call switched the mode.
    pub fn record_blocked(&mut self) -> bool {
        self.consecutive_blocks += 1;
        if self.mode == FetchMode::Lightweight {
            self.mode = FetchMode::Rendered;
            info!(
                "Blocking detected, escalating to rendered fetching for the rest of the run"
            );
            return true;
        }
        false
    }

    /// Register a usable (non-blocked) fetch.
    pub fn record_clear(&mut self) {
        self.consecutive_blocks = 0;
    }
}

impl Default for EscalationState {
    fn default() -> Self {
        Self::new()
    }
}
