//! Consecutive-failure accounting and the resync hook.

/// Consecutive failure counter with a trip threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureCounter {
    count: u8,
    threshold: u8,
}

impl FailureCounter {
    pub fn new(threshold: u8) -> Self {
        Self {
            count: 0,
            threshold,
        }
    }

    /// Count one failure. Returns `true` when the threshold is reached;
    /// the caller resyncs and resets.
    pub fn record_failure(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.count >= self.threshold
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }
}

/// Which counter tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncCause {
    ParseFailures,
    AckFailures,
    /// Requested by the kernel through `Session::request_resync`.
    Requested,
}

impl ResyncCause {
    pub const fn label(self) -> &'static str {
        match self {
            Self::ParseFailures => "parse failures",
            Self::AckFailures => "ack failures",
            Self::Requested => "requested",
        }
    }
}

/// Decides how many Sync frames to put on the wire after the session has
/// flushed its receive state.
pub trait ResyncStrategy {
    fn on_resync(&mut self, cause: ResyncCause) -> u8;
}

/// Emit a fixed burst of Sync frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncBurst(pub u8);

impl ResyncStrategy for SyncBurst {
    fn on_resync(&mut self, _cause: ResyncCause) -> u8 {
        self.0
    }
}

impl Default for SyncBurst {
    fn default() -> Self {
        Self(4)
    }
}
