//! Session lifecycle states.
//!
//! ```text
//! UNINITIALIZED ─start─▶ PENDING_SETUP ─peer Identity─┬─▶ ESTABLISHED
//!                                                     └─▶ PENDING_AUTH ─verified─▶ ESTABLISHED
//!
//! ESTABLISHED ─hangup─▶ PENDING_HANGUP ─Reply─▶ HUNGUP
//! any ─peer Hangup─▶ HUNGUP          any ─ConnectionLost─▶ DISCONNECTED
//! ```

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    PendingSetup,
    PendingAuth,
    Established,
    PendingHangup,
    Hungup,
    Disconnected,
}

impl SessionState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::PendingSetup => "PENDING_SETUP",
            Self::PendingAuth => "PENDING_AUTH",
            Self::Established => "ESTABLISHED",
            Self::PendingHangup => "PENDING_HANGUP",
            Self::Hungup => "HUNGUP",
            Self::Disconnected => "DISCONNECTED",
        }
    }

    /// No further traffic is expected in this state.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Hungup | Self::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
