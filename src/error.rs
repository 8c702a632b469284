//! Unified error types for the session layer.
//!
//! One `Error` enum that every subsystem converts into, so the kernel-facing
//! API has a single failure type. All variants are `Copy` so they can be
//! handed back through `notify` bookkeeping without allocation.

use core::fmt;

use crate::events::MsgCode;
use crate::session::state::SessionState;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible session operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A message could not be serialised.
    Codec(CodecError),
    /// The transport refused or truncated a submission.
    Transport(TransportError),
    /// A message queue rejected an insert.
    Queue(QueueError),
    /// The relay filter rejected a tap.
    Relay(RelayError),
    /// Configuration is invalid.
    Config(&'static str),
    /// The operation is not valid in the current lifecycle state.
    State(SessionState),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Codec(e) => write!(f, "codec: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Queue(e) => write!(f, "queue: {e}"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::State(s) => write!(f, "not valid in state {}", s.label()),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Codec errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Encoded message exceeds the maximum frame size.
    Oversize,
    /// The serialiser failed.
    Encode,
    /// The event kind is local to this endpoint and never crosses the wire.
    NotWireSafe,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversize => write!(f, "frame too large"),
            Self::Encode => write!(f, "encode failed"),
            Self::NotWireSafe => write!(f, "event kind is not wire-safe"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The transport reports no live connection.
    NotConnected,
    /// The transport returned an error for the submission.
    SubmitFailed,
    /// Fewer bytes were accepted than were submitted.
    ShortWrite,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::SubmitFailed => write!(f, "submission failed"),
            Self::ShortWrite => write!(f, "short write"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Queue errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity.
    Full,
    /// A message with this id is already queued.
    DuplicateId(u16),
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "queue full"),
            Self::DuplicateId(id) => write!(f, "duplicate message id {id}"),
        }
    }
}

impl std::error::Error for QueueError {}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Self::Queue(e)
    }
}

// ---------------------------------------------------------------------------
// Relay filter errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The code is protocol-internal and can never be relayed.
    Blacklisted(MsgCode),
    /// The relay set is at capacity.
    Full,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blacklisted(code) => write!(f, "code 0x{:04x} is blacklisted", code.0),
            Self::Full => write!(f, "relay set full"),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
