//! Kernel event vocabulary.
//!
//! Events are produced by:
//! - The transport (bytes received, link lost)
//! - The kernel (application events, debug requests)
//! - Sessions themselves (inbound messages re-injected, handshake milestones)
//!
//! Every event the session layer understands is a variant of the closed
//! [`Event`] sum type. Application traffic rides in [`Event::App`] and is
//! opaque to the session beyond its [`MsgCode`] and [`MsgFlags`].
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Transport   │────▶│              │     │              │
//! │ Kernel      │────▶│  Event Bus   │────▶│   Session    │
//! │ Session     │────▶│              │     │  (notify)    │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;
use crate::identity::IdentityUuid;

/// Maximum argument payload carried by an application event.
pub const MAX_APP_ARGS: usize = 128;

/// Identifies one session among those the kernel runs (one per connection).
pub type SessionId = u8;

// ── Message codes ─────────────────────────────────────────────

/// Type tag of an event, used by the relay filter and the debug dump.
///
/// Codes below [`MsgCode::APP_BASE`] are reserved for the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MsgCode(pub u16);

impl MsgCode {
    pub const REPLY: Self = Self(0x0001);
    pub const KEEPALIVE: Self = Self(0x0002);
    pub const SYNC: Self = Self(0x0003);
    pub const CONNECTION_LOST: Self = Self(0x0004);
    pub const TRANSPORT_RECEIVE: Self = Self(0x0005);
    pub const HANGUP: Self = Self(0x0006);
    pub const DUMP_DEBUG: Self = Self(0x0007);
    pub const IDENTITY: Self = Self(0x0008);
    pub const AUTH_CHALLENGE: Self = Self(0x0009);
    pub const AUTH_RESPONSE: Self = Self(0x000A);
    pub const ESTABLISHED: Self = Self(0x000B);

    /// First code available to application events.
    pub const APP_BASE: Self = Self(0x0100);

    /// Protocol-internal codes are never relayed.
    pub const fn is_reserved(self) -> bool {
        self.0 < Self::APP_BASE.0
    }

    /// Human-readable label for logs and the debug dump.
    pub const fn label(self) -> &'static str {
        match self.0 {
            0x0001 => "REPLY",
            0x0002 => "KEEPALIVE",
            0x0003 => "SYNC",
            0x0004 => "CONNECTION_LOST",
            0x0005 => "TRANSPORT_RECEIVE",
            0x0006 => "HANGUP",
            0x0007 => "DUMP_DEBUG",
            0x0008 => "IDENTITY",
            0x0009 => "AUTH_CHALLENGE",
            0x000A => "AUTH_RESPONSE",
            0x000B => "ESTABLISHED",
            c if c < Self::APP_BASE.0 => "<RESERVED>",
            _ => "APP",
        }
    }
}

// ── Flags ─────────────────────────────────────────────────────

/// Per-event delivery flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MsgFlags(pub u8);

impl MsgFlags {
    pub const NONE: Self = Self(0);
    /// The event may leave this endpoint through a session relay.
    pub const EXPORTABLE: Self = Self(0b0000_0001);
    /// The counterparty must acknowledge the message carrying this event.
    pub const DEMANDS_ACK: Self = Self(0b0000_0010);
    /// Keep the outbound message until the kernel marks it complete.
    pub const RETAIN: Self = Self(0b0000_0100);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for MsgFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ── Application events ────────────────────────────────────────

/// An application-level event. The session treats `args` as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEvent {
    pub code: MsgCode,
    pub flags: MsgFlags,
    pub args: heapless::Vec<u8, MAX_APP_ARGS>,
}

impl AppEvent {
    pub fn new(code: MsgCode, flags: MsgFlags) -> Self {
        Self {
            code,
            flags,
            args: heapless::Vec::new(),
        }
    }

    /// Attach an argument payload. Fails if it exceeds [`MAX_APP_ARGS`].
    pub fn with_args(mut self, args: &[u8]) -> Result<Self, CodecError> {
        self.args.clear();
        self.args
            .extend_from_slice(args)
            .map_err(|()| CodecError::Oversize)?;
        Ok(self)
    }
}

// ── Event sum type ────────────────────────────────────────────

/// Every event kind the session layer handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// The transport lost its link.
    ConnectionLost,
    /// Bytes arrived from the transport.
    Receive(Vec<u8>),
    /// Request a debug dump of the session.
    DumpDebug,
    /// Controlled shutdown.
    Hangup,
    /// Acknowledges the message whose id the carrying message reuses.
    Reply,
    /// No-payload ping that demands acknowledgement.
    KeepAlive,
    /// Framing re-alignment marker emitted during resync.
    Sync,
    /// Endpoint identity, exchanged during setup.
    Identity(IdentityUuid),
    /// PSK challenge carrying a fresh nonce.
    AuthChallenge { nonce: [u8; 32] },
    /// HMAC-SHA256 of the peer's nonce under the shared PSK.
    AuthResponse { tag: [u8; 32] },
    /// The session reached ESTABLISHED.
    Established,
    /// Application traffic.
    App(AppEvent),
}

impl Event {
    pub fn code(&self) -> MsgCode {
        match self {
            Self::ConnectionLost => MsgCode::CONNECTION_LOST,
            Self::Receive(_) => MsgCode::TRANSPORT_RECEIVE,
            Self::DumpDebug => MsgCode::DUMP_DEBUG,
            Self::Hangup => MsgCode::HANGUP,
            Self::Reply => MsgCode::REPLY,
            Self::KeepAlive => MsgCode::KEEPALIVE,
            Self::Sync => MsgCode::SYNC,
            Self::Identity(_) => MsgCode::IDENTITY,
            Self::AuthChallenge { .. } => MsgCode::AUTH_CHALLENGE,
            Self::AuthResponse { .. } => MsgCode::AUTH_RESPONSE,
            Self::Established => MsgCode::ESTABLISHED,
            Self::App(app) => app.code,
        }
    }

    /// Delivery flags. Protocol kinds carry fixed flags.
    pub fn flags(&self) -> MsgFlags {
        match self {
            Self::KeepAlive
            | Self::Hangup
            | Self::Identity(_)
            | Self::AuthChallenge { .. }
            | Self::AuthResponse { .. } => MsgFlags::DEMANDS_ACK,
            Self::App(app) => app.flags,
            Self::ConnectionLost
            | Self::Receive(_)
            | Self::DumpDebug
            | Self::Reply
            | Self::Sync
            | Self::Established => MsgFlags::NONE,
        }
    }

    pub fn is_exportable(&self) -> bool {
        self.flags().contains(MsgFlags::EXPORTABLE)
    }

    /// Whether this kind may be serialised for the counterparty.
    pub fn wire_safe(&self) -> bool {
        !matches!(
            self,
            Self::ConnectionLost | Self::Receive(_) | Self::DumpDebug | Self::Established
        )
    }
}

// ── Routed events ─────────────────────────────────────────────

/// Who raised an event onto the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Kernel,
    Session(SessionId),
}

/// An event as dispatched by the kernel.
///
/// `target` addresses link-level events (bytes received, link lost) to one
/// session; `None` means every subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelEvent {
    pub origin: Origin,
    pub target: Option<SessionId>,
    pub event: Event,
}

impl KernelEvent {
    /// Kernel-originated event for every subscriber.
    pub fn broadcast(event: Event) -> Self {
        Self {
            origin: Origin::Kernel,
            target: None,
            event,
        }
    }

    /// Kernel-originated event addressed to one session.
    pub fn to(session: SessionId, event: Event) -> Self {
        Self {
            origin: Origin::Kernel,
            target: Some(session),
            event,
        }
    }

    /// Event raised by a session.
    pub fn from_session(session: SessionId, event: Event) -> Self {
        Self {
            origin: Origin::Session(session),
            target: None,
            event,
        }
    }

    /// Whether link-level handling applies to `session`.
    pub fn addressed_to(&self, session: SessionId) -> bool {
        self.target.is_none_or(|t| t == session)
    }
}
