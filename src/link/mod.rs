//! Wire-facing side of the session layer.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Link Stack                           │
//! │                                                            │
//! │  ┌───────────┐   ┌───────────┐   ┌──────────────────────┐  │
//! │  │ Transport │──▶│   Codec   │──▶│ Session (take_message│  │
//! │  │ (trait)   │   │ (framing) │   │  / ACK reconcile)    │  │
//! │  └───────────┘   └───────────┘   └──────────────────────┘  │
//! │       ▲                                    │               │
//! │       │              ┌─────────────────────┘               │
//! │       │              ▼                                     │
//! │  ┌───────────┐   ┌───────────┐                             │
//! │  │ Transport │◀──│   Codec   │   (send_event / keep-alive) │
//! │  │ (submit)  │   │ (encode)  │                             │
//! │  └───────────┘   └───────────┘                             │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod codec;
pub mod transport;
