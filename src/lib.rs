//! relaylink: session/message protocol layer.
//!
//! Multiplexes one byte-oriented transport into a typed, acknowledged,
//! event-carrying channel between a device and its counterparty. The
//! transport and the kernel's event bus are ports; everything in here is
//! pure logic and runs on the host.

#![deny(unused_must_use)]

pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod identity;
pub mod link;
pub mod session;
