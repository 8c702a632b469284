//! A single protocol unit: one event plus its delivery metadata.
//!
//! Outbound lifecycle:
//! ```text
//! BUILT ──▶ SENT ──┬──▶ AWAITING_REPLY ──┬──────────────────────▶ RETIRED
//!                  │                     │   (Reply matched)
//!                  │                     └──▶ AWAITING_REAP ──▶ RETIRED
//!                  │                          (Reply matched, retained)
//!                  ├──▶ AWAITING_REAP  ──▶ RETIRED   (kernel marks complete)
//!                  └──────────────────────▶ RETIRED  (no ACK, no retain)
//! ```
//!
//! A retained message that also demands an ACK is reclaimed only after
//! both the Reply and the kernel's completion signal.
//!
//! Inbound messages are created already COMPLETE by the codec; the partial
//! stage lives in the session's reconstruction tracker.

use core::fmt;

use crate::events::{Event, MsgFlags};

/// Which way a message travels. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Processing state of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcState {
    Built,
    Sent,
    AwaitingReply,
    AwaitingReap,
    Complete,
    Retired,
}

impl ProcState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Built => "BUILT",
            Self::Sent => "SENT",
            Self::AwaitingReply => "AWAITING_REPLY",
            Self::AwaitingReap => "AWAITING_REAP",
            Self::Complete => "COMPLETE",
            Self::Retired => "RETIRED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: u16,
    direction: Direction,
    event: Event,
    expects_ack: bool,
    state: ProcState,
    retries: u8,
}

impl Message {
    /// Wrap an event for transmission. ACK expectation follows the event flags.
    pub fn outbound(id: u16, event: Event) -> Self {
        let expects_ack = event.flags().contains(MsgFlags::DEMANDS_ACK);
        Self {
            id,
            direction: Direction::Outbound,
            event,
            expects_ack,
            state: ProcState::Built,
            retries: 0,
        }
    }

    /// Acknowledgement for the message `id`. Reuses the acknowledged id.
    pub fn reply_to(id: u16) -> Self {
        Self::outbound(id, Event::Reply)
    }

    /// A fully parsed inbound message.
    pub fn inbound(id: u16, event: Event, expects_ack: bool) -> Self {
        Self {
            id,
            direction: Direction::Inbound,
            event,
            expects_ack,
            state: ProcState::Complete,
            retries: 0,
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn into_event(self) -> Event {
        self.event
    }

    pub fn expects_ack(&self) -> bool {
        self.expects_ack
    }

    pub fn state(&self) -> ProcState {
        self.state
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    /// Outbound message held for the kernel's completion signal.
    pub fn wants_reap(&self) -> bool {
        self.event.flags().contains(MsgFlags::RETAIN)
    }

    /// Record a successful transport submission and pick the waiting state.
    pub(crate) fn mark_sent(&mut self) {
        self.state = ProcState::Sent;
        if self.expects_ack {
            self.state = ProcState::AwaitingReply;
        } else if self.wants_reap() {
            self.state = ProcState::AwaitingReap;
        }
    }

    /// The Reply arrived; a retained message now waits for the kernel.
    pub(crate) fn await_reap(&mut self) {
        self.state = ProcState::AwaitingReap;
    }

    pub(crate) fn retire(&mut self) {
        self.state = ProcState::Retired;
    }

    /// Count one more unanswered audit; returns the new total.
    pub(crate) fn bump_retry(&mut self) -> u8 {
        self.retries = self.retries.saturating_add(1);
        self.retries
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: ProcState) {
        self.state = state;
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Outbound => "OUT",
            Direction::Inbound => "IN ",
        };
        write!(
            f,
            "[0x{:04x}] {} {:<16} ack={} state={} retries={}",
            self.id,
            dir,
            self.event.code().label(),
            if self.expects_ack { "yes" } else { "no" },
            self.state.label(),
            self.retries,
        )
    }
}
