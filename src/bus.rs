//! Kernel event bus seam.
//!
//! Sessions never own the kernel. They subscribe, receive events through
//! `Session::notify`, and raise events back through an [`EventBus`] the
//! caller passes in.
//!
//! [`ChannelBus`] is the in-process implementation: a bounded
//! `embassy-sync` channel that the kernel drains and dispatches.
//!
//! ```text
//! ┌──────────┐ raise  ┌────────────────┐ drain  ┌──────────┐
//! │ Session  │───────▶│ Channel<Kernel │───────▶│  Kernel  │──▶ notify
//! │          │        │ Event, N>      │        │ dispatch │
//! └──────────┘        └────────────────┘        └──────────┘
//! ```

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::events::{KernelEvent, SessionId};

/// Maximum sessions that can be subscribed at once.
pub const MAX_SUBSCRIBERS: usize = 8;

/// Default channel depth.
pub const BUS_DEPTH: usize = 32;

/// Kernel facing side of a session.
pub trait EventBus {
    /// Register a session for broadcast delivery.
    fn subscribe(&mut self, session: SessionId);

    /// Remove a session. Unknown ids are ignored.
    fn unsubscribe(&mut self, session: SessionId);

    /// Queue an event for kernel dispatch.
    fn raise(&mut self, event: KernelEvent);
}

/// Single-threaded bounded bus.
pub struct ChannelBus<const N: usize = BUS_DEPTH> {
    channel: Channel<NoopRawMutex, KernelEvent, N>,
    subscribers: heapless::Vec<SessionId, MAX_SUBSCRIBERS>,
    dropped: u32,
}

impl<const N: usize> ChannelBus<N> {
    pub fn new() -> Self {
        Self {
            channel: Channel::new(),
            subscribers: heapless::Vec::new(),
            dropped: 0,
        }
    }

    /// Take the oldest pending event.
    pub fn pop(&self) -> Option<KernelEvent> {
        self.channel.try_receive().ok()
    }

    /// Hand every pending event to `handler`. Returns how many were drained.
    ///
    /// Events raised from inside `handler` are not seen by this call.
    pub fn drain(&self, mut handler: impl FnMut(KernelEvent)) -> usize {
        let pending = self.channel.len();
        let mut n = 0;
        while n < pending {
            let Some(ev) = self.pop() else { break };
            handler(ev);
            n += 1;
        }
        n
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_subscribed(&self, session: SessionId) -> bool {
        self.subscribers.contains(&session)
    }

    pub fn subscribers(&self) -> &[SessionId] {
        &self.subscribers
    }

    /// Events lost because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<const N: usize> Default for ChannelBus<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventBus for ChannelBus<N> {
    fn subscribe(&mut self, session: SessionId) {
        if self.is_subscribed(session) {
            return;
        }
        if self.subscribers.push(session).is_err() {
            warn!("BUS: subscriber table full, session {session} not registered");
        }
    }

    fn unsubscribe(&mut self, session: SessionId) {
        self.subscribers.retain(|s| *s != session);
    }

    fn raise(&mut self, event: KernelEvent) {
        if let Err(embassy_sync::channel::TrySendError::Full(ev)) = self.channel.try_send(event) {
            self.dropped = self.dropped.saturating_add(1);
            warn!("BUS: channel full, dropped {}", ev.event.code().label());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    #[test]
    fn subscribe_is_idempotent() {
        let mut bus: ChannelBus<4> = ChannelBus::new();
        bus.subscribe(1);
        bus.subscribe(1);
        bus.subscribe(2);
        assert_eq!(bus.subscribers(), &[1, 2]);

        bus.unsubscribe(1);
        bus.unsubscribe(9);
        assert!(!bus.is_subscribed(1));
        assert!(bus.is_subscribed(2));
    }

    #[test]
    fn raise_then_pop_in_order() {
        let mut bus: ChannelBus<4> = ChannelBus::new();
        bus.raise(KernelEvent::broadcast(Event::Sync));
        bus.raise(KernelEvent::from_session(3, Event::Hangup));
        assert_eq!(bus.len(), 2);

        assert_eq!(bus.pop().map(|e| e.event), Some(Event::Sync));
        assert_eq!(bus.pop().map(|e| e.event), Some(Event::Hangup));
        assert!(bus.pop().is_none());
    }

    #[test]
    fn full_channel_counts_drops() {
        let mut bus: ChannelBus<2> = ChannelBus::new();
        for _ in 0..3 {
            bus.raise(KernelEvent::broadcast(Event::Sync));
        }
        assert_eq!(bus.len(), 2);
        assert_eq!(bus.dropped(), 1);
    }

    #[test]
    fn drain_visits_pending_events() {
        let mut bus: ChannelBus<4> = ChannelBus::new();
        bus.raise(KernelEvent::broadcast(Event::Sync));
        bus.raise(KernelEvent::broadcast(Event::DumpDebug));

        let mut seen = Vec::new();
        assert_eq!(bus.drain(|ev| seen.push(ev.event)), 2);
        assert_eq!(seen, vec![Event::Sync, Event::DumpDebug]);
        assert!(bus.is_empty());
    }

    #[test]
    fn subscriber_table_bounded() {
        let mut bus: ChannelBus<1> = ChannelBus::new();
        for id in 0..=MAX_SUBSCRIBERS as u8 {
            bus.subscribe(id);
        }
        assert_eq!(bus.subscribers().len(), MAX_SUBSCRIBERS);
    }
}
