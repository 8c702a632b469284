//! Mock link and endpoint harness for integration tests.
//!
//! [`MockLink`] records every submission and can be told to drop, reject or
//! truncate. [`Endpoint`] bundles a session with its link and its kernel
//! bus; [`pump`] shuttles bytes between two endpoints until both are quiet.

use relaylink::bus::ChannelBus;
use relaylink::config::SessionConfig;
use relaylink::events::{Event, KernelEvent, SessionId};
use relaylink::link::codec::{Codec, Decoded, FrameCodec};
use relaylink::link::transport::Transport;
use relaylink::session::Session;
use relaylink::session::message::Message;

// ── Link behaviour ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Deliver everything.
    Normal,
    /// Accept submissions but lose them.
    Drop,
    /// Report an error for every submission.
    Reject,
    /// Accept one byte less than submitted.
    Truncate,
}

// ── MockLink ──────────────────────────────────────────────────

pub struct MockLink {
    pub connected: bool,
    pub mode: LinkMode,
    pending: Vec<u8>,
    pub submissions: usize,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            connected: true,
            mode: LinkMode::Normal,
            pending: Vec::new(),
            submissions: 0,
        }
    }

    /// Bytes delivered to the wire since the last call.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_quiet(&self) -> bool {
        self.pending.is_empty()
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockLink {
    type Error = &'static str;

    fn connected(&self) -> bool {
        self.connected
    }

    fn send_buffer(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        self.submissions += 1;
        match self.mode {
            LinkMode::Normal => {
                self.pending.extend_from_slice(data);
                Ok(data.len())
            }
            LinkMode::Drop => Ok(data.len()),
            LinkMode::Reject => Err("link rejected write"),
            LinkMode::Truncate => Ok(data.len().saturating_sub(1)),
        }
    }
}

// ── Endpoint ──────────────────────────────────────────────────

pub struct Endpoint {
    pub session: Session,
    pub link: MockLink,
    pub bus: ChannelBus<64>,
    /// Every event the kernel saw, in dispatch order.
    pub seen: Vec<KernelEvent>,
}

#[allow(dead_code)]
impl Endpoint {
    pub fn new(id: SessionId, config: SessionConfig) -> Self {
        let mut bus = ChannelBus::new();
        let session = Session::new(id, config, &mut bus).expect("valid config");
        Self {
            session,
            link: MockLink::new(),
            bus,
            seen: Vec::new(),
        }
    }

    pub fn deliver(&mut self, bytes: Vec<u8>) -> usize {
        let ev = KernelEvent::to(self.session.id(), Event::Receive(bytes));
        self.session.notify(&ev, &mut self.link, &mut self.bus)
    }

    /// Kernel-side broadcast of `event` to this endpoint's session.
    pub fn broadcast(&mut self, event: Event) -> usize {
        let ev = KernelEvent::broadcast(event);
        self.session.notify(&ev, &mut self.link, &mut self.bus)
    }

    /// Drain the bus, recording and re-dispatching every event.
    pub fn dispatch(&mut self) {
        while let Some(ev) = self.bus.pop() {
            self.session.notify(&ev, &mut self.link, &mut self.bus);
            self.seen.push(ev);
        }
    }

    pub fn saw(&self, event: &Event) -> bool {
        self.seen.iter().any(|e| &e.event == event)
    }
}

/// Shuttle bytes both ways until both links are quiet. Returns rounds run.
pub fn pump(a: &mut Endpoint, b: &mut Endpoint) -> usize {
    let mut rounds = 0;
    while !(a.link.is_quiet() && b.link.is_quiet()) {
        assert!(rounds < 32, "links never went quiet");
        let ab = a.link.take();
        let ba = b.link.take();
        if !ab.is_empty() {
            b.deliver(ab);
        }
        if !ba.is_empty() {
            a.deliver(ba);
        }
        a.dispatch();
        b.dispatch();
        rounds += 1;
    }
    rounds
}

/// Frame a message the way a peer would.
pub fn frame(id: u16, event: Event) -> Vec<u8> {
    let mut out = Vec::new();
    FrameCodec
        .encode(&Message::outbound(id, event), &mut out)
        .expect("encodable");
    out
}

/// Decode every whole frame in `bytes`.
#[allow(dead_code)]
pub fn decode_all(bytes: &[u8]) -> Vec<Message> {
    let mut out = Vec::new();
    let mut rest = bytes;
    while let Decoded::Complete { message, consumed } = FrameCodec.decode(rest) {
        out.push(message);
        rest = &rest[consumed..];
    }
    out
}
