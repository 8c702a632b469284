//! Session: the protocol endpoint for one transport connection.
//!
//! [`Session`] owns the queue pair, relay filter, failure counters and the
//! receive accumulation buffer. It never owns the transport or the kernel:
//! both are passed in at each call site, so the whole state machine runs
//! against mocks in tests.
//!
//! ```text
//!  Kernel ──notify──▶ ┌──────────────────────────────┐ ──send_buffer──▶ Transport
//!                     │           Session            │
//!  EventBus ◀─raise── │ relay · queues · counters    │ ◀──Receive────── Transport
//!                     └──────────────────────────────┘
//! ```
//!
//! Everything runs synchronously inside `notify`/`send_event`/
//! `send_keep_alive`; nothing here blocks or polls.

pub mod dump;
pub mod message;
pub mod queue;
pub mod relay;
pub mod resync;
pub mod state;

use log::{debug, info, warn};

use crate::bus::EventBus;
use crate::config::SessionConfig;
use crate::error::{CodecError, Error, QueueError, Result, TransportError};
use crate::events::{Event, KernelEvent, MsgCode, Origin, SessionId};
use crate::identity::IdentityUuid;
use crate::link::auth::Authenticator;
use crate::link::codec::{Codec, Decoded, FrameCodec};
use crate::link::transport::Transport;

use self::message::{Message, ProcState};
use self::queue::{MessageQueue, QUEUE_DEPTH};
use self::relay::RelayFilter;
use self::resync::{FailureCounter, ResyncCause, ResyncStrategy, SyncBurst};
use self::state::SessionState;

/// Capacity of the receive accumulation buffer.
pub const RX_BUFFER_CAP: usize = 1024;

// ───────────────────────────────────────────────────────────────
// Supporting types
// ───────────────────────────────────────────────────────────────

/// The single inbound message under reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Working {
    #[default]
    Idle,
    /// Bytes are buffered but do not yet form a frame. `declared` is the
    /// payload length once the header has arrived.
    Parsing {
        declared: Option<usize>,
        buffered: usize,
    },
}

/// Result of [`Session::send_keep_alive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepAliveOutcome {
    /// A keep-alive was submitted with this id.
    Sent(u16),
    /// The transport is down; nothing was sent.
    NotConnected,
}

/// Lifetime counters, shown in the debug dump.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub built: u32,
    pub retired: u32,
    pub purged: u32,
    pub received: u32,
    pub duplicates: u32,
    pub parse_failures: u32,
    pub ack_failures: u32,
    pub bytes_in: u32,
    pub bytes_out: u32,
}

// ───────────────────────────────────────────────────────────────
// Session
// ───────────────────────────────────────────────────────────────

pub struct Session<C: Codec = FrameCodec, R: ResyncStrategy = SyncBurst> {
    id: SessionId,
    config: SessionConfig,
    state: SessionState,
    prev_state: SessionState,
    codec: C,
    resync: R,
    parse_failures: FailureCounter,
    ack_failures: FailureCounter,
    relay: RelayFilter,
    outbound: MessageQueue,
    inbound: MessageQueue,
    working: Working,
    rx: heapless::Vec<u8, RX_BUFFER_CAP>,
    next_id: u16,
    auth: Option<Authenticator>,
    peer: Option<IdentityUuid>,
    resync_count: u32,
    stats: SessionStats,
}

impl Session {
    /// Create a session with the default codec and resync strategy and
    /// subscribe it to `bus`.
    pub fn new(id: SessionId, config: SessionConfig, bus: &mut impl EventBus) -> Result<Self> {
        let burst = SyncBurst(config.sync_burst);
        Self::with_parts(id, config, FrameCodec, burst, bus)
    }
}

impl<C: Codec, R: ResyncStrategy> Session<C, R> {
    pub fn with_parts(
        id: SessionId,
        config: SessionConfig,
        codec: C,
        resync: R,
        bus: &mut impl EventBus,
    ) -> Result<Self> {
        config.validate()?;
        let auth = match &config.psk {
            Some(psk) => Some(Authenticator::new(psk).ok_or(Error::Config("psk too long"))?),
            None => None,
        };

        bus.subscribe(id);
        debug!("SESS[{}]: created", id);

        Ok(Self {
            id,
            parse_failures: FailureCounter::new(config.max_parse_failures),
            ack_failures: FailureCounter::new(config.max_ack_failures),
            config,
            state: SessionState::Uninitialized,
            prev_state: SessionState::Uninitialized,
            codec,
            resync,
            relay: RelayFilter::new(),
            outbound: MessageQueue::new(),
            inbound: MessageQueue::new(),
            working: Working::Idle,
            rx: heapless::Vec::new(),
            next_id: 0,
            auth,
            peer: None,
            resync_count: 0,
            stats: SessionStats::default(),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────

    /// Begin setup: announce this endpoint's identity.
    pub fn start(&mut self, link: &mut impl Transport) -> Result<u16> {
        if self.state != SessionState::Uninitialized {
            return Err(Error::State(self.state));
        }
        if !link.connected() {
            return Err(TransportError::NotConnected.into());
        }
        self.set_state(SessionState::PendingSetup);
        let ident = self.config.identity.clone();
        self.send_event(Event::Identity(ident), link)
    }

    /// Controlled shutdown: send Hangup and wait for the peer's Reply.
    ///
    /// If the Hangup cannot be submitted the session goes straight to
    /// HUNGUP.
    pub fn hangup(&mut self, link: &mut impl Transport) -> Result<u16> {
        if self.state.is_terminal() || self.state == SessionState::PendingHangup {
            return Err(Error::State(self.state));
        }
        self.set_state(SessionState::PendingHangup);
        match self.send_event(Event::Hangup, link) {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!("SESS[{}]: hangup not submitted: {}", self.id, e);
                self.set_state(SessionState::Hungup);
                Err(e)
            }
        }
    }

    /// Destroy the session: purge both queues, leave the bus and raise an
    /// unsolicited Hangup. Returns the final statistics.
    pub fn teardown(mut self, bus: &mut impl EventBus) -> SessionStats {
        let out = self.purge_outbound();
        let inb = self.purge_inbound();
        bus.unsubscribe(self.id);
        bus.raise(KernelEvent::from_session(self.id, Event::Hangup));
        info!(
            "SESS[{}]: torn down in {} (purged {} out, {} in)",
            self.id,
            self.state.label(),
            out,
            inb
        );
        self.stats
    }

    // ── Kernel entry point ───────────────────────────────────

    /// Handle one kernel event. Returns the number of actions taken
    /// (0 = ignored).
    pub fn notify(
        &mut self,
        ev: &KernelEvent,
        link: &mut impl Transport,
        bus: &mut impl EventBus,
    ) -> usize {
        let mut actions = 0;
        let for_us = ev.origin == Origin::Kernel && ev.addressed_to(self.id);

        match &ev.event {
            Event::ConnectionLost if for_us => {
                self.on_connection_lost();
                actions += 1;
            }
            Event::Hangup if for_us => {
                let out = self.purge_outbound();
                let inb = self.purge_inbound();
                info!(
                    "SESS[{}]: hangup notice, purged {} out, {} in",
                    self.id, out, inb
                );
                actions += 1;
            }
            Event::Receive(bytes) if for_us => {
                actions += self.receive(bytes, link, bus);
            }
            Event::DumpDebug if for_us => {
                info!("{}", self.dump());
                actions += 1;
            }
            _ => {}
        }

        // Relay
        if ev.origin != Origin::Session(self.id)
            && ev.event.is_exportable()
            && self.relay.contains(ev.event.code())
        {
            match self.send_event(ev.event.clone(), link) {
                Ok(_) => actions += 1,
                Err(e) => warn!(
                    "SESS[{}]: relay of {} failed: {}",
                    self.id,
                    ev.event.code().label(),
                    e
                ),
            }
        }

        actions
    }

    // ── Outbound ─────────────────────────────────────────────

    /// Wrap `event` in a new outbound message, serialise it and submit it.
    ///
    /// Success means the transport accepted the bytes, not that the peer
    /// got them. Returns the message id.
    pub fn send_event(&mut self, event: Event, link: &mut impl Transport) -> Result<u16> {
        if !event.wire_safe() {
            return Err(CodecError::NotWireSafe.into());
        }
        if self.state.is_terminal() {
            return Err(Error::State(self.state));
        }

        let id = self.alloc_id();
        let mut msg = Message::outbound(id, event);
        if (msg.expects_ack() || msg.wants_reap()) && self.outbound.is_full() {
            warn!("SESS[{}]: outbound queue full", self.id);
            return Err(QueueError::Full.into());
        }

        self.stats.built = self.stats.built.wrapping_add(1);
        self.transmit(&msg, link)?;
        msg.mark_sent();
        debug!("SESS[{}]: sent {}", self.id, msg);

        match msg.state() {
            ProcState::AwaitingReply | ProcState::AwaitingReap => self.outbound.insert(msg)?,
            _ => {
                msg.retire();
                self.stats.retired = self.stats.retired.wrapping_add(1);
            }
        }
        Ok(id)
    }

    /// Ping the peer. Also audits unanswered outbound messages.
    ///
    /// No-op (and not an error) when the transport is down.
    pub fn send_keep_alive(
        &mut self,
        link: &mut impl Transport,
        bus: &mut impl EventBus,
    ) -> Result<KeepAliveOutcome> {
        if !link.connected() {
            debug!("SESS[{}]: keep-alive skipped, not connected", self.id);
            return Ok(KeepAliveOutcome::NotConnected);
        }
        self.audit_outbound(link, bus);
        let id = self.send_event(Event::KeepAlive, link)?;
        Ok(KeepAliveOutcome::Sent(id))
    }

    /// Retire an outbound message held for the kernel. Only entries in
    /// AWAITING_REAP are removed. Returns 1 if removed, 0 otherwise.
    pub fn mark_message_complete(&mut self, id: u16) -> usize {
        let ready = self
            .outbound
            .get(id)
            .is_some_and(|m| m.state() == ProcState::AwaitingReap);
        if !ready {
            return 0;
        }
        match self.outbound.remove(id) {
            Some(mut m) => {
                m.retire();
                self.stats.retired = self.stats.retired.wrapping_add(1);
                debug!("SESS[{}]: reaped 0x{:04x}", self.id, id);
                1
            }
            None => 0,
        }
    }

    // ── Inbound ──────────────────────────────────────────────

    /// Retire an inbound message the kernel has finished processing.
    pub fn complete_inbound(&mut self, id: u16) -> usize {
        match self.inbound.remove(id) {
            Some(_) => {
                self.stats.retired = self.stats.retired.wrapping_add(1);
                1
            }
            None => 0,
        }
    }

    /// Append received bytes and parse every complete frame. Returns the
    /// number of messages taken.
    fn receive(
        &mut self,
        bytes: &[u8],
        link: &mut impl Transport,
        bus: &mut impl EventBus,
    ) -> usize {
        self.stats.bytes_in = self.stats.bytes_in.wrapping_add(bytes.len() as u32);
        let mut taken = 0;
        let mut rest = bytes;

        while !rest.is_empty() {
            let space = RX_BUFFER_CAP - self.rx.len();
            if space == 0 {
                warn!("SESS[{}]: rx buffer overflow", self.id);
                self.rx.clear();
                self.working = Working::Idle;
                self.parse_failure(link, bus);
                continue;
            }
            let n = space.min(rest.len());
            // Fits: n <= space.
            let _ = self.rx.extend_from_slice(&rest[..n]);
            rest = &rest[n..];
            taken += self.parse_buffer(link, bus);
        }
        taken
    }

    fn parse_buffer(&mut self, link: &mut impl Transport, bus: &mut impl EventBus) -> usize {
        let mut taken = 0;
        while !self.rx.is_empty() {
            match self.codec.decode(&self.rx) {
                Decoded::Complete { message, consumed } => {
                    self.consume_rx(consumed);
                    self.working = Working::Idle;
                    self.parse_failures.reset();
                    self.stats.received = self.stats.received.wrapping_add(1);
                    self.take_message(message, link, bus);
                    taken += 1;
                }
                Decoded::Incomplete { declared } => {
                    self.working = Working::Parsing {
                        declared,
                        buffered: self.rx.len(),
                    };
                    return taken;
                }
                Decoded::Malformed { discard } => {
                    self.consume_rx(discard);
                    self.working = Working::Idle;
                    self.parse_failure(link, bus);
                }
            }
        }
        self.working = Working::Idle;
        taken
    }

    fn consume_rx(&mut self, n: usize) {
        let len = self.rx.len();
        let n = n.min(len);
        self.rx.copy_within(n.., 0);
        self.rx.truncate(len - n);
    }

    /// Dispatch one complete inbound message.
    fn take_message(&mut self, msg: Message, link: &mut impl Transport, bus: &mut impl EventBus) {
        let id = msg.id();
        debug!("SESS[{}]: took {}", self.id, msg);

        match msg.event() {
            Event::Reply => {
                self.on_reply(id, link, bus);
                return;
            }
            Event::KeepAlive => {
                self.acknowledge(id, link);
                return;
            }
            Event::Sync => {
                debug!("SESS[{}]: peer sync", self.id);
                return;
            }
            _ => {}
        }

        if msg.expects_ack() && self.inbound.contains(id) {
            debug!("SESS[{}]: duplicate 0x{:04x}, re-acknowledging", self.id, id);
            self.stats.duplicates = self.stats.duplicates.wrapping_add(1);
            self.acknowledge(id, link);
            return;
        }

        match msg.event() {
            Event::Identity(peer) => {
                let peer = peer.clone();
                self.acknowledge(id, link);
                self.on_peer_identity(peer, link, bus);
            }
            Event::AuthChallenge { nonce } => {
                let nonce = *nonce;
                self.acknowledge(id, link);
                self.on_auth_challenge(&nonce, link);
            }
            Event::AuthResponse { tag } => {
                let tag = *tag;
                self.acknowledge(id, link);
                self.on_auth_response(&tag, link, bus);
            }
            Event::Hangup => {
                self.acknowledge(id, link);
                info!("SESS[{}]: peer hung up", self.id);
                self.set_state(SessionState::Hungup);
                bus.raise(KernelEvent::from_session(self.id, Event::Hangup));
            }
            _ => {}
        }
        if msg.event().code().is_reserved() {
            if let Event::App(app) = msg.event() {
                warn!(
                    "SESS[{}]: app event with reserved code 0x{:04x} dropped",
                    self.id, app.code.0
                );
                if msg.expects_ack() {
                    self.acknowledge(id, link);
                }
            }
            return;
        }

        if !msg.expects_ack() {
            bus.raise(KernelEvent::from_session(self.id, msg.into_event()));
            return;
        }
        let event = msg.event().clone();
        if let Err(e) = self.inbound.insert(msg) {
            // No ACK: the peer retransmits on its next audit.
            warn!("SESS[{}]: inbound 0x{:04x} dropped: {}", self.id, id, e);
            return;
        }
        self.acknowledge(id, link);
        bus.raise(KernelEvent::from_session(self.id, event));
    }

    fn on_reply(&mut self, id: u16, link: &mut impl Transport, bus: &mut impl EventBus) {
        let state = self.outbound.get(id).map(Message::state);
        match state {
            Some(ProcState::AwaitingReply) => {
                self.ack_failures.reset();
                if let Some(m) = self.outbound.get_mut(id).filter(|m| m.wants_reap()) {
                    m.await_reap();
                    debug!("SESS[{}]: 0x{:04x} acked, awaiting reap", self.id, id);
                    return;
                }
                let Some(mut m) = self.outbound.remove(id) else {
                    return;
                };
                m.retire();
                self.stats.retired = self.stats.retired.wrapping_add(1);
                if matches!(m.event(), Event::Hangup) && self.state == SessionState::PendingHangup
                {
                    self.set_state(SessionState::Hungup);
                }
            }
            Some(other) => {
                debug!(
                    "SESS[{}]: reply for 0x{:04x} in {}, ignored",
                    self.id,
                    id,
                    other.label()
                );
            }
            None => {
                warn!("SESS[{}]: reply for unknown id 0x{:04x}", self.id, id);
                self.ack_failure(link, bus);
            }
        }
    }

    // ── Handshake ────────────────────────────────────────────

    fn on_peer_identity(
        &mut self,
        peer: IdentityUuid,
        link: &mut impl Transport,
        bus: &mut impl EventBus,
    ) {
        info!("SESS[{}]: peer identity {}", self.id, peer);
        self.peer = Some(peer);
        if self.state != SessionState::PendingSetup {
            return;
        }

        let Some(auth) = self.auth.as_mut() else {
            self.establish(bus);
            return;
        };
        let nonce = auth.begin_challenge();
        self.set_state(SessionState::PendingAuth);
        if let Err(e) = self.send_event(Event::AuthChallenge { nonce }, link) {
            warn!("SESS[{}]: challenge not sent: {}", self.id, e);
        }
    }

    fn on_auth_challenge(&mut self, nonce: &[u8; 32], link: &mut impl Transport) {
        let Some(auth) = self.auth.as_ref() else {
            warn!("SESS[{}]: challenge received but no psk configured", self.id);
            return;
        };
        let tag = auth.respond(nonce);
        if let Err(e) = self.send_event(Event::AuthResponse { tag }, link) {
            warn!("SESS[{}]: auth response not sent: {}", self.id, e);
        }
    }

    fn on_auth_response(
        &mut self,
        tag: &[u8; 32],
        link: &mut impl Transport,
        bus: &mut impl EventBus,
    ) {
        if self.state != SessionState::PendingAuth {
            warn!(
                "SESS[{}]: auth response in {}, ignored",
                self.id,
                self.state.label()
            );
            return;
        }
        let Some(auth) = self.auth.as_mut() else {
            return;
        };
        if auth.verify_response(tag) {
            info!("SESS[{}]: peer authenticated", self.id);
            self.establish(bus);
        } else {
            warn!("SESS[{}]: peer failed authentication", self.id);
            let _ = self.hangup(link);
        }
    }

    fn establish(&mut self, bus: &mut impl EventBus) {
        self.set_state(SessionState::Established);
        bus.raise(KernelEvent::from_session(self.id, Event::Established));
    }

    // ── Failures & resync ────────────────────────────────────

    fn parse_failure(&mut self, link: &mut impl Transport, bus: &mut impl EventBus) {
        self.stats.parse_failures = self.stats.parse_failures.wrapping_add(1);
        let tripped = self.parse_failures.record_failure();
        warn!(
            "SESS[{}]: parse failure {}/{}",
            self.id,
            self.parse_failures.count(),
            self.parse_failures.threshold()
        );
        if tripped {
            self.resync(ResyncCause::ParseFailures, link, bus);
        }
    }

    fn ack_failure(&mut self, link: &mut impl Transport, bus: &mut impl EventBus) {
        self.stats.ack_failures = self.stats.ack_failures.wrapping_add(1);
        let tripped = self.ack_failures.record_failure();
        warn!(
            "SESS[{}]: ack failure {}/{}",
            self.id,
            self.ack_failures.count(),
            self.ack_failures.threshold()
        );
        if tripped {
            self.resync(ResyncCause::AckFailures, link, bus);
        }
    }

    /// Sweep outbound entries awaiting a Reply. Unanswered keep-alives and
    /// entries past `max_retries` are retired as ACK failures; the rest are
    /// retransmitted.
    fn audit_outbound(&mut self, link: &mut impl Transport, bus: &mut impl EventBus) {
        let max_retries = self.config.max_retries;
        let mut expired: heapless::Vec<u16, QUEUE_DEPTH> = heapless::Vec::new();
        let mut resend: heapless::Vec<u16, QUEUE_DEPTH> = heapless::Vec::new();

        for m in self
            .outbound
            .iter_mut()
            .filter(|m| m.state() == ProcState::AwaitingReply)
        {
            let give_up = matches!(m.event(), Event::KeepAlive) || m.bump_retry() > max_retries;
            // Both lists are as deep as the queue.
            let _ = if give_up {
                expired.push(m.id())
            } else {
                resend.push(m.id())
            };
        }

        for id in resend {
            if let Some(m) = self.outbound.get(id) {
                match submit(&mut self.codec, link, m) {
                    Ok(n) => {
                        self.stats.bytes_out = self.stats.bytes_out.wrapping_add(n as u32);
                        debug!("SESS[{}]: retransmit {}", self.id, m);
                    }
                    Err(e) => warn!("SESS[{}]: retransmit 0x{:04x} failed: {}", self.id, id, e),
                }
            }
        }

        for id in expired {
            let Some(mut m) = self.outbound.remove(id) else {
                continue;
            };
            m.retire();
            self.stats.retired = self.stats.retired.wrapping_add(1);
            if matches!(m.event(), Event::Hangup) && self.state == SessionState::PendingHangup {
                self.set_state(SessionState::Hungup);
            }
            self.ack_failure(link, bus);
        }
    }

    /// Flush receive state and in-doubt messages, then let the strategy
    /// signal the peer.
    pub fn request_resync(&mut self, link: &mut impl Transport, bus: &mut impl EventBus) {
        self.resync(ResyncCause::Requested, link, bus);
    }

    fn resync(&mut self, cause: ResyncCause, link: &mut impl Transport, bus: &mut impl EventBus) {
        self.rx.clear();
        self.working = Working::Idle;
        let inb = self.inbound.purge();
        let out = self.outbound.remove_in_state(ProcState::AwaitingReply);
        self.stats.purged = self.stats.purged.wrapping_add((inb + out) as u32);

        match cause {
            ResyncCause::ParseFailures => self.parse_failures.reset(),
            ResyncCause::AckFailures => self.ack_failures.reset(),
            ResyncCause::Requested => {
                self.parse_failures.reset();
                self.ack_failures.reset();
            }
        }
        self.resync_count = self.resync_count.wrapping_add(1);

        let burst = self.resync.on_resync(cause);
        info!(
            "SESS[{}]: resync ({}), dropped {} out, {} in, sending {} sync",
            self.id,
            cause.label(),
            out,
            inb,
            burst
        );
        for _ in 0..burst {
            if let Err(e) = self.send_event(Event::Sync, link) {
                debug!("SESS[{}]: sync not sent: {}", self.id, e);
                break;
            }
        }
        bus.raise(KernelEvent::from_session(self.id, Event::Sync));
    }

    // ── Queues ───────────────────────────────────────────────

    /// Drop every outbound message. Returns how many were dropped.
    pub fn purge_outbound(&mut self) -> usize {
        let n = self.outbound.purge();
        self.stats.purged = self.stats.purged.wrapping_add(n as u32);
        n
    }

    /// Drop every inbound message and the partial receive state.
    pub fn purge_inbound(&mut self) -> usize {
        let n = self.inbound.purge();
        self.rx.clear();
        self.working = Working::Idle;
        self.stats.purged = self.stats.purged.wrapping_add(n as u32);
        n
    }

    fn on_connection_lost(&mut self) {
        self.set_state(SessionState::Disconnected);
        let out = self.purge_outbound();
        let inb = self.purge_inbound();
        if let Some(auth) = self.auth.as_mut() {
            auth.reset();
        }
        info!(
            "SESS[{}]: connection lost, discarded {} out, {} in",
            self.id, out, inb
        );
    }

    // ── Relay filter ─────────────────────────────────────────

    /// Forward `code` to the peer. Fails without change for reserved codes.
    pub fn tap_message_type(&mut self, code: MsgCode) -> Result<()> {
        if let Err(e) = self.relay.tap(code) {
            warn!("SESS[{}]: tap 0x{:04x} refused: {}", self.id, code.0, e);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn untap_message_type(&mut self, code: MsgCode) -> bool {
        self.relay.untap(code)
    }

    pub fn untap_all(&mut self) -> usize {
        self.relay.untap_all()
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn prev_state(&self) -> SessionState {
        self.prev_state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn parse_failures(&self) -> u8 {
        self.parse_failures.count()
    }

    pub fn ack_failures(&self) -> u8 {
        self.ack_failures.count()
    }

    pub fn resync_count(&self) -> u32 {
        self.resync_count
    }

    pub fn outbound(&self) -> &MessageQueue {
        &self.outbound
    }

    pub fn inbound(&self) -> &MessageQueue {
        &self.inbound
    }

    pub fn relay(&self) -> &RelayFilter {
        &self.relay
    }

    pub fn working(&self) -> Working {
        self.working
    }

    pub fn rx_buffered(&self) -> &[u8] {
        &self.rx
    }

    pub fn peer(&self) -> Option<&IdentityUuid> {
        self.peer.as_ref()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    // ── Internals ────────────────────────────────────────────

    fn set_state(&mut self, next: SessionState) {
        if next == self.state {
            return;
        }
        info!(
            "SESS[{}]: {} -> {}",
            self.id,
            self.state.label(),
            next.label()
        );
        self.prev_state = self.state;
        self.state = next;
    }

    /// Next id: wrapping, never 0, never one already queued outbound.
    fn alloc_id(&mut self) -> u16 {
        loop {
            self.next_id = self.next_id.wrapping_add(1);
            if self.next_id != 0 && !self.outbound.contains(self.next_id) {
                return self.next_id;
            }
        }
    }

    fn transmit(&mut self, msg: &Message, link: &mut impl Transport) -> Result<()> {
        let n = submit(&mut self.codec, link, msg)?;
        self.stats.bytes_out = self.stats.bytes_out.wrapping_add(n as u32);
        Ok(())
    }

    /// Send a Reply for inbound `id`. Not queued.
    fn acknowledge(&mut self, id: u16, link: &mut impl Transport) {
        let reply = Message::reply_to(id);
        if let Err(e) = self.transmit(&reply, link) {
            warn!("SESS[{}]: ack 0x{:04x} not sent: {}", self.id, id, e);
        }
    }
}

/// Encode `msg` and hand the bytes to the transport in one submission.
fn submit<C: Codec>(codec: &mut C, link: &mut impl Transport, msg: &Message) -> Result<usize> {
    if !link.connected() {
        return Err(TransportError::NotConnected.into());
    }
    let mut buf = Vec::new();
    codec.encode(msg, &mut buf)?;
    let n = link.send_buffer(&buf).map_err(|e| {
        warn!("transport rejected {} bytes: {:?}", buf.len(), e);
        TransportError::SubmitFailed
    })?;
    if n != buf.len() {
        return Err(TransportError::ShortWrite.into());
    }
    Ok(n)
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
