//! relaylink loopback demo.
//!
//! Two endpoints, each with its own kernel bus, cross-wired through
//! in-memory transports:
//!
//! ```text
//! ┌──────────────────┐   bytes   ┌──────────────────┐
//! │ alpha (session 1)│──────────▶│ bravo (session 2)│
//! │ ChannelBus       │◀──────────│ ChannelBus       │
//! └──────────────────┘           └──────────────────┘
//! ```
//!
//! Runs setup with PSK auth, relays one application event, exchanges a
//! keep-alive, hangs up and prints both dumps.
#![deny(unused_must_use)]

use anyhow::{Result, bail};

use relaylink::bus::{ChannelBus, EventBus};
use relaylink::config::SessionConfig;
use relaylink::events::{AppEvent, Event, KernelEvent, MsgCode, MsgFlags, SessionId};
use relaylink::identity::IdentityUuid;
use relaylink::link::transport::CaptureTransport;
use relaylink::session::message::Message;
use relaylink::session::state::SessionState;
use relaylink::session::{KeepAliveOutcome, Session};

const PSK: &[u8] = b"loopback-psk";
const TEMPERATURE: MsgCode = MsgCode(0x0200);

struct Endpoint {
    name: &'static str,
    session: Session,
    link: CaptureTransport,
    bus: ChannelBus,
}

impl Endpoint {
    fn new(name: &'static str, id: SessionId) -> Result<Self> {
        let Some(identity) = IdentityUuid::generate(name) else {
            bail!("identity name {name:?} rejected");
        };
        let config = SessionConfig::default()
            .with_identity(identity)
            .with_psk(PSK)?;
        let mut bus = ChannelBus::new();
        let session = Session::new(id, config, &mut bus)?;
        Ok(Self {
            name,
            session,
            link: CaptureTransport::connected(),
            bus,
        })
    }

    /// Kernel dispatch: hand every pending bus event back to the session.
    fn dispatch(&mut self) {
        while let Some(ev) = self.bus.pop() {
            println!(
                "[{}] kernel <- {:?} {}",
                self.name,
                ev.origin,
                ev.event.code().label()
            );
            self.session.notify(&ev, &mut self.link, &mut self.bus);
        }
    }

    fn deliver(&mut self, bytes: Vec<u8>) {
        let ev = KernelEvent::to(self.session.id(), Event::Receive(bytes));
        self.session.notify(&ev, &mut self.link, &mut self.bus);
    }
}

/// Shuttle bytes both ways until both links are quiet.
fn pump(a: &mut Endpoint, b: &mut Endpoint) -> usize {
    let mut rounds = 0;
    loop {
        let ab = a.link.take_bytes();
        let ba = b.link.take_bytes();
        if ab.is_empty() && ba.is_empty() {
            return rounds;
        }
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
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut alpha = Endpoint::new("alpha", 1)?;
    let mut bravo = Endpoint::new("bravo", 2)?;

    // ── Setup + auth ─────────────────────────────────────────
    alpha.session.start(&mut alpha.link)?;
    bravo.session.start(&mut bravo.link)?;
    let rounds = pump(&mut alpha, &mut bravo);
    println!("setup finished after {rounds} rounds");
    for ep in [&alpha, &bravo] {
        if ep.session.state() != SessionState::Established {
            bail!("{} stuck in {}", ep.name, ep.session.state());
        }
    }

    // ── Relay ────────────────────────────────────────────────
    bravo.session.tap_message_type(TEMPERATURE)?;
    let reading = AppEvent::new(TEMPERATURE, MsgFlags::EXPORTABLE | MsgFlags::DEMANDS_ACK)
        .with_args(b"21.5C")?;
    bravo.bus.raise(KernelEvent::broadcast(Event::App(reading)));
    bravo.dispatch();
    pump(&mut alpha, &mut bravo);

    let done: Vec<u16> = alpha.session.inbound().iter().map(Message::id).collect();
    for id in done {
        alpha.session.complete_inbound(id);
    }

    // ── Keep-alive ───────────────────────────────────────────
    if let KeepAliveOutcome::Sent(id) =
        alpha.session.send_keep_alive(&mut alpha.link, &mut alpha.bus)?
    {
        println!("[alpha] keep-alive 0x{id:04x}");
    }
    pump(&mut alpha, &mut bravo);

    println!("{}", alpha.session.dump());
    println!("{}", bravo.session.dump());

    // ── Hang-up ──────────────────────────────────────────────
    alpha.session.hangup(&mut alpha.link)?;
    pump(&mut alpha, &mut bravo);
    println!(
        "alpha {} / bravo {}",
        alpha.session.state(),
        bravo.session.state()
    );

    let Endpoint {
        session, mut bus, ..
    } = alpha;
    let stats = session.teardown(&mut bus);
    println!("alpha final: {stats:?}");
    let Endpoint {
        session, mut bus, ..
    } = bravo;
    let stats = session.teardown(&mut bus);
    println!("bravo final: {stats:?}");
    Ok(())
}
