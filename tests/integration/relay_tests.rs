//! Relay filter behaviour across a live link.

use relaylink::config::SessionConfig;
use relaylink::error::{Error, RelayError};
use relaylink::events::{AppEvent, Event, KernelEvent, MsgCode, MsgFlags};
use relaylink::session::message::Message;

use crate::mock_link::{Endpoint, pump};

const TEMP: MsgCode = MsgCode(0x0200);
const HUMIDITY: MsgCode = MsgCode(0x0201);

fn established() -> (Endpoint, Endpoint) {
    let mut a = Endpoint::new(1, SessionConfig::default());
    let mut b = Endpoint::new(2, SessionConfig::default());
    a.session.start(&mut a.link).expect("start a");
    b.session.start(&mut b.link).expect("start b");
    pump(&mut a, &mut b);
    (a, b)
}

fn exported(code: MsgCode, args: &[u8]) -> Event {
    Event::App(
        AppEvent::new(code, MsgFlags::EXPORTABLE | MsgFlags::DEMANDS_ACK)
            .with_args(args)
            .expect("small args"),
    )
}

#[test]
fn tapped_event_crosses_and_is_acknowledged() {
    let (mut a, mut b) = established();
    a.session.tap_message_type(TEMP).expect("tap");

    assert_eq!(a.broadcast(exported(TEMP, b"21.5")), 1);
    assert_eq!(a.session.outbound().len(), 1);

    pump(&mut a, &mut b);
    assert!(b.saw(&exported(TEMP, b"21.5")));
    assert_eq!(b.session.inbound().len(), 1);
    // The ACK retired the sender's copy.
    assert!(a.session.outbound().is_empty());

    let id = b.session.inbound().iter().map(Message::id).next().expect("queued");
    assert_eq!(b.session.complete_inbound(id), 1);
    assert!(b.session.inbound().is_empty());
}

#[test]
fn untapped_event_stays_local() {
    let (mut a, mut b) = established();
    a.session.tap_message_type(TEMP).expect("tap");
    assert_eq!(a.broadcast(exported(HUMIDITY, b"40%")), 0);
    pump(&mut a, &mut b);
    assert!(!b.saw(&exported(HUMIDITY, b"40%")));
}

#[test]
fn relayed_event_is_not_echoed_back() {
    let (mut a, mut b) = established();
    a.session.tap_message_type(TEMP).expect("tap a");
    b.session.tap_message_type(TEMP).expect("tap b");

    a.broadcast(exported(TEMP, b"1"));
    pump(&mut a, &mut b);

    // b re-raised it as its own event, so its relay skipped it.
    let count = a
        .seen
        .iter()
        .filter(|e| e.event == exported(TEMP, b"1"))
        .count();
    assert_eq!(count, 0);
    assert_eq!(b.session.stats().built, 1);
}

#[test]
fn untap_stops_forwarding() {
    let (mut a, _b) = established();
    a.session.tap_message_type(TEMP).expect("tap");
    assert!(a.session.untap_message_type(TEMP));
    assert_eq!(a.broadcast(exported(TEMP, b"x")), 0);

    a.session.tap_message_type(TEMP).expect("tap");
    a.session.tap_message_type(HUMIDITY).expect("tap");
    assert_eq!(a.session.untap_all(), 2);
    assert_eq!(a.broadcast(exported(HUMIDITY, b"x")), 0);
}

#[test]
fn protocol_codes_cannot_be_tapped() {
    let (mut a, _b) = established();
    for code in [
        MsgCode::KEEPALIVE,
        MsgCode::DUMP_DEBUG,
        MsgCode::HANGUP,
        MsgCode::REPLY,
    ] {
        assert_eq!(
            a.session.tap_message_type(code),
            Err(Error::Relay(RelayError::Blacklisted(code)))
        );
    }
    assert!(a.session.relay().is_empty());
}

#[test]
fn event_from_other_session_is_relayed() {
    let (mut a, _b) = established();
    a.session.tap_message_type(TEMP).expect("tap");
    let from_peer_session = KernelEvent::from_session(7, exported(TEMP, b"7"));
    assert_eq!(
        a.session
            .notify(&from_peer_session, &mut a.link, &mut a.bus),
        1
    );
}
