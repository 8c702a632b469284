//! Failure counters, resync and link-loss handling with a misbehaving link.

use relaylink::config::SessionConfig;
use relaylink::error::{Error, TransportError};
use relaylink::events::{Event, KernelEvent};
use relaylink::link::codec::encode_raw_frame;
use relaylink::session::state::SessionState;
use relaylink::session::{KeepAliveOutcome, Working};

use crate::mock_link::{Endpoint, LinkMode, decode_all, frame, pump};

#[test]
fn truncated_write_is_reported_and_not_queued() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    a.link.mode = LinkMode::Truncate;
    assert_eq!(
        a.session.send_event(Event::KeepAlive, &mut a.link),
        Err(Error::Transport(TransportError::ShortWrite))
    );
    assert!(a.session.outbound().is_empty());
}

#[test]
fn rejected_write_is_reported() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    a.link.mode = LinkMode::Reject;
    assert_eq!(
        a.session.send_event(Event::KeepAlive, &mut a.link),
        Err(Error::Transport(TransportError::SubmitFailed))
    );
}

#[test]
fn keep_alive_on_down_link_submits_nothing() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    a.link.connected = false;
    assert_eq!(
        a.session.send_keep_alive(&mut a.link, &mut a.bus),
        Ok(KeepAliveOutcome::NotConnected)
    );
    assert_eq!(a.link.submissions, 0);
}

#[test]
fn garbage_then_valid_traffic_recovers() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    let garbage = encode_raw_frame(&[0xFF, 0xFF, 0xFF, 0xFF]).expect("frame");

    for _ in 0..3 {
        a.deliver(garbage.clone());
    }
    assert_eq!(a.session.resync_count(), 1);
    a.dispatch();
    assert!(a.saw(&Event::Sync));

    let syncs = decode_all(&a.link.take());
    assert_eq!(syncs.len(), a.session.config().sync_burst as usize);

    a.deliver(frame(10, Event::KeepAlive));
    assert_eq!(a.session.parse_failures(), 0);
    assert_eq!(a.session.resync_count(), 1);
}

#[test]
fn impossible_length_header_discards_buffer() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    a.deliver(vec![0xFF, 0xFF, 0xFF, 0x7F, 1, 2, 3]);
    assert_eq!(a.session.parse_failures(), 1);
    assert!(a.session.rx_buffered().is_empty());
    assert_eq!(a.session.working(), Working::Idle);
}

#[test]
fn byte_at_a_time_delivery_reassembles() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    let bytes = frame(3, Event::Hangup);
    for b in &bytes {
        a.deliver(vec![*b]);
    }
    assert_eq!(a.session.state(), SessionState::Hungup);
    assert_eq!(a.session.parse_failures(), 0);
}

#[test]
fn connection_lost_mid_session_discards_everything() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    let mut b = Endpoint::new(2, SessionConfig::default());
    a.session.start(&mut a.link).expect("start a");
    b.session.start(&mut b.link).expect("start b");
    pump(&mut a, &mut b);

    a.link.mode = LinkMode::Drop;
    for _ in 0..3 {
        a.session
            .send_event(Event::KeepAlive, &mut a.link)
            .expect("submitted");
    }
    a.deliver(frame(
        90,
        Event::App(relaylink::events::AppEvent::new(
            relaylink::events::MsgCode(0x0300),
            relaylink::events::MsgFlags::DEMANDS_ACK,
        )),
    ));
    a.deliver(vec![0x40, 0, 0]);
    assert_eq!(a.session.outbound().len(), 3);
    assert_eq!(a.session.inbound().len(), 1);

    a.link.connected = false;
    a.session.notify(
        &KernelEvent::to(1, Event::ConnectionLost),
        &mut a.link,
        &mut a.bus,
    );
    assert_eq!(a.session.state(), SessionState::Disconnected);
    assert!(a.session.outbound().is_empty());
    assert!(a.session.inbound().is_empty());
    assert!(a.session.rx_buffered().is_empty());

    // Nothing more can be sent on a dead session.
    assert!(a.session.send_event(Event::KeepAlive, &mut a.link).is_err());
}

#[test]
fn dump_request_is_side_effect_free() {
    let mut a = Endpoint::new(1, SessionConfig::default());
    let before = a.session.stats();
    assert_eq!(a.broadcast(Event::DumpDebug), 1);
    assert_eq!(a.session.stats(), before);
    assert!(a.link.is_quiet());
}
