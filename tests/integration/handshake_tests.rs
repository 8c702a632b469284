//! Setup, PSK authentication and hang-up between two live sessions.

use relaylink::config::SessionConfig;
use relaylink::events::Event;
use relaylink::identity::IdentityUuid;
use relaylink::session::state::SessionState;

use crate::mock_link::{Endpoint, pump};

fn config(name: &str, psk: Option<&[u8]>) -> SessionConfig {
    let ident = IdentityUuid::generate(name).expect("short name");
    let cfg = SessionConfig::default().with_identity(ident);
    match psk {
        Some(k) => cfg.with_psk(k).expect("valid psk"),
        None => cfg,
    }
}

fn pair(psk_a: Option<&[u8]>, psk_b: Option<&[u8]>) -> (Endpoint, Endpoint) {
    let mut a = Endpoint::new(1, config("alpha", psk_a));
    let mut b = Endpoint::new(2, config("bravo", psk_b));
    a.session.start(&mut a.link).expect("start a");
    b.session.start(&mut b.link).expect("start b");
    pump(&mut a, &mut b);
    (a, b)
}

#[test]
fn open_setup_reaches_established() {
    let (a, b) = pair(None, None);
    assert_eq!(a.session.state(), SessionState::Established);
    assert_eq!(b.session.state(), SessionState::Established);
    assert_eq!(a.session.peer().map(IdentityUuid::name), Some("bravo"));
    assert_eq!(b.session.peer().map(IdentityUuid::name), Some("alpha"));
    assert!(a.saw(&Event::Established));
    // Identity messages were acknowledged and retired.
    assert!(a.session.outbound().is_empty());
    assert!(b.session.outbound().is_empty());
}

#[test]
fn shared_psk_authenticates_both_sides() {
    let (a, b) = pair(Some(b"shared-key"), Some(b"shared-key"));
    assert_eq!(a.session.state(), SessionState::Established);
    assert_eq!(b.session.state(), SessionState::Established);
    assert_eq!(a.session.prev_state(), SessionState::PendingAuth);
    assert_eq!(a.session.ack_failures(), 0);
}

#[test]
fn mismatched_psk_ends_in_hangup() {
    let (a, b) = pair(Some(b"key-one"), Some(b"key-two"));
    assert_eq!(a.session.state(), SessionState::Hungup);
    assert_eq!(b.session.state(), SessionState::Hungup);
    assert!(!a.saw(&Event::Established));
}

#[test]
fn controlled_hangup_round_trip() {
    let (mut a, mut b) = pair(None, None);
    a.session.hangup(&mut a.link).expect("hangup");
    assert_eq!(a.session.state(), SessionState::PendingHangup);

    pump(&mut a, &mut b);
    assert_eq!(a.session.state(), SessionState::Hungup);
    assert_eq!(b.session.state(), SessionState::Hungup);
    assert!(b.saw(&Event::Hangup));
}

#[test]
fn hangup_on_dead_link_closes_locally() {
    let (mut a, _b) = pair(None, None);
    a.link.connected = false;
    assert!(a.session.hangup(&mut a.link).is_err());
    assert_eq!(a.session.state(), SessionState::Hungup);
}

#[test]
fn lost_identity_is_retransmitted_by_keep_alive() {
    let mut a = Endpoint::new(1, config("alpha", None));
    let mut b = Endpoint::new(2, config("bravo", None));
    a.link.mode = crate::mock_link::LinkMode::Drop;
    a.session.start(&mut a.link).expect("start a");
    b.session.start(&mut b.link).expect("start b");
    pump(&mut a, &mut b);
    assert_eq!(b.session.state(), SessionState::PendingSetup);

    a.link.mode = crate::mock_link::LinkMode::Normal;
    a.session
        .send_keep_alive(&mut a.link, &mut a.bus)
        .expect("keep-alive");
    pump(&mut a, &mut b);
    assert_eq!(b.session.state(), SessionState::Established);
}
