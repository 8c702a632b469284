//! Fuzz target: `Session::notify` with `Event::Receive`
//!
//! Splits the input into chunks and delivers them as receive events.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - The parse failure counter is always below its threshold afterwards
//! - The receive buffer stays within capacity
//!
//! cargo fuzz run fuzz_session_receive

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaylink::bus::ChannelBus;
use relaylink::config::SessionConfig;
use relaylink::events::{Event, KernelEvent};
use relaylink::link::transport::CaptureTransport;
use relaylink::session::{RX_BUFFER_CAP, Session};

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, body)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let mut bus: ChannelBus<128> = ChannelBus::new();
    let Ok(mut session) = Session::new(1, SessionConfig::default(), &mut bus) else {
        return;
    };
    let mut link = CaptureTransport::connected();

    for part in body.chunks(chunk) {
        let ev = KernelEvent::to(1, Event::Receive(part.to_vec()));
        session.notify(&ev, &mut link, &mut bus);

        assert!(session.parse_failures() < session.config().max_parse_failures);
        assert!(session.rx_buffered().len() <= RX_BUFFER_CAP);
        while bus.pop().is_some() {}
        link.take_bytes();
    }
});
