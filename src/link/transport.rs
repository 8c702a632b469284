//! Transport abstraction for any byte-oriented channel.
//!
//! Concrete implementations live outside this crate:
//! - UART serial / USB CDC
//! - Bluetooth SPP or a GATT characteristic (write + notify)
//! - TCP socket
//!
//! The session never opens or closes the channel. Inbound bytes and link
//! loss reach it as [`Event::Receive`](crate::events::Event::Receive) and
//! [`Event::ConnectionLost`](crate::events::Event::ConnectionLost).

/// Byte-oriented transport channel, as seen by a session.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Whether a counterparty is currently reachable.
    fn connected(&self) -> bool;

    /// Submit `data` for transmission.
    /// Returns the number of bytes accepted.
    fn send_buffer(&mut self, data: &[u8]) -> Result<usize, Self::Error>;
}

/// A null transport that is never connected and discards all writes.
/// Useful as a default when no counterparty is attached.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = ();

    fn connected(&self) -> bool {
        false
    }

    fn send_buffer(&mut self, data: &[u8]) -> Result<usize, ()> {
        Ok(data.len())
    }
}

/// In-memory transport that records every submission.
///
/// Used to cross-wire two sessions on the host: drain one side's bytes with
/// [`take_bytes`](Self::take_bytes) and deliver them to the other as a
/// receive event.
#[derive(Debug, Default)]
pub struct CaptureTransport {
    connected: bool,
    submissions: Vec<Vec<u8>>,
    reject: bool,
}

impl CaptureTransport {
    /// A connected capture transport.
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make every following submission fail.
    pub fn set_reject(&mut self, reject: bool) {
        self.reject = reject;
    }

    /// Submissions recorded so far, one entry per `send_buffer` call.
    pub fn submissions(&self) -> &[Vec<u8>] {
        &self.submissions
    }

    /// Drain all recorded submissions as one contiguous byte stream.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        self.submissions.drain(..).flatten().collect()
    }
}

impl Transport for CaptureTransport {
    type Error = ();

    fn connected(&self) -> bool {
        self.connected
    }

    fn send_buffer(&mut self, data: &[u8]) -> Result<usize, ()> {
        if self.reject {
            return Err(());
        }
        self.submissions.push(data.to_vec());
        Ok(data.len())
    }
}
