//! Session configuration parameters
//!
//! All tunable parameters for one protocol session.
//! Values can be persisted with postcard or carried as JSON by provisioning.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::IdentityUuid;

/// Maximum pre-shared key length.
pub const MAX_PSK_LEN: usize = 32;

/// Core session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    // --- Failure thresholds ---
    /// Consecutive parse failures tolerated before a resync
    pub max_parse_failures: u8,
    /// Consecutive ACK failures tolerated before a resync
    pub max_ack_failures: u8,
    /// Keep-alive sweeps an unacknowledged message survives before it is retired
    pub max_retries: u8,

    // --- Resync ---
    /// Sync frames emitted by the default resync strategy
    pub sync_burst: u8,

    // --- Introspection ---
    /// Queue entries shown per queue in the debug dump
    pub max_queue_print: usize,

    // --- Handshake ---
    /// Identity announced during setup
    pub identity: IdentityUuid,
    /// Shared key; when present the session authenticates before ESTABLISHED
    pub psk: Option<heapless::Vec<u8, MAX_PSK_LEN>>,
}

impl SessionConfig {
    /// Set the pre-shared key. Fails if it is empty or longer than [`MAX_PSK_LEN`].
    pub fn with_psk(mut self, psk: &[u8]) -> Result<Self> {
        if psk.is_empty() {
            return Err(Error::Config("psk must not be empty"));
        }
        let mut key = heapless::Vec::new();
        key.extend_from_slice(psk)
            .map_err(|()| Error::Config("psk too long"))?;
        self.psk = Some(key);
        Ok(self)
    }

    pub fn with_identity(mut self, identity: IdentityUuid) -> Self {
        self.identity = identity;
        self
    }

    /// Reject configurations that would disable recovery.
    pub fn validate(&self) -> Result<()> {
        if self.max_parse_failures == 0 {
            return Err(Error::Config("max_parse_failures must be non-zero"));
        }
        if self.max_ack_failures == 0 {
            return Err(Error::Config("max_ack_failures must be non-zero"));
        }
        if self.sync_burst == 0 {
            return Err(Error::Config("sync_burst must be non-zero"));
        }
        if self.psk.as_ref().is_some_and(|k| k.is_empty()) {
            return Err(Error::Config("psk must not be empty"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // Thresholds
            max_parse_failures: 3,
            max_ack_failures: 3,
            max_retries: 3,

            // Resync
            sync_burst: 4,

            // Introspection
            max_queue_print: 3,

            // Handshake
            identity: IdentityUuid::default(),
            psk: None,
        }
    }
}
