//! Session authentication: challenge-response with HMAC-SHA256.
//!
//! Runs inside session setup when both endpoints share a PSK:
//!
//! 1. After identities are exchanged, each side sends `AuthChallenge { nonce }`
//! 2. The peer answers `AuthResponse { tag = HMAC-SHA256(psk, nonce) }`
//! 3. The challenger verifies the tag and the session becomes ESTABLISHED
//!
//! Crypto is handled by the `hmac-sha256` crate (pure Rust, no_std,
//! constant-time verification). Nonces come from `rand`'s thread-local CSPRNG.

use log::warn;

/// Nonce and tag size.
pub const NONCE_LEN: usize = 32;

// ── Handshake state ──────────────────────────────────────────

/// Where this endpoint stands in the challenge exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    Challenged { nonce: [u8; NONCE_LEN] },
    Verified,
}

/// Tracks one side of the PSK challenge for a session.
#[derive(Debug, Clone)]
pub struct Authenticator {
    state: AuthState,
    psk: heapless::Vec<u8, { crate::config::MAX_PSK_LEN }>,
}

impl Authenticator {
    pub fn new(psk: &[u8]) -> Option<Self> {
        let mut key = heapless::Vec::new();
        key.extend_from_slice(psk).ok()?;
        Some(Self {
            state: AuthState::Idle,
            psk: key,
        })
    }

    /// Issue a fresh nonce for the peer to sign.
    pub fn begin_challenge(&mut self) -> [u8; NONCE_LEN] {
        let nonce: [u8; NONCE_LEN] = rand::random();
        self.state = AuthState::Challenged { nonce };
        nonce
    }

    /// Sign the peer's nonce.
    pub fn respond(&self, peer_nonce: &[u8; NONCE_LEN]) -> [u8; NONCE_LEN] {
        compute_hmac(&self.psk, peer_nonce)
    }

    /// Verify the peer's tag against the outstanding nonce.
    ///
    /// Transitions to `Verified` on success; resets to `Idle` on failure.
    pub fn verify_response(&mut self, tag: &[u8; NONCE_LEN]) -> bool {
        let AuthState::Challenged { nonce } = &self.state else {
            warn!("auth: response received with no challenge outstanding");
            return false;
        };

        if !hmac_sha256::HMAC::verify(*nonce, &self.psk, tag) {
            warn!("auth: HMAC verification failed");
            self.reset();
            return false;
        }

        self.state = AuthState::Verified;
        true
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_verified(&self) -> bool {
        matches!(self.state, AuthState::Verified)
    }

    pub fn reset(&mut self) {
        self.state = AuthState::Idle;
    }
}

// ── Helpers ──────────────────────────────────────────────────

/// Compute `HMAC-SHA256(psk, nonce)`.
pub fn compute_hmac(psk: &[u8], nonce: &[u8; NONCE_LEN]) -> [u8; NONCE_LEN] {
    hmac_sha256::HMAC::mac(*nonce, psk)
}
