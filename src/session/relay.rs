//! Relay filter: which kernel event codes a session forwards to its peer.

use crate::error::RelayError;
use crate::events::MsgCode;

/// Maximum tapped codes per session.
pub const MAX_RELAY_CODES: usize = 32;

/// Set of tapped message codes. Protocol-reserved codes are blacklisted.
#[derive(Debug, Default, Clone)]
pub struct RelayFilter {
    codes: heapless::Vec<MsgCode, MAX_RELAY_CODES>,
}

impl RelayFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes that can never be tapped.
    pub fn is_blacklisted(code: MsgCode) -> bool {
        code.is_reserved()
    }

    /// Add `code`. Idempotent. A blacklisted code leaves the set untouched.
    pub fn tap(&mut self, code: MsgCode) -> Result<(), RelayError> {
        if Self::is_blacklisted(code) {
            return Err(RelayError::Blacklisted(code));
        }
        if self.contains(code) {
            return Ok(());
        }
        self.codes.push(code).map_err(|_| RelayError::Full)
    }

    /// Remove `code`. Returns whether it was present.
    pub fn untap(&mut self, code: MsgCode) -> bool {
        let before = self.codes.len();
        self.codes.retain(|c| *c != code);
        self.codes.len() != before
    }

    /// Remove everything. Returns how many codes were tapped.
    pub fn untap_all(&mut self) -> usize {
        let n = self.codes.len();
        self.codes.clear();
        n
    }

    pub fn contains(&self, code: MsgCode) -> bool {
        self.codes.contains(&code)
    }

    pub fn iter(&self) -> impl Iterator<Item = MsgCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
