//! Endpoint identity exchanged during session setup.
//!
//! Wire form:
//! ```text
//! ┌────────────┬────────────┬──────────┬──────────────┬──────────────┐
//! │ Length (2B)│ Flags (2B) │ Format   │ Name + NUL   │ UUID (16B)   │
//! │ BE u16     │ BE u16     │ (1B)     │ (N+1 B)      │              │
//! └────────────┴────────────┴──────────┴──────────────┴──────────────┘
//! ```
//!
//! `Length` covers the whole record, header included.

use core::fmt;

use serde::{Deserialize, Serialize};

/// UUID body size.
pub const UUID_LEN: usize = 16;

/// Longest accepted identity name (excluding the NUL terminator).
pub const MAX_NAME_LEN: usize = 32;

/// Length + flags + format.
const HEADER_LEN: usize = 5;

/// Identity record formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IdentFormat {
    Uuid = 1,
}

impl IdentFormat {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::Uuid),
            _ => None,
        }
    }
}

/// A named UUID identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUuid {
    name: heapless::String<MAX_NAME_LEN>,
    flags: u16,
    uuid: [u8; UUID_LEN],
}

impl IdentityUuid {
    /// Build an identity. Returns `None` if `name` is too long or contains NUL.
    pub fn new(name: &str, uuid: [u8; UUID_LEN]) -> Option<Self> {
        if name.contains('\0') {
            return None;
        }
        let mut n = heapless::String::new();
        n.push_str(name).ok()?;
        Some(Self {
            name: n,
            flags: 0,
            uuid,
        })
    }

    /// Build an identity with a random (version 4) UUID.
    pub fn generate(name: &str) -> Option<Self> {
        Self::new(name, uuid::Uuid::new_v4().into_bytes())
    }

    /// Parse the wire form. Trailing bytes past the declared length are ignored.
    pub fn from_buffer(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let total = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        if total < HEADER_LEN + 1 + UUID_LEN || total > buf.len() {
            return None;
        }
        let flags = u16::from_be_bytes([buf[2], buf[3]]);
        IdentFormat::from_u8(buf[4]).filter(|f| *f == IdentFormat::Uuid)?;

        let body = &buf[HEADER_LEN..total];
        let nul = body.iter().position(|b| *b == 0)?;
        let name = core::str::from_utf8(&body[..nul]).ok()?;
        let rest = &body[nul + 1..];
        let uuid: [u8; UUID_LEN] = rest.try_into().ok()?;

        let mut ident = Self::new(name, uuid)?;
        ident.flags = flags;
        Some(ident)
    }

    /// Length of the wire form.
    pub fn wire_len(&self) -> usize {
        HEADER_LEN + self.name.len() + 1 + UUID_LEN
    }

    /// Write the wire form into `out`. Returns bytes written, or `None` if
    /// `out` is too small.
    pub fn serialize(&self, out: &mut [u8]) -> Option<usize> {
        let total = self.wire_len();
        if out.len() < total {
            return None;
        }
        out[..2].copy_from_slice(&(total as u16).to_be_bytes());
        out[2..4].copy_from_slice(&self.flags.to_be_bytes());
        out[4] = IdentFormat::Uuid as u8;

        let name_end = HEADER_LEN + self.name.len();
        out[HEADER_LEN..name_end].copy_from_slice(self.name.as_bytes());
        out[name_end] = 0;
        out[name_end + 1..total].copy_from_slice(&self.uuid);
        Some(total)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.wire_len()];
        let _ = self.serialize(&mut out);
        out
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn uuid(&self) -> &[u8; UUID_LEN] {
        &self.uuid
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }
}

impl Default for IdentityUuid {
    fn default() -> Self {
        let mut name = heapless::String::new();
        let _ = name.push_str("relaylink");
        Self {
            name,
            flags: 0,
            uuid: [0; UUID_LEN],
        }
    }
}

impl fmt::Display for IdentityUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.name)?;
        for (i, b) in self.uuid.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                f.write_str("-")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
