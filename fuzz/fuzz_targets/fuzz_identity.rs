//! Fuzz target: `IdentityUuid::from_buffer`
//!
//! Anything that parses must re-serialise to exactly the bytes it covered.
//!
//! cargo fuzz run fuzz_identity

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaylink::identity::IdentityUuid;

fuzz_target!(|data: &[u8]| {
    if let Some(ident) = IdentityUuid::from_buffer(data) {
        let bytes = ident.to_bytes();
        assert_eq!(bytes.len(), ident.wire_len());
        assert_eq!(&data[..bytes.len()], &bytes[..]);
    }
});
