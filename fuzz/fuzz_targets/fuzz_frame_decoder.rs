//! Fuzz target: `FrameCodec::decode`
//!
//! Walks arbitrary bytes the way a session drains its receive buffer and
//! asserts the decoder always makes progress and never over-consumes.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use relaylink::link::codec::{Codec, Decoded, FrameCodec, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let mut codec = FrameCodec;
    let mut rest = data;

    while !rest.is_empty() {
        match codec.decode(rest) {
            Decoded::Complete { message, consumed } => {
                assert!(consumed > 0 && consumed <= rest.len());
                assert!(message.event().wire_safe(), "local event decoded");

                // Whatever decodes must re-encode.
                let mut out = Vec::new();
                codec.encode(&message, &mut out).expect("decoded message re-encodes");
                rest = &rest[consumed..];
            }
            Decoded::Malformed { discard } => {
                assert!(discard > 0 && discard <= rest.len());
                rest = &rest[discard..];
            }
            Decoded::Incomplete { declared } => {
                assert!(declared.is_none_or(|d| d <= MAX_FRAME_SIZE));
                break;
            }
        }
    }
});
