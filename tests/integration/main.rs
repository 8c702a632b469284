//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific part of the
//! session layer against mock links. Two sessions are wired back to back
//! where a counterparty is needed.

mod handshake_tests;
mod mock_link;
mod recovery_tests;
mod relay_tests;
