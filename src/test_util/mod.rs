//! Fakes for the collaborator traits, recording what was sent so tests can assert on the exact
//!  wire text. They are part of the regular (non-#[cfg(test)]) code so applications can use them
//!  to test code built on top of a link.

pub mod resolver;
pub mod transport;
