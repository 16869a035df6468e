//! Hushlink token generation.
//!
//! Two kinds of tokens exist: a short public id that goes into shareable
//! URLs, and a 128-bit secret key that proves ownership of a link.

pub mod tokens;

pub use tokens::{SHORT_ID_LENGTH, generate_secret_id, generate_short_id, secrets_match};
