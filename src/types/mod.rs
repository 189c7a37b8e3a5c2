//! Wire-level building blocks for the `.mlist` bytecode container.
//!
//! - [`encoding`]: big-endian `Encode`/`Decode` traits
//! - [`short_bytes`]: payloads with a one-byte length prefix

pub mod encoding;
pub mod short_bytes;
