//! Wire records exchanged with API callers.
//!
//! None of these are persisted; each is built per request from a provider
//! response and serialized as JSON via `serde`.

pub mod grant;
pub mod object;
