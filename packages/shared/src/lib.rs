//! Code shared by the Goishi server and client.
//!
//! - `protocol`: the WebSocket event vocabulary and payload DTOs
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: clock abstraction and timestamp formatting

pub mod logger;
pub mod protocol;
pub mod time;
