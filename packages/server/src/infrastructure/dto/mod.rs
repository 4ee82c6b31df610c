//! Domain model → wire DTO conversion.
//!
//! The DTOs themselves live in `goishi_shared::protocol` so that the client
//! decodes exactly what the server encodes.

pub mod conversion;
