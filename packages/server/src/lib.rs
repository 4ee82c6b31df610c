//! Goishi session server.
//!
//! Layers follow the usual split: `domain` holds rooms, rules and ports,
//! `usecase` one operation per client event, `infrastructure` the port
//! implementations and `ui` the axum router.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
