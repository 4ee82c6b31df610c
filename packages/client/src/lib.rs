//! Goishi client.
//!
//! `GameClient` is the session façade other programs embed; the console
//! client in `bin/client.rs` is built on top of it with `run_client`.

pub mod domain;
pub mod error;
pub mod facade;
pub mod formatter;
pub mod handlers;
pub mod mirror;
mod runner;
mod ui;

pub use error::ClientError;
pub use facade::GameClient;
pub use handlers::{Handler, HandlerTable};
pub use mirror::BoardMirror;
pub use runner::run_client;
