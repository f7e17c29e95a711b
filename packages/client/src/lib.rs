//! Terminal client for Tandem.
//!
//! Waits in the waiting room until paired, then chats in the assigned room,
//! reconnecting with exponential backoff when the connection drops.

mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::{ClientConfig, run_client};
