//! Tandem server library.
//!
//! Anonymous two-party chat: a waiting room pairs clients in arrival order and
//! hands each pair a fresh chat room relayed over WebSocket.

// layers
pub mod actor;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
