//! Bet standings: three-way league wager tracker.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod snapshot;
pub mod engine;
pub mod server;
