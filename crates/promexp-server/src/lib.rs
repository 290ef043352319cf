//! promexp server library entry.
//!
//! This crate wires the config loader, metric providers, cache layer, and
//! exporter into an axum service. It is consumed by the binary (`main.rs`)
//! and by integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod ops;
pub mod provider;
pub mod router;
