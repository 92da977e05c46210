//! HTTP delivery for the vault: application services, the bulk sync engine,
//! the error registry, and the axum surface.
//!
//! The binary in `main.rs` wires this library to PostgreSQL, the on-disk
//! file store, and the master-key provider. Tests wire it to in-memory
//! stores instead.

pub mod api;
pub mod app_config;
pub mod auth;
pub mod router;
pub mod services;
pub mod state;
pub mod sync;
