//! # trygr-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **REST-ish JSON API** for programmatic access
//!   (`/api/triggers`, `/api/devices`, `/api/locations`)
//! - Act as the push entry point of the engine: device and location writes go
//!   through the cache services, which publish them to the trigger engine
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `trygr-app` (for port traits and services) and `trygr-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod testing;
