//! # trygr-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceStore` / `LocationStore` — the device and location caches
//!   - `DeviceCapability` — per-vendor device control
//!   - `Notifier` — outbound notification transport
//!   - `EventPublisher` — publish state changes
//! - Define **driving/inbound** use-cases:
//!   - `DeviceCacheService` / `LocationCacheService` — write-through caches that push to the engine
//!   - `TriggerEngine` — evaluate, dedup, dispatch, notify
//!   - `Scheduler` — clock ticks and heartbeats
//! - Provide **in-process infrastructure** (event bus, dedup tracker) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `trygr-domain` only (plus `tokio` for channels, tasks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod action_dispatcher;
pub mod capability_registry;
pub mod event_bus;
pub mod notification;
pub mod ports;
pub mod scheduler;
pub mod services;
pub mod state_tracker;
pub mod trigger_engine;

#[cfg(test)]
mod fakes;
