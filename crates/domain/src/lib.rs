//! # trygr-domain
//!
//! Pure domain model for the trygr home automation rule engine.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error conventions, timestamps
//! - Define **Devices** (vendor-controlled things with a free-form status)
//! - Define **Locations** (postal code, sun times, current weather)
//! - Define **Triggers** (condition → action → notification rules)
//! - Define **Evaluation facts** (device snapshot, weather snapshot, clock tick)
//! - Evaluate a trigger against a fact (pure condition evaluation)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;
pub mod value;

pub mod action;
pub mod device;
pub mod event;
pub mod fact;
pub mod location;
pub mod trigger;
