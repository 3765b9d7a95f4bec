//! # circadia-domain
//!
//! Pure domain model for the circadia adaptive lighting controller.
//!
//! ## Responsibilities
//! - Foundational types: identifiers, error conventions, timestamps
//! - Time-of-day arithmetic with midnight wraparound ([`time`], [`math`])
//! - Color-temperature to RGB approximation ([`color`])
//! - Controller [`settings`] and their invariants
//! - **Target computation**: time of day + sun elevation -> brightness / color
//!   temperature ([`target`])
//! - **Manual-hold tracking** ([`hold`])
//! - Light snapshots, state-change events and commands ([`entity`], [`event`], [`command`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod math;
pub mod time;

pub mod color;
pub mod command;
pub mod entity;
pub mod event;
pub mod hold;
pub mod settings;
pub mod target;
