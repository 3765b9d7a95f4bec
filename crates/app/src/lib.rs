//! # circadia-app
//!
//! Application layer — the adaptive lighting controller and the **port
//! definitions** (traits) it is driven through.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Clock` — absolute time and local time of day
//!   - `SunPosition` — solar elevation
//!   - `LightRegistry` — enumerate lights, look one up
//!   - `LightCommander` — issue `turn_on` writes
//!   - `EventPublisher` / `EventSubscriber` — state-change notifications
//! - Discover which lights are driven and how (`discovery`)
//! - Schedule apply sequences on ticks and state changes (`controller`)
//! - Provide **in-process infrastructure** (event bus, system clock) that
//!   doesn't need IO
//!
//! ## Dependency rule
//! Depends on `circadia-domain` only (plus `tokio` for tasks and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod controller;
pub mod discovery;
pub mod event_bus;
pub mod ports;
pub mod system_clock;

#[cfg(test)]
mod testing;
