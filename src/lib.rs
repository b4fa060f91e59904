//! Circuit overload simulator.
//!
//! A power distribution network is a forest of components (power sources,
//! circuit breakers, outlets, appliances). Switching cascades down the tree,
//! current draw ripples up, and a breaker whose draw exceeds its limit trips
//! and disengages everything below it.

pub mod config;
pub mod display;
pub mod domain;
pub mod error;
pub mod loader;
pub mod session;
pub mod telemetry;

pub use domain::{Circuit, CircuitEvent, Component, ComponentId, ComponentKind, ComponentType};
pub use error::{CircuitError, Result};
