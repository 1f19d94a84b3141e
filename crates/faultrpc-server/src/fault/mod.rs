//! Fault generation and outcome translation.
//!
//! One fault cycle is a draw from [`FaultGenerator`] followed by
//! [`translate`] of the drawn code.

pub mod generator;
pub mod translator;

pub use generator::{FaultGenerator, FaultResult};
pub use translator::{fault_status, lookup, translate};
