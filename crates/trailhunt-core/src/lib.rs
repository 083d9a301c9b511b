//! Trailhunt Core: shared abstractions.
//!
//! This crate defines the ports, identifiers and error types that the game
//! engine and its adapters depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod message;
pub mod ports;
