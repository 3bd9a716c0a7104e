//! Temporary code generation for the lock vault client.
//!
//! This crate turns a lock and a time range into a sequence of temporary
//! codes, one per epoch, by asking a [`ServiceCodeSource`] for each epoch in
//! turn.
//!
//! # Components
//!
//! - [`CodeSchedule`]: start time, epoch count and epoch length
//! - [`TemporaryCodes`]: lazy sequence produced by [`generate_codes`]
//! - [`current_code`]: one-shot query for the code active now
//! - [`mock::MockCodeSource`]: scripted source for tests and development
//!
//! [`ServiceCodeSource`]: lockvault_network::ServiceCodeSource

pub mod generator;
pub mod mock;
pub mod schedule;

pub use generator::{EpochFailure, TemporaryCodes, current_code, generate_codes};
pub use schedule::CodeSchedule;
