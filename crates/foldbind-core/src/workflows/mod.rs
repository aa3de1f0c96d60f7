//! # Workflows Module
//!
//! Complete operations, one per command of the `foldbind` binary. Each workflow
//! validates its inputs, drives one or more external tools through a
//! [`crate::core::process::ProcessRunner`] and reports progress through a
//! [`crate::engine::progress::ProgressReporter`].
//!
//! ## Architecture
//!
//! - **Structure Resolution** ([`structure`]) - Cache lookup followed by ordered
//!   backend fallback, first success wins.
//! - **Pose Dispatch** ([`poses`]) - Runs each selected pose tool in isolation
//!   with its own output directory and log file.
//! - **Single Pose Tool** ([`pose`]) - Locates and runs one pose predictor.
//! - **Affinity** ([`affinity`]) - Boltz2 prediction that always leaves a JSON
//!   record behind, downgrading failures to a fallback record.

pub mod affinity;
pub mod pose;
pub mod poses;
pub mod structure;
