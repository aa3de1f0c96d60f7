//! # foldbind Core Library
//!
//! Orchestration of independently installed computational-biology tools: protein
//! structure predictors, protein–ligand pose predictors and a binding-affinity
//! predictor. The library never runs a model itself; it validates inputs, builds
//! the command line for an external tool, runs it as a blocking subprocess and
//! collects the artifact the tool leaves behind.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout so that each piece can be tested in
//! isolation, with subprocesses replaced by a recording runner.
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: input validation,
//!   content hashing, JSON records, tool descriptions and the subprocess runner.
//!
//! - **[`engine`]: The Orchestration Layer.** Configuration, the on-disk structure
//!   cache, the single-tool invoker, per-tool log files and progress reporting.
//!
//! - **[`workflows`]: The Public API.** Complete operations: the structure
//!   resolver with backend fallback, the pose dispatcher, the single-tool pose
//!   wrapper and the affinity wrapper.

pub mod core;
pub mod engine;
pub mod workflows;
