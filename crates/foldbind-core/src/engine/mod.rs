//! # Engine Module
//!
//! The orchestration layer between the stateless [`crate::core`] building blocks
//! and the user-facing [`crate::workflows`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Tool registry, resolver and dispatcher settings with builders
//! - **Caching** ([`cache`]) - On-disk store of predicted structures keyed by identifier and content hash
//! - **Invocation** ([`invoke`]) - Locating a tool and running it through a [`crate::core::process::ProcessRunner`]
//! - **Tool Logs** ([`tool_log`]) - Append-only per-tool log files written by the pose dispatcher
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for front ends
//! - **Error Handling** ([`error`]) - The engine-wide error type
//!
//! Every external call is blocking and sequential. Timeouts and cancellation are
//! properties of the runner, not of the workflows.

pub mod cache;
pub mod config;
pub mod error;
pub mod invoke;
pub mod progress;
#[cfg(test)]
pub(crate) mod testing;
pub mod tool_log;
