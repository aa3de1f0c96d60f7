//! # Core Module
//!
//! Stateless building blocks shared by every workflow.
//!
//! - **Inputs** ([`inputs`]) - Path and extension checks, job descriptors
//! - **Hashing** ([`hashing`]) - Content hash used as part of the cache key
//! - **Records** ([`records`]) - JSON documents written by the workflows
//! - **Processes** ([`process`]) - Blocking subprocess execution with timeouts
//! - **Tools** ([`tools`]) - Declarative descriptions of external tools and their discovery
//! - **Outputs** ([`outputs`]) - Contracts describing which files a tool produces

pub mod hashing;
pub mod inputs;
pub mod outputs;
pub mod process;
pub mod records;
pub mod tools;
