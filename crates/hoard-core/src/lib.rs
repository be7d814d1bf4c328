//! Hoard Core - Foundation types for the Hoard item engine
//!
//! This crate provides the building blocks the item engine is assembled from:
//! - Generational handles and their allocator
//! - Arena storage addressed by those handles
//! - Engine limits and tuning (`ItemConfig`)
//! - The diagnostics channel for configuration errors and structural warnings

pub mod arena;
pub mod config;
pub mod diagnostics;
pub mod handle;

pub use arena::Arena;
pub use config::{ConfigError, ItemConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use handle::{Handle, HandleAllocator};
