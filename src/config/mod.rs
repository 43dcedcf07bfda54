//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config/routes/*.json (per-domain)  +  config/global.json
//!     → compiler.rs (merge precedence: base path, selectors, headers)
//!     → build/routes.json (CompiledManifest, pretty JSON)
//!     → read once at startup by the dispatcher
//! ```
//!
//! # Design Decisions
//! - Domain and global documents are ephemeral compile-time inputs; the
//!   manifest is the only durable artifact and the only runtime input
//! - The manifest is immutable for the process lifetime; no hot reload

pub mod compiler;
pub mod schema;

pub use compiler::{CompileError, Compiler, MANIFEST_FILE};
pub use schema::{CompiledManifest, DomainConfig, ExecutionOrder, GlobalConfig, Route, Selector};
