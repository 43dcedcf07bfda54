//! Torii configuration-driven API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//! config/routes/*.json ─┐
//!                       ├─▶ config::Compiler ─▶ build/routes.json
//! config/global.json ───┘                           │
//!                                                   ▼
//!                        dispatch::Loader ◀── CompiledManifest
//!                               │
//!              middleware::Manager resolves selectors
//!                               │
//!               engine::AxumEngine registers routes
//!                               │
//!        inbound request ─▶ middleware chain ─▶ proxy executor ─▶ backend
//! ```
//!
//! The compiler merges per-domain route documents with global defaults into
//! one manifest; the dispatcher turns that manifest into middleware-wrapped
//! proxy pipelines registered against the routing engine. Middlewares are
//! resolved by name from an explicit registry populated at startup.

// Core subsystems
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod middleware;
pub mod proxy;

pub use config::{CompiledManifest, Compiler};
pub use dispatch::Loader;
pub use engine::AxumEngine;
pub use middleware::{Manager, Registry};
