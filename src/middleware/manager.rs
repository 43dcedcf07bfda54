//! Middleware instantiation and resolution.
//!
//! # Responsibilities
//! - Instantiate one long-lived instance per registered name
//! - Resolve ordered name lists into ordered instance lists
//! - Hold the optional canonical execution order document
//!
//! # Design Decisions
//! - Instances are memoized by name, not per-route or per-request; the same
//!   instance serves all matching routes concurrently
//! - Unknown names resolve to nothing, silently; a caller wanting
//!   validation compares resolved length against requested length

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::ExecutionOrder;
use crate::middleware::{Middleware, Phase, Registry};

/// Error loading the standalone execution order document.
#[derive(Debug, Error)]
pub enum ExecutionOrderError {
    #[error("failed to read execution order file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse execution order file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Resolves middleware names to shared instances.
pub struct Manager {
    on_request: HashMap<String, Arc<dyn Middleware>>,
    on_response: HashMap<String, Arc<dyn Middleware>>,
    execution_order: ExecutionOrder,
}

impl Manager {
    /// Instantiate every registered constructor exactly once, across both
    /// phases. The registry is not consulted again afterwards.
    pub fn from_registry(registry: &Registry) -> Self {
        let instantiate = |phase| {
            registry
                .constructors(phase)
                .iter()
                .map(|(name, constructor)| (name.clone(), constructor()))
                .collect::<HashMap<_, _>>()
        };

        let manager = Self {
            on_request: instantiate(Phase::OnRequest),
            on_response: instantiate(Phase::OnResponse),
            execution_order: ExecutionOrder::default(),
        };

        tracing::info!(
            on_request = manager.on_request.len(),
            on_response = manager.on_response.len(),
            "Middleware instances loaded"
        );

        manager
    }

    /// Load the canonical execution order from a standalone document.
    pub fn load_execution_order(&mut self, path: &Path) -> Result<(), ExecutionOrderError> {
        let data = fs::read(path).map_err(|source| ExecutionOrderError::Read {
            path: path.to_owned(),
            source,
        })?;
        self.execution_order =
            serde_json::from_slice(&data).map_err(|source| ExecutionOrderError::Parse {
                path: path.to_owned(),
                source,
            })?;
        Ok(())
    }

    /// Resolve an ordered name list to an ordered instance list.
    ///
    /// Each name is looked up in the pre-request table first, then the
    /// post-response table; a name present in both phases resolves to the
    /// pre-request instance. Unknown names are skipped.
    pub fn resolve(&self, names: &[String]) -> Vec<Arc<dyn Middleware>> {
        let mut resolved = Vec::new();
        for name in names {
            if let Some(mw) = self
                .on_request
                .get(name)
                .or_else(|| self.on_response.get(name))
            {
                resolved.push(mw.clone());
            }
        }
        resolved
    }

    /// The chain described by the execution order document: all of its
    /// pre-request entries, then all of its post-response entries,
    /// regardless of how the document interleaved them.
    pub fn global_chain(&self) -> Vec<Arc<dyn Middleware>> {
        let mut chain = Vec::new();
        for name in &self.execution_order.on_request {
            if let Some(mw) = self.on_request.get(name) {
                chain.push(mw.clone());
            }
        }
        for name in &self.execution_order.on_response {
            if let Some(mw) = self.on_response.get(name) {
                chain.push(mw.clone());
            }
        }
        chain
    }
}
