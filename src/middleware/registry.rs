//! Middleware constructor catalog.
//!
//! # Design Decisions
//! - The registry is a plain value the entry point constructs and fills
//!   with an explicit registration list; there is no process-global state,
//!   so registration order and completeness are testable in isolation
//! - Duplicate registration under the same phase and name silently
//!   overwrites the previous entry; last registration wins

use std::collections::HashMap;
use std::sync::Arc;

use crate::middleware::{Middleware, Phase};

/// Constructor producing one middleware instance.
pub type Constructor = Box<dyn Fn() -> Arc<dyn Middleware> + Send + Sync>;

/// Catalog mapping a middleware name to its constructor, partitioned by
/// phase. Populated at startup, before the manager resolves anything; no
/// unregistration.
#[derive(Default)]
pub struct Registry {
    on_request: HashMap<String, Constructor>,
    on_response: HashMap<String, Constructor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under `phase` and `name`.
    pub fn register<F>(&mut self, phase: Phase, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(phase = %phase, name = %name, "Registering middleware");
        self.table_mut(phase).insert(name, Box::new(constructor));
    }

    pub(crate) fn constructors(&self, phase: Phase) -> &HashMap<String, Constructor> {
        match phase {
            Phase::OnRequest => &self.on_request,
            Phase::OnResponse => &self.on_response,
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut HashMap<String, Constructor> {
        match phase {
            Phase::OnRequest => &mut self.on_request,
            Phase::OnResponse => &mut self.on_response,
        }
    }
}
