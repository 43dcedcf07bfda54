//! Route loading and dispatch.
//!
//! # Data Flow
//! ```text
//! build/routes.json
//!     → Loader (parse manifest, read once)
//!     → Manager resolves selector name lists to instances
//!     → compose() folds chains around the proxy handler
//!     → Engine stages method+path registrations
//!     → engine serve() materializes and binds
//! ```
//!
//! # Design Decisions
//! - Load is one-shot: unloaded → loaded, never re-entered while serving
//! - An unsupported route method aborts the load; because the engine only
//!   materializes staged routes on serve, a failed load leaves nothing live

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::{CompiledManifest, Selector};
use crate::engine::{Engine, Method};
use crate::middleware::{compose, Manager, Middleware};
use crate::proxy::{self, HttpClient};

/// Error type for a dispatch load. Every variant is fatal to process start.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported method {method:?} on route {path}")]
    UnsupportedMethod { method: String, path: String },
}

/// Builds middleware-wrapped proxy pipelines from a compiled manifest and
/// registers them against the routing engine.
pub struct Loader<'a, E: Engine> {
    engine: &'a mut E,
    manager: &'a Manager,
    client: HttpClient,
}

impl<'a, E: Engine> Loader<'a, E> {
    pub fn new(engine: &'a mut E, manager: &'a Manager) -> Self {
        Self {
            engine,
            manager,
            client: proxy::new_client(),
        }
    }

    /// Read and parse a compiled manifest, then load it.
    pub fn load_from_file(&mut self, path: &Path) -> Result<(), DispatchError> {
        let data = fs::read(path).map_err(|source| DispatchError::Read {
            path: path.to_owned(),
            source,
        })?;
        let manifest: CompiledManifest =
            serde_json::from_slice(&data).map_err(|source| DispatchError::Parse {
                path: path.to_owned(),
                source,
            })?;
        self.load(&manifest)
    }

    /// Attach the manifest's global chain and register every route.
    pub fn load(&mut self, manifest: &CompiledManifest) -> Result<(), DispatchError> {
        let global = self.resolve_selector(&manifest.middlewares);
        if !global.is_empty() {
            self.engine.attach(global);
        }

        for route in &manifest.routes {
            let method =
                Method::from_name(&route.method).ok_or_else(|| DispatchError::UnsupportedMethod {
                    method: route.method.clone(),
                    path: route.path.clone(),
                })?;

            let mut handler = proxy::handler(route.clone(), self.client.clone());
            if let Some(selector) = &route.middlewares {
                let chain = self.resolve_selector(selector);
                handler = compose(handler, &chain);
            }

            self.engine.register(method, &route.path, handler);
        }

        tracing::info!(routes = manifest.routes.len(), "Route table loaded");
        Ok(())
    }

    /// A selector's full chain: its pre-request names resolved, then its
    /// post-response names, concatenated in that order.
    fn resolve_selector(&self, selector: &Selector) -> Vec<Arc<dyn Middleware>> {
        let mut chain = self.manager.resolve(&selector.on_request);
        chain.extend(self.manager.resolve(&selector.on_response));
        chain
    }
}
