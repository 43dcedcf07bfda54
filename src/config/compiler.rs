//! Route configuration compiler.
//!
//! # Responsibilities
//! - Merge per-domain route documents with global defaults
//! - Apply the precedence rules (base path, selector inheritance, headers)
//! - Persist one canonical manifest for the runtime
//!
//! # Design Decisions
//! - Domain files are enumerated in sorted name order so the compiled
//!   output is reproducible byte-for-byte across platforms
//! - Any malformed file aborts the whole compile; the manifest is written
//!   only after every domain merged cleanly in memory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{CompiledManifest, DomainConfig, GlobalConfig, Route};

/// File name of the compiled manifest inside the output directory.
pub const MANIFEST_FILE: &str = "routes.json";

/// Extension a domain document must carry to be picked up.
const CONFIG_EXTENSION: &str = "json";

/// Error type for a compile invocation. Every variant is fatal; no partial
/// manifest is ever written.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read config directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("failed to read {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize compiled manifest: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write compiled manifest to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Compiles route configurations from multiple files into one manifest.
pub struct Compiler {
    config_dir: PathBuf,
    output_dir: PathBuf,
    global_file: Option<PathBuf>,
}

impl Compiler {
    pub fn new(
        config_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        global_file: Option<PathBuf>,
    ) -> Self {
        Self {
            config_dir: config_dir.into(),
            output_dir: output_dir.into(),
            global_file,
        }
    }

    /// Read all route configs, merge them, and write the compiled manifest.
    /// Returns the path of the written manifest.
    pub fn compile(&self) -> Result<PathBuf, CompileError> {
        let mut manifest = CompiledManifest::default();

        if let Some(path) = &self.global_file {
            self.merge_global(path, &mut manifest)?;
        }

        for path in self.domain_files()? {
            let data = fs::read(&path).map_err(|source| CompileError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let domain: DomainConfig =
                serde_json::from_slice(&data).map_err(|source| CompileError::Parse {
                    path: path.clone(),
                    source,
                })?;

            tracing::debug!(
                domain = %domain.domain,
                routes = domain.routes.len(),
                file = %path.display(),
                "Merging domain config"
            );

            for route in &domain.routes {
                manifest.routes.push(resolve_route(&domain, route));
            }
        }

        self.persist(&manifest)
    }

    /// Regular `.json` files directly inside the config directory, sorted by
    /// name. Subdirectories and other extensions are ignored.
    fn domain_files(&self) -> Result<Vec<PathBuf>, CompileError> {
        let read_dir_err = |source| CompileError::ReadDir {
            path: self.config_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.config_dir).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == CONFIG_EXTENSION) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Fold the global defaults into the manifest. A missing file is fine;
    /// a malformed one is fatal. Global header defaults are parsed but not
    /// merged anywhere — only the selector propagates.
    fn merge_global(
        &self,
        path: &Path,
        manifest: &mut CompiledManifest,
    ) -> Result<(), CompileError> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(CompileError::ReadFile {
                    path: path.to_owned(),
                    source,
                })
            }
        };

        let global: GlobalConfig =
            serde_json::from_slice(&data).map_err(|source| CompileError::Parse {
                path: path.to_owned(),
                source,
            })?;

        if let Some(selector) = global.middlewares {
            manifest.middlewares = selector;
        }

        Ok(())
    }

    fn persist(&self, manifest: &CompiledManifest) -> Result<PathBuf, CompileError> {
        let data = serde_json::to_vec_pretty(manifest).map_err(CompileError::Serialize)?;

        fs::create_dir_all(&self.output_dir).map_err(|source| CompileError::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        let output_path = self.output_dir.join(MANIFEST_FILE);
        fs::write(&output_path, data).map_err(|source| CompileError::Write {
            path: output_path.clone(),
            source,
        })?;

        tracing::info!(
            routes = manifest.routes.len(),
            output = %output_path.display(),
            "Compiled route manifest"
        );

        Ok(output_path)
    }
}

/// Resolve a single route against its domain: prefix the base path, inherit
/// the selector when the route has none, and merge headers first-definition
/// wins into a map owned by the route alone.
fn resolve_route(domain: &DomainConfig, route: &Route) -> Route {
    let mut resolved = route.clone();

    if !domain.base_path.is_empty() {
        resolved.path = format!("{}{}", domain.base_path, route.path);
    }

    if resolved.middlewares.is_none() {
        resolved.middlewares = domain.middlewares.clone();
    }

    for (key, value) in &domain.headers {
        resolved
            .headers
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }

    resolved
}
