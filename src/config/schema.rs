//! Configuration document definitions.
//!
//! This module defines every document the gateway reads or writes: the
//! per-domain route declarations, the global defaults, the compiled
//! manifest the runtime consumes, and the standalone middleware execution
//! order. All types derive Serde traits; wire names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered middleware name lists, one per phase.
///
/// Names must be unique within a phase list for the composed chain to be
/// deterministic; the same name may appear in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Middlewares that run ahead of the backend call, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_request: Vec<String>,

    /// Middlewares that run on the way out, after the backend call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_response: Vec<String>,
}

impl Selector {
    /// True when neither phase names any middleware.
    pub fn is_empty(&self) -> bool {
        self.on_request.is_empty() && self.on_response.is_empty()
    }
}

/// A single route: where it listens and where it forwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Request path the engine matches. In a compiled manifest the domain
    /// base path is already prefixed.
    pub path: String,

    /// HTTP method name (GET, POST, PUT, DELETE, PATCH).
    pub method: String,

    /// Backend base URL. Only the target's own path is forwarded; inbound
    /// path segments past the match are not appended.
    pub target: String,

    /// Route-specific selector. Absent means inherit the domain selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<Selector>,

    /// Static header overrides injected into the outbound request. Keys are
    /// case-sensitive as written.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// One domain's route declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainConfig {
    /// Domain identifier, used for diagnostics only.
    pub domain: String,

    /// Prefix concatenated onto every route path, verbatim. Include the
    /// leading slash; no separator normalization is applied.
    #[serde(default)]
    pub base_path: String,

    #[serde(default)]
    pub routes: Vec<Route>,

    /// Domain-level selector, inherited by routes without their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<Selector>,

    /// Domain-level default headers. They fill route header keys that are
    /// absent; route-level keys always win.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// Gateway-wide defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middlewares: Option<Selector>,

    /// Parsed but not merged into compiled routes. Only the global selector
    /// propagates into the manifest.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// The compiled route table, the only artifact the runtime consumes.
///
/// Routes are fully resolved: paths prefixed, selectors inherited or own,
/// headers merged. Domains no longer exist at this level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledManifest {
    /// Effective global selector, attached at the engine's root scope.
    #[serde(default)]
    pub middlewares: Selector,

    #[serde(default)]
    pub routes: Vec<Route>,
}

/// Standalone canonical middleware ordering, loaded separately from the
/// manifest by the middleware manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOrder {
    #[serde(default)]
    pub on_request: Vec<String>,

    #[serde(default)]
    pub on_response: Vec<String>,
}
