//! The module graph produced by a build.
//!
//! Storage is split from behavior the same way throughout this module: the
//! struct lives here, read queries live in `queries`, chain search in
//! `chains`, and the builder-facing mutations in `mutations`.

mod chains;
mod module;
mod mutations;
mod queries;

use std::hash::BuildHasherDefault;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHasher;
use serde::Serialize;
use serde_json::{Map, Value};

pub use module::{ExternalModule, Module};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;
pub(crate) type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Kind of a non-fatal build failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// An import could not be resolved; its edge was dropped.
    Unresolved,
    /// A module could not be read or lexed and was left unpopulated.
    Unreadable,
}

/// A non-fatal failure recorded during a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The import specifier involved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
    /// Module in which the failure happened.
    pub importer: String,
    pub message: String,
}

/// Directed import graph with per-module metadata.
///
/// Built once by [`GraphBuilder`](crate::GraphBuilder) and handed to the
/// caller; it holds no state shared with other builds.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleGraph {
    base_path: PathBuf,
    entrypoints: Vec<String>,
    /// Adjacency: module path → dependency paths.
    graph: FxIndexMap<String, FxIndexSet<String>>,
    modules: FxIndexMap<String, Module>,
    /// Keyed by absolute location (`href`).
    external_modules: FxIndexMap<String, ExternalModule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    diagnostics: Vec<Diagnostic>,
    /// Graph-level data attached by plugins.
    #[serde(skip_serializing_if = "Map::is_empty")]
    extra: Map<String, Value>,
}

impl ModuleGraph {
    pub(crate) fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Default::default()
        }
    }
}
