use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use crate::specifier::to_posix;

/// A node of the module graph.
///
/// Created as an empty stub the moment its path is first discovered and
/// populated (`source`, `facade`, `has_module_syntax`) once, when the builder
/// dequeues and scans it. Foreign and virtual modules are never scanned and
/// keep their stub values.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Absolute location: a `file://` URL, or the specifier of a virtual module.
    pub href: String,
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Identity of the module: path relative to the graph's base path.
    pub relative_path: String,
    #[serde(skip)]
    pub source: String,
    /// The module only re-exports other modules' bindings.
    pub facade: bool,
    pub has_module_syntax: bool,
    /// Direct importers, deduplicated, in discovery order.
    pub imported_by: Vec<String>,
    /// Root directory of the installed package this module belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_root: Option<PathBuf>,
    /// Free-form data attached by plugins.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Module {
    /// Stub for a module on disk.
    pub fn new(path: impl Into<PathBuf>, relative_path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            href: file_href(&path),
            path,
            relative_path: relative_path.into(),
            ..Default::default()
        }
    }

    /// Stub for a virtual module; its identity is the specifier itself.
    pub fn virtual_module(specifier: &str) -> Self {
        Self {
            href: specifier.to_string(),
            path: PathBuf::from(specifier),
            relative_path: specifier.to_string(),
            ..Default::default()
        }
    }

    /// Whether `importer` is a direct importer of this module.
    pub fn is_imported_by(&self, importer: &str) -> bool {
        self.imported_by.iter().any(|p| p == importer)
    }

    /// Record `importer`, keeping the list free of duplicates.
    pub(crate) fn add_importer(&mut self, importer: &str) {
        if !self.is_imported_by(importer) {
            self.imported_by.push(importer.to_string());
        }
    }
}

/// A module reached through a bare (package) specifier.
///
/// Keyed by absolute location in the graph because several specifiers can
/// resolve to the same file. Virtual modules have no location and never
/// appear here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalModule {
    #[serde(flatten)]
    pub module: Module,
    /// Root package name, e.g. `lit` or `@lit/reactive-element`.
    pub package_name: String,
    /// The literal specifier last used to import this module.
    pub specifier: String,
}

fn file_href(path: &Path) -> String {
    Url::from_file_path(path)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| to_posix(path))
}
