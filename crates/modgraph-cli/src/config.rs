//! Layered configuration.
//!
//! Priority: CLI flags > `MODGRAPH_*` environment variables > config file > defaults.
//!
//! The config file is `--config <FILE>` when given, otherwise `modgraph.json`
//! or `modgraph.toml` in the current directory if one exists. Keys are camelCase:
//!
//! ```toml
//! basePath = "."
//! conditions = ["browser", "import"]
//! exclude = ["**/*.css"]
//! virtual = ["virtual:*"]
//! onScanError = "skip"
//!
//! [external]
//! exclude = ["lodash"]
//!
//! [resolver]
//! mainFields = ["module", "main"]
//! ```
//!
//! Environment variables use `__` for nesting and `_` between words, so
//! `MODGRAPH_BASE_PATH` sets `basePath` and `MODGRAPH_EXTERNAL__IGNORE` sets
//! `external.ignore`.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use modgraph::{BuildConfig, ExternalPolicy, Pattern, ResolverOptions, ScanErrorPolicy};
use serde::{Deserialize, Serialize};

use crate::cli::GraphArgs;
use crate::error::{ConfigError, Result};

/// Config file names looked up in the current directory, in order.
pub const CONFIG_FILES: &[&str] = &["modgraph.json", "modgraph.toml"];

const ENV_PREFIX: &str = "MODGRAPH_";

/// Everything a graph build can be configured with, outside of entrypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModgraphConfig {
    /// Relative paths are taken from the current directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<PathBuf>,
    pub conditions: Vec<String>,
    pub exclude: Vec<String>,
    pub foreign: Vec<String>,
    #[serde(rename = "virtual")]
    pub virtual_modules: Vec<String>,
    pub external: ExternalConfig,
    pub ignore_dynamic_imports: bool,
    pub resolver: ResolverOptions,
    pub on_scan_error: ScanErrorPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalConfig {
    pub ignore: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for ModgraphConfig {
    fn default() -> Self {
        let build = BuildConfig::default();
        Self {
            base_path: None,
            conditions: build.conditions,
            exclude: Vec::new(),
            foreign: Vec::new(),
            virtual_modules: Vec::new(),
            external: ExternalConfig::default(),
            ignore_dynamic_imports: false,
            resolver: build.resolver_options,
            on_scan_error: build.scan_error_policy,
        }
    }
}

/// Flags the user actually passed. Unset fields are not serialized so they
/// don't shadow lower layers.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    foreign: Vec<String>,
    #[serde(rename = "virtual", skip_serializing_if = "Vec::is_empty")]
    virtual_modules: Vec<String>,
    #[serde(skip_serializing_if = "ExternalOverrides::is_empty")]
    external: ExternalOverrides,
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_dynamic_imports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    on_scan_error: Option<ScanErrorPolicy>,
}

#[derive(Debug, Default, Serialize)]
struct ExternalOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    include: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exclude: Vec<String>,
}

impl ExternalOverrides {
    fn is_empty(&self) -> bool {
        self.ignore.is_none() && self.include.is_empty() && self.exclude.is_empty()
    }
}

impl CliOverrides {
    fn from_args(args: &GraphArgs) -> Self {
        Self {
            base_path: args.base_path.clone(),
            conditions: args.conditions.clone(),
            exclude: args.exclude.clone(),
            foreign: args.foreign.clone(),
            virtual_modules: args.virtual_modules.clone(),
            external: ExternalOverrides {
                ignore: args.ignore_external.then_some(true),
                include: args.include_external.clone(),
                exclude: args.exclude_external.clone(),
            },
            ignore_dynamic_imports: args.ignore_dynamic_imports.then_some(true),
            on_scan_error: args.on_scan_error.map(Into::into),
        }
    }
}

impl ModgraphConfig {
    /// Load configuration from every source, relative to `cwd`.
    pub fn load(args: &GraphArgs, config_path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = config_file(config_path, cwd)? {
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = match path.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(path)),
                _ => figment.merge(Json::file(path)),
            };
        }

        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from_args(args)));

        figment.extract().map_err(|e| {
            ConfigError::Invalid {
                message: e.to_string(),
                hint: "Check the config file syntax and field types".to_string(),
            }
            .into()
        })
    }

    /// Convert into a library build configuration.
    ///
    /// The base path is made absolute against `cwd` and canonicalized so that
    /// module paths line up with what the resolver returns.
    pub fn into_build_config(self, cwd: &Path) -> Result<BuildConfig> {
        let base_path = match self.base_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => cwd.join(path),
            None => cwd.to_path_buf(),
        };
        let base_path = base_path
            .canonicalize()
            .map_err(|source| ConfigError::BasePath {
                path: base_path.clone(),
                source,
            })?;

        Ok(BuildConfig {
            base_path: Some(base_path),
            conditions: self.conditions,
            external: ExternalPolicy {
                ignore: self.external.ignore,
                include: patterns(self.external.include),
                exclude: patterns(self.external.exclude),
            },
            exclude: patterns(self.exclude),
            ignore_dynamic_imports: self.ignore_dynamic_imports,
            foreign_modules: patterns(self.foreign),
            virtual_modules: patterns(self.virtual_modules),
            resolver_options: self.resolver,
            scan_error_policy: self.on_scan_error,
            ..BuildConfig::default()
        })
    }
}

fn patterns(values: Vec<String>) -> Vec<Pattern> {
    values.into_iter().map(Pattern::from).collect()
}

fn config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = cwd.join(path);
        if !path.is_file() {
            return Err(ConfigError::NotFound(path).into());
        }
        return Ok(Some(path));
    }
    Ok(CONFIG_FILES
        .iter()
        .map(|name| cwd.join(name))
        .find(|path| path.is_file()))
}

/// `base_path` -> `basePath`, `external__ignore` -> `external.ignore`.
fn env_key_to_field(key: &str) -> String {
    key.split("__")
        .map(|segment| {
            let mut field = String::with_capacity(segment.len());
            let mut upper = false;
            for ch in segment.chars() {
                if ch == '_' {
                    upper = true;
                } else if upper {
                    field.push(ch.to_ascii_uppercase());
                    upper = false;
                } else {
                    field.push(ch.to_ascii_lowercase());
                }
            }
            field
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args() -> GraphArgs {
        GraphArgs {
            entrypoints: vec!["index.js".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_env_key_to_field() {
        assert_eq!(env_key_to_field("BASE_PATH"), "basePath");
        assert_eq!(env_key_to_field("conditions"), "conditions");
        assert_eq!(env_key_to_field("external__ignore"), "external.ignore");
        assert_eq!(env_key_to_field("resolver__main_fields"), "resolver.mainFields");
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = ModgraphConfig::load(&args(), None, temp.path()).unwrap();
        assert_eq!(config.conditions, vec!["node", "import"]);
        assert_eq!(config.on_scan_error, ScanErrorPolicy::Abort);
        assert!(config.base_path.is_none());
    }

    #[test]
    fn test_json_file_is_discovered() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("modgraph.json"),
            r#"{
                "conditions": ["browser", "import"],
                "virtual": ["virtual:*"],
                "external": { "exclude": ["lodash"] },
                "onScanError": "skip"
            }"#,
        )
        .unwrap();

        let config = ModgraphConfig::load(&args(), None, temp.path()).unwrap();
        assert_eq!(config.conditions, vec!["browser", "import"]);
        assert_eq!(config.virtual_modules, vec!["virtual:*"]);
        assert_eq!(config.external.exclude, vec!["lodash"]);
        assert_eq!(config.on_scan_error, ScanErrorPolicy::Skip);
        assert_eq!(config.resolver.main_fields, vec!["module", "main"]);
    }

    #[test]
    fn test_cli_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("custom.toml"),
            r#"
            exclude = ["**/*.css"]
            ignoreDynamicImports = false

            [external]
            include = ["lit"]
            "#,
        )
        .unwrap();

        let args = GraphArgs {
            exclude: vec!["**/*.scss".to_string()],
            ignore_dynamic_imports: true,
            ..args()
        };
        let config =
            ModgraphConfig::load(&args, Some(Path::new("custom.toml")), temp.path()).unwrap();

        assert_eq!(config.exclude, vec!["**/*.scss"]);
        assert!(config.ignore_dynamic_imports);
        assert_eq!(config.external.include, vec!["lit"]);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = ModgraphConfig::load(&args(), Some(Path::new("nope.json")), temp.path())
            .unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_invalid_field_type() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("modgraph.json"), r#"{ "exclude": 42 }"#).unwrap();
        let err = ModgraphConfig::load(&args(), None, temp.path()).unwrap_err();
        assert!(err.to_string().contains("Hint:"));
    }

    #[test]
    fn test_into_build_config() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("app")).unwrap();

        let config = ModgraphConfig {
            base_path: Some(PathBuf::from("app")),
            external: ExternalConfig {
                ignore: true,
                ..Default::default()
            },
            foreign: vec!["cdn-*".to_string()],
            ..Default::default()
        };
        let build = config.into_build_config(temp.path()).unwrap();

        assert_eq!(
            build.base_path,
            Some(temp.path().join("app").canonicalize().unwrap())
        );
        assert!(build.external.ignore);
        assert_eq!(build.foreign_modules.len(), 1);
        assert!(build.plugins.is_empty());
    }

    #[test]
    fn test_missing_base_path() {
        let temp = TempDir::new().unwrap();
        let config = ModgraphConfig {
            base_path: Some(PathBuf::from("does-not-exist")),
            ..Default::default()
        };
        assert!(config.into_build_config(temp.path()).is_err());
    }
}
