//! Pattern compilation and import classification.
//!
//! Patterns come in as strings or predicates and are compiled once per build
//! into [`Matcher`]s. Strings containing glob metacharacters are compiled with
//! `globset` in a dialect where `*` and `?` also match `/`, `**` matches any
//! sequence, `{a,b}` alternates and `\` escapes. Strings without
//! metacharacters match exactly.

use std::fmt;
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Error, Result};
use crate::specifier::{is_bare_module_specifier, root_package_name};

const GLOB_META: &[char] = &['*', '?', '[', '{', '\\'];

/// A predicate over module paths, specifiers or package names.
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Uncompiled pattern, as supplied in configuration.
#[derive(Clone)]
pub enum Pattern {
    /// Exact string or glob.
    Text(String),
    /// Arbitrary predicate.
    Predicate(Predicate),
}

impl Pattern {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Compile into a matcher.
    ///
    /// Fails with a configuration error when the glob is malformed.
    pub fn compile(&self) -> Result<Matcher> {
        match self {
            Pattern::Text(text) if text.contains(GLOB_META) => {
                let glob = GlobBuilder::new(text)
                    .literal_separator(false)
                    .backslash_escape(true)
                    .build()
                    .map_err(|e| Error::config(format!("invalid pattern '{}': {}", text, e)))?;
                Ok(Matcher::Glob(glob.compile_matcher()))
            }
            Pattern::Text(text) => Ok(Matcher::Exact(text.clone())),
            Pattern::Predicate(predicate) => Ok(Matcher::Predicate(Arc::clone(predicate))),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Pattern::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Pattern {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

/// Compiled pattern.
#[derive(Clone)]
pub enum Matcher {
    Exact(String),
    Glob(GlobMatcher),
    Predicate(Predicate),
}

impl Matcher {
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Matcher::Exact(text) => text == candidate,
            Matcher::Glob(glob) => glob.is_match(candidate),
            Matcher::Predicate(predicate) => predicate(candidate),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(text) => f.debug_tuple("Exact").field(text).finish(),
            Matcher::Glob(glob) => f.debug_tuple("Glob").field(&glob.glob().glob()).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// A set of compiled patterns; matches when any member matches.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<Matcher>,
}

impl MatcherSet {
    pub fn compile(patterns: &[Pattern]) -> Result<Self> {
        let matchers = patterns
            .iter()
            .map(Pattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { matchers })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(candidate))
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }
}

/// Policy for bare (package) specifiers.
#[derive(Debug, Clone, Default)]
pub struct ExternalPolicy {
    /// Drop every bare specifier.
    pub ignore: bool,
    /// When non-empty, keep only packages matching one of these.
    pub include: Vec<Pattern>,
    /// Drop packages matching one of these.
    pub exclude: Vec<Pattern>,
}

impl ExternalPolicy {
    /// Reject contradictory settings.
    pub fn validate(&self) -> Result<()> {
        if self.ignore && !self.include.is_empty() {
            return Err(Error::config(
                "external.ignore cannot be combined with a non-empty external.include list",
            ));
        }
        Ok(())
    }
}

/// Why an import occurrence was filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// `external.ignore` is set.
    ExternalIgnored,
    /// Root package matched `external.exclude`.
    ExternalExcluded,
    /// Root package did not match a non-empty `external.include`.
    ExternalNotIncluded,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::ExternalIgnored => "external dependencies are ignored",
            DropReason::ExternalExcluded => "package is excluded",
            DropReason::ExternalNotIncluded => "package is not included",
        };
        f.write_str(text)
    }
}

/// All filters of a build, compiled once.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    exclude: MatcherSet,
    foreign: MatcherSet,
    virtual_modules: MatcherSet,
    external_ignore: bool,
    external_include: MatcherSet,
    external_exclude: MatcherSet,
}

impl Filters {
    /// Compile every pattern set, validating the external policy first.
    pub fn compile(
        exclude: &[Pattern],
        foreign: &[Pattern],
        virtual_modules: &[Pattern],
        external: &ExternalPolicy,
    ) -> Result<Self> {
        external.validate()?;

        Ok(Self {
            exclude: MatcherSet::compile(exclude)?,
            foreign: MatcherSet::compile(foreign)?,
            virtual_modules: MatcherSet::compile(virtual_modules)?,
            external_ignore: external.ignore,
            external_include: MatcherSet::compile(&external.include)?,
            external_exclude: MatcherSet::compile(&external.exclude)?,
        })
    }

    /// Whether a resolved dependency path is excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.is_match(path)
    }

    /// Whether a specifier or resolved path names a foreign module.
    pub fn is_foreign(&self, candidate: &str) -> bool {
        self.foreign.is_match(candidate)
    }

    /// Whether a specifier names a virtual module.
    pub fn is_virtual(&self, specifier: &str) -> bool {
        self.virtual_modules.is_match(specifier)
    }

    /// Apply the external-dependency policy to a specifier.
    ///
    /// Relative specifiers and foreign modules always pass.
    pub fn check_external(&self, specifier: &str) -> Option<DropReason> {
        if self.is_foreign(specifier) || !is_bare_module_specifier(specifier) {
            return None;
        }

        if self.external_ignore {
            return Some(DropReason::ExternalIgnored);
        }

        let package = root_package_name(specifier);
        if self.external_exclude.is_match(package) {
            return Some(DropReason::ExternalExcluded);
        }
        if !self.external_include.is_empty() && !self.external_include.is_match(package) {
            return Some(DropReason::ExternalNotIncluded);
        }
        None
    }
}
