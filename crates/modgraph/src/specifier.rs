//! Specifier classification and path helpers.
//!
//! These are pure string/path functions shared by the filters and the
//! builder. Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Directory name that marks an installed dependency package.
pub const NODE_MODULES: &str = "node_modules";

/// Node.js core modules that can be imported without the `node:` prefix.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Whether `specifier` is a bare module specifier (a package lookup).
///
/// A bare specifier starts with a letter or the `@` scope marker, so
/// `./a.js`, `../a.js`, `/abs/a.js` and `#internal` are not bare.
pub fn is_bare_module_specifier(specifier: &str) -> bool {
    specifier
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '@')
}

/// Whether `specifier` starts with a relative path prefix.
pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Whether `specifier` names a scoped package (`@scope/name`).
pub fn is_scoped_package(specifier: &str) -> bool {
    specifier.starts_with('@')
}

/// Root package name of a bare specifier.
///
/// `lit/decorators.js` → `lit`, `@lit/reactive-element/x.js` →
/// `@lit/reactive-element`. A scope without a name (`@scope`) is returned
/// unchanged.
pub fn root_package_name(specifier: &str) -> &str {
    let mut segments = specifier.match_indices('/');
    let cut = if is_scoped_package(specifier) {
        segments.nth(1)
    } else {
        segments.next()
    };
    match cut {
        Some((index, _)) => &specifier[..index],
        None => specifier,
    }
}

/// Whether `specifier` names a platform built-in module.
pub fn is_builtin_module(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    NODE_BUILTINS.contains(&specifier)
}

/// Derive the package root of a file inside a `node_modules` tree.
///
/// The innermost `node_modules` directory wins, so nested installs resolve
/// to the nested package. Returns `None` for files outside any package.
pub fn package_root(path: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> = path.components().collect();
    let marker = components
        .iter()
        .rposition(|c| c.as_os_str() == NODE_MODULES)?;

    let first = components.get(marker + 1)?;
    let name_len = if first.as_os_str().to_string_lossy().starts_with('@') {
        2
    } else {
        1
    };
    // The root must be a directory strictly above `path`.
    if components.len() <= marker + name_len + 1 {
        return None;
    }

    Some(components[..=marker + name_len].iter().collect())
}

/// Convert a path to a forward-slash separated string.
pub fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Express `path` relative to `base`, with `/` separators.
///
/// Paths outside `base` get the required number of `..` segments.
pub fn relative_path(base: &Path, path: &Path) -> String {
    if let Ok(stripped) = path.strip_prefix(base) {
        return to_posix(stripped);
    }

    let base_components: Vec<Component<'_>> = base.components().collect();
    let path_components: Vec<Component<'_>> = path.components().collect();
    let shared = base_components
        .iter()
        .zip(path_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    // Different roots (e.g. Windows drives): nothing sensible to strip.
    if shared == 0 {
        return to_posix(path);
    }

    let mut relative = PathBuf::new();
    for _ in shared..base_components.len() {
        relative.push("..");
    }
    for component in &path_components[shared..] {
        relative.push(component.as_os_str());
    }
    to_posix(&relative)
}
