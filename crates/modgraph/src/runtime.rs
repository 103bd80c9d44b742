//! Filesystem abstraction for reading module sources.
//!
//! The builder never touches `std::fs` directly. It reads through a
//! [`Runtime`], so tests can swap in an in-memory implementation and hosts
//! can provide their own virtual filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// File is not valid UTF-8
    #[error("Invalid UTF-8 in {}", .0.display())]
    InvalidUtf8(PathBuf),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Platform runtime trait.
///
/// Implementations provide the file reads and working directory the
/// builder needs. All methods are awaited sequentially by the builder.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file as UTF-8 text.
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}

/// Native runtime backed by `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;

        String::from_utf8(bytes).map_err(|_| RuntimeError::InvalidUtf8(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| {
            RuntimeError::Io(format!("Failed to get current working directory: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_existing_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("index.js");
        std::fs::write(&file, "export const x = 1;").unwrap();

        let runtime = NativeRuntime::new();
        let content = runtime.read_to_string(&file).await.unwrap();
        assert_eq!(content, "export const x = 1;");
        assert!(runtime.exists(&file));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let runtime = NativeRuntime::new();

        let err = runtime
            .read_to_string(&temp.path().join("missing.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("binary.js");
        std::fs::write(&file, [0xff, 0xfe, 0x00]).unwrap();

        let err = NativeRuntime.read_to_string(&file).await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidUtf8(_)));
    }
}
