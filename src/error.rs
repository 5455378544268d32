//! Error types for the generation pipeline
//!
//! Every hard failure aborts the run before (or while) the registry file is
//! written. Naming violations are not errors; see [`crate::naming`].

use std::path::PathBuf;

/// Result type for pipeline operations
pub type GenResult<T> = Result<T, GenerateError>;

/// Invalid generator configuration, detected before any scanning happens
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("package name '{0}' is not a valid identifier")]
    InvalidPackageName(String),

    #[error("module name '{0}' is not a valid module path")]
    InvalidModuleName(String),

    #[error("scan root '{0}' has no usable directory name")]
    UnnamedScanRoot(PathBuf),

    #[error("package directory '{0}' must be a relative path inside the scan root")]
    SelectionOutsideRoot(PathBuf),
}

/// Failure to load symbols from the source tree
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("scan root not found: {path}")]
    RootNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("tree-sitter language error: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

/// Errors that abort a generation run
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("{path} lies outside the scan root {root}")]
    OutsideScanRoot { path: PathBuf, root: PathBuf },

    #[error("duplicate opaque key '{key}' ({first} and {second})")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    #[error("duplicate route '{route}' ({first} and {second})")]
    DuplicateRoute {
        route: String,
        first: String,
        second: String,
    },

    #[error("alias '{alias}' for {import_path} is not a usable identifier")]
    InvalidAlias { alias: String, import_path: String },

    #[error("alias '{alias}' is shared by {first} and {second}")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    #[error("failed to write {path}: {source}")]
    Emit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
