//! Symbol Snapshots
//!
//! The scanner never touches a toolchain directly. It consumes a
//! [`SymbolSnapshot`] produced by a [`SymbolSource`], which lists the
//! top-level callables declared in every template file together with their
//! parameter types.

pub mod go;

pub use go::GoSymbolSource;

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name suffix of compiled template files
pub const TEMPLATE_SUFFIX: &str = "_templ.go";

/// Which part of the scan root to load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every template file below the scan root
    #[default]
    All,
    /// Only the template files directly inside one sub-directory of the scan root
    Package(PathBuf),
}

/// A parameter or result type as written in the declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Source text, e.g. `*models.UserData`
    pub raw: String,
    /// Bare type name, e.g. `UserData`
    pub name: String,
    /// Package qualifier, e.g. `models`
    pub qualifier: Option<String>,
    /// Import path the qualifier resolves to, when known
    pub package_path: Option<String>,
}

impl TypeRef {
    /// Build a type reference from its source text, stripping pointer and
    /// slice prefixes. The package path is left unresolved.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw
            .trim()
            .trim_start_matches("...")
            .trim_start_matches(|c: char| c == '*' || c == '[' || c == ']' || c == '&');

        // Drop generic arguments: `Box[T]` -> `Box`
        let base = trimmed.split('[').next().unwrap_or(trimmed);

        let (qualifier, name) = match base.rsplit_once('.') {
            Some((q, n)) => (Some(q.to_string()), n.to_string()),
            None => (None, base.to_string()),
        };

        Self {
            raw: raw.trim().to_string(),
            name,
            qualifier,
            package_path: None,
        }
    }
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeRef,
}

/// A top-level callable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    /// Declared with a receiver
    pub is_method: bool,
    pub params: Vec<Param>,
    pub line: usize,
}

impl FunctionDecl {
    /// Exported names start with an uppercase letter
    pub fn is_exported(&self) -> bool {
        self.name
            .chars()
            .next()
            .map(|c| c.is_uppercase())
            .unwrap_or(false)
    }
}

/// An import declared by a source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDecl {
    pub path: String,
    /// Explicit alias (`alias "path"`)
    pub alias: Option<String>,
}

impl ImportDecl {
    /// Name the import is referenced by inside the file
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias.as_str(),
            None => self.path.rsplit('/').next().unwrap_or(self.path.as_str()),
        }
    }
}

/// All declarations of one template file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Identifier from the package clause
    pub package: String,
    pub imports: Vec<ImportDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// Immutable view of the template files under the scan root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolSnapshot {
    pub files: Vec<SourceFile>,
}

impl SymbolSnapshot {
    pub fn new(files: Vec<SourceFile>) -> Self {
        Self { files }
    }

    /// Total number of declared functions across all files
    pub fn function_count(&self) -> usize {
        self.files.iter().map(|f| f.functions.len()).sum()
    }
}

/// Supplies declared callables per template file
pub trait SymbolSource {
    /// Load a snapshot of the selected files
    ///
    /// # Errors
    /// Returns an error if the tree cannot be walked or a file cannot be
    /// read or parsed. A partial snapshot is never returned.
    fn load(&self, selection: &Selection) -> Result<SymbolSnapshot, SourceError>;
}
