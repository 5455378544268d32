//! Generator configuration
//!
//! [`GeneratorConfig`] is the finished value the pipeline runs on.
//! [`ProjectConfig`] is the optional `routegen.toml` it may be built from.

use crate::alias::is_valid_identifier;
use crate::error::ConfigError;
use crate::keys::KeyStrategy;
use crate::symbols::Selection;
use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Name of the optional project configuration file
pub const CONFIG_FILE: &str = "routegen.toml";

pub const DEFAULT_ROOT: &str = "app";
pub const DEFAULT_OUTPUT_DIR: &str = "internal/registry";
pub const DEFAULT_PACKAGE: &str = "registry";
pub const DEFAULT_WATCH_EXTENSIONS: &str = "go,toml";

/// Fully resolved pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub scan_root: PathBuf,
    pub output_dir: PathBuf,
    /// Module path, e.g. `github.com/acme/site`
    pub module_name: String,
    /// Package clause of the generated file
    pub package_name: String,
    pub key_strategy: KeyStrategy,
    pub selection: Selection,
}

impl GeneratorConfig {
    pub fn new(
        scan_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        module_name: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            scan_root: scan_root.into(),
            output_dir: output_dir.into(),
            module_name: module_name.into(),
            package_name: package_name.into(),
            key_strategy: KeyStrategy::default(),
            selection: Selection::default(),
        }
    }

    /// Check every field before any scanning happens
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_root.as_os_str().is_empty() {
            return Err(ConfigError::Empty("scan root"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Empty("output directory"));
        }
        if self.module_name.is_empty() {
            return Err(ConfigError::Empty("module name"));
        }
        if self.package_name.is_empty() {
            return Err(ConfigError::Empty("package name"));
        }

        if !is_valid_identifier(&self.package_name) || self.package_name == "_" {
            return Err(ConfigError::InvalidPackageName(self.package_name.clone()));
        }
        if !is_valid_module_path(&self.module_name) {
            return Err(ConfigError::InvalidModuleName(self.module_name.clone()));
        }

        if let Selection::Package(dir) = &self.selection {
            if !is_contained_path(dir) {
                return Err(ConfigError::SelectionOutsideRoot(dir.clone()));
            }
        }

        Ok(())
    }
}

/// A relative path that cannot climb out of the directory it is joined onto
fn is_contained_path(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Module paths are `/`-separated, non-empty segments without whitespace
pub fn is_valid_module_path(module: &str) -> bool {
    !module.is_empty()
        && !module.chars().any(char::is_whitespace)
        && module.trim_end_matches('/').split('/').all(|s| !s.is_empty())
}

/// Contents of `routegen.toml`; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub root: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub module: Option<String>,
    pub package: Option<String>,
    pub stable_keys: Option<bool>,
    pub watch_ext: Option<String>,
}

impl ProjectConfig {
    /// Load `routegen.toml` from the project root, or defaults if it is absent
    pub fn load(project_root: &Path) -> anyhow::Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_file(&config_path)
    }

    /// Load an explicit configuration file
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Read the module path from `go.mod` in `project_root`, if present
pub fn detect_module_name(project_root: &Path) -> Option<String> {
    let content = std::fs::read_to_string(project_root.join("go.mod")).ok()?;
    parse_module_directive(&content)
}

fn parse_module_directive(content: &str) -> Option<String> {
    let re = Regex::new(r#"(?m)^\s*module\s+"?([^\s"]+)"?"#).ok()?;
    re.captures(content)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Split a comma-separated extension list, dropping blanks and leading dots
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
