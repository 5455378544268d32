//! Naming Validation
//!
//! Enforces agreement between template file names and the functions they
//! declare. Violations never abort a run; the scanner records them as
//! warnings and skips the offending function.

use crate::route::segments_after_root;
use crate::symbols::TEMPLATE_SUFFIX;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name that introduces a dynamic `{locale}` route parameter
pub const LOCALE_DIR: &str = "locale_";

/// Extension of the optional metadata file next to a template file
pub const SIDECAR_EXTENSION: &str = "toml";

/// Function names with dedicated file-location and parameter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservedName {
    Page,
    Layout,
    Error,
}

impl ReservedName {
    pub fn from_function(name: &str) -> Option<Self> {
        match name {
            "Page" => Some(Self::Page),
            "Layout" => Some(Self::Layout),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }

    /// File base name this function must live in
    pub fn file_base(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Layout => "layout",
            Self::Error => "error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "Page",
            Self::Layout => "Layout",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for ReservedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A broken naming rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingViolation {
    #[error("{function} must be declared in {}{}, not {found_base}{}", .function.file_base(), TEMPLATE_SUFFIX, TEMPLATE_SUFFIX)]
    ReservedNameMisplaced {
        function: ReservedName,
        found_base: String,
    },

    #[error("'{function}' ends with the reserved suffix 'Page'")]
    ReservedSuffix { function: String },

    #[error("{}{} may only declare {expected}, found '{function}'", .expected.file_base(), TEMPLATE_SUFFIX)]
    UnexpectedFunction {
        expected: ReservedName,
        function: String,
    },

    #[error("{} declares a 'locale' parameter that shadows the {} directory", .sidecar.display(), LOCALE_DIR)]
    LocaleShadowing { sidecar: PathBuf },

    #[error("failed to read {}: {reason}", .sidecar.display())]
    InvalidSidecar { sidecar: PathBuf, reason: String },
}

/// A skipped function together with the rule it broke
#[derive(Debug, Clone, Serialize)]
pub struct ScanWarning {
    pub file: PathBuf,
    pub function: String,
    pub violation: NamingViolation,
}

impl ScanWarning {
    /// Format warning for display
    pub fn format(&self) -> String {
        format!(
            "{}: {}: {}",
            self.file.display(),
            self.function,
            self.violation
        )
    }
}

/// Metadata file declaring extra dynamic route parameters
#[derive(Debug, Default, Deserialize)]
struct Sidecar {
    #[serde(default)]
    dynamic_params: BTreeMap<String, toml::Value>,
}

/// Strip the template suffix from a file name (`page_templ.go` -> `page`)
pub fn template_base_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_suffix(TEMPLATE_SUFFIX)
        .map(|base| base.to_string())
}

/// Checks a function against the file it is declared in
#[derive(Debug, Clone)]
pub struct NamingValidator {
    root_name: String,
}

impl NamingValidator {
    /// Create a validator for the scan root named `root_name`
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
        }
    }

    /// Validate `function_name` as declared in the template file at `path`
    pub fn validate(&self, path: &Path, function_name: &str) -> Result<(), NamingViolation> {
        let base = template_base_name(path).unwrap_or_default();
        let reserved = ReservedName::from_function(function_name);

        match reserved {
            Some(name) if name.file_base() != base => {
                return Err(NamingViolation::ReservedNameMisplaced {
                    function: name,
                    found_base: base,
                });
            }
            None if function_name.ends_with("Page") => {
                return Err(NamingViolation::ReservedSuffix {
                    function: function_name.to_string(),
                });
            }
            _ => {}
        }

        // page and error files hold exactly one function; layout files are free
        let required = match base.as_str() {
            "page" => Some(ReservedName::Page),
            "error" => Some(ReservedName::Error),
            _ => None,
        };
        if let Some(expected) = required {
            if reserved != Some(expected) {
                return Err(NamingViolation::UnexpectedFunction {
                    expected,
                    function: function_name.to_string(),
                });
            }
        }

        self.check_locale_shadowing(path, &base)
    }

    fn check_locale_shadowing(&self, path: &Path, base: &str) -> Result<(), NamingViolation> {
        let Some(dir) = path.parent() else {
            return Ok(());
        };

        let sidecar = dir.join(format!("{}.{}", base, SIDECAR_EXTENSION));
        if !sidecar.is_file() {
            return Ok(());
        }

        // only directories below the scan root take part in routing
        let in_locale_dir = segments_after_root(dir, &self.root_name)
            .iter()
            .any(|segment| segment == LOCALE_DIR);
        if !in_locale_dir {
            return Ok(());
        }

        let content = fs::read_to_string(&sidecar).map_err(|e| NamingViolation::InvalidSidecar {
            sidecar: sidecar.clone(),
            reason: e.to_string(),
        })?;
        let parsed: Sidecar =
            toml::from_str(&content).map_err(|e| NamingViolation::InvalidSidecar {
                sidecar: sidecar.clone(),
                reason: e.message().to_string(),
            })?;

        if parsed.dynamic_params.contains_key("locale") {
            return Err(NamingViolation::LocaleShadowing { sidecar });
        }

        Ok(())
    }
}
