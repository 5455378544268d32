//! Template Scanner
//!
//! Walks a symbol snapshot and turns every eligible template function into a
//! [`TemplateEntry`]. Naming problems become warnings; a file outside the
//! scan root aborts the scan.

use crate::dataservice::{DataDescriptor, DataServiceDetector};
use crate::error::{ConfigError, GenResult, GenerateError};
use crate::keys::KeyStrategy;
use crate::naming::{template_base_name, NamingValidator, ReservedName, ScanWarning};
use crate::package::PackageResolver;
use crate::route::synthesize_route;
use crate::symbols::{FunctionDecl, SymbolSnapshot};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// One discovered template function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateEntry {
    pub file_path: PathBuf,
    pub function_name: String,
    pub package_name: String,
    /// Filled in by alias allocation
    pub package_alias: String,
    pub import_path: String,
    pub key: String,
    pub route: String,
    pub human_name: String,
    pub data: Option<DataDescriptor>,
}

/// Entries and warnings collected by one scan
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub entries: Vec<TemplateEntry>,
    pub warnings: Vec<ScanWarning>,
}

/// Why a declared function is left out of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exclusion {
    Method,
    Unexported,
    Parameterized,
}

/// Turns symbol snapshots into template entries
pub struct Scanner<'a> {
    root: PathBuf,
    root_name: String,
    resolver: PackageResolver,
    validator: NamingValidator,
    keys: KeyStrategy,
    detector: &'a dyn DataServiceDetector,
}

impl<'a> Scanner<'a> {
    /// Create a scanner for the (absolute) scan root of `module`
    pub fn new(
        root: impl Into<PathBuf>,
        module: &str,
        keys: KeyStrategy,
        detector: &'a dyn DataServiceDetector,
    ) -> GenResult<Self> {
        let root = root.into();
        let root_name = root
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .ok_or_else(|| ConfigError::UnnamedScanRoot(root.clone()))?;

        Ok(Self {
            resolver: PackageResolver::new(module, root_name.clone()),
            validator: NamingValidator::new(root_name.clone()),
            root,
            root_name,
            keys,
            detector,
        })
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Scan every template file in the snapshot
    ///
    /// # Errors
    /// Fails if a file lies outside the scan root. Naming violations are
    /// returned as warnings instead.
    pub fn scan(&self, snapshot: &SymbolSnapshot) -> GenResult<ScanOutput> {
        let mut output = ScanOutput::default();

        for file in &snapshot.files {
            if template_base_name(&file.path).is_none() {
                debug!(path = %file.path.display(), "not a template file");
                continue;
            }

            if !is_within(&file.path, &self.root) {
                return Err(GenerateError::OutsideScanRoot {
                    path: file.path.clone(),
                    root: self.root.clone(),
                });
            }

            let dir = file.path.parent().unwrap_or(&self.root);

            for func in &file.functions {
                if let Some(reason) = exclusion(func) {
                    debug!(
                        path = %file.path.display(),
                        function = %func.name,
                        ?reason,
                        "skipping function"
                    );
                    continue;
                }

                if let Err(violation) = self.validator.validate(&file.path, &func.name) {
                    output.warnings.push(ScanWarning {
                        file: file.path.clone(),
                        function: func.name.clone(),
                        violation,
                    });
                    continue;
                }

                output
                    .entries
                    .push(self.build_entry(&file.path, dir, &file.package, func));
            }
        }

        Ok(output)
    }

    fn build_entry(
        &self,
        path: &Path,
        dir: &Path,
        declared_package: &str,
        func: &FunctionDecl,
    ) -> TemplateEntry {
        let resolved = self.resolver.resolve(dir, declared_package);
        let key = self.keys.key_for(&resolved.import_path, &func.name);

        let data = match ReservedName::from_function(&func.name) {
            Some(_) => func
                .params
                .first()
                .and_then(|param| self.detector.detect(&param.ty)),
            None => None,
        };

        TemplateEntry {
            file_path: path.to_path_buf(),
            function_name: func.name.clone(),
            package_name: resolved.package_name,
            package_alias: String::new(),
            import_path: resolved.import_path,
            key,
            route: synthesize_route(dir, &func.name, &self.root_name),
            human_name: self.resolver.human_name(dir, &func.name),
            data,
        }
    }
}

/// `starts_with` compares lexically, so `root/../x` would pass it alone
fn is_within(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
        && !path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
}

/// Parameterized functions are only kept for reserved names
fn exclusion(func: &FunctionDecl) -> Option<Exclusion> {
    if func.is_method {
        return Some(Exclusion::Method);
    }
    if !func.is_exported() {
        return Some(Exclusion::Unexported);
    }
    if !func.params.is_empty() && ReservedName::from_function(&func.name).is_none() {
        return Some(Exclusion::Parameterized);
    }
    None
}
