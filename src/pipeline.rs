//! Generation pipeline
//!
//! Scan, allocate aliases, validate and emit, strictly in that order.
//! Nothing is written unless every step before emission succeeds.

use crate::alias::{allocate_aliases, ImportGroup};
use crate::config::GeneratorConfig;
use crate::dataservice::{DataServiceDetector, SuffixHeuristic};
use crate::emit::RegistryEmitter;
use crate::error::{GenResult, SourceError};
use crate::naming::ScanWarning;
use crate::scanner::{Scanner, TemplateEntry};
use crate::symbols::{GoSymbolSource, SymbolSource};
use crate::validate::validate_registry;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of a successful run
#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub output_path: PathBuf,
    pub entries: Vec<TemplateEntry>,
    pub imports: Vec<ImportGroup>,
    pub warnings: Vec<ScanWarning>,
}

/// Runs the pipeline for one configuration
pub struct Generator<'a> {
    config: &'a GeneratorConfig,
    detector: Box<dyn DataServiceDetector + 'a>,
}

impl<'a> Generator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            detector: Box::new(SuffixHeuristic::default()),
        }
    }

    /// Replace the default name-based data service detector
    pub fn with_detector(mut self, detector: impl DataServiceDetector + 'a) -> Self {
        self.detector = Box::new(detector);
        self
    }

    /// Run against the Go sources below the configured scan root
    pub fn run(&self) -> GenResult<GenerateReport> {
        self.config.validate()?;
        let root = resolve_root(&self.config.scan_root)?;
        let source = GoSymbolSource::new(&root);
        self.run_with(&root, &source)
    }

    /// Run against an explicit symbol source
    ///
    /// `root` must be the absolute scan root the source's paths live under.
    pub fn run_with(&self, root: &Path, source: &dyn SymbolSource) -> GenResult<GenerateReport> {
        self.config.validate()?;

        let snapshot = source.load(&self.config.selection)?;
        debug!(
            files = snapshot.files.len(),
            functions = snapshot.function_count(),
            "loaded symbol snapshot"
        );

        let scanner = Scanner::new(
            root,
            &self.config.module_name,
            self.config.key_strategy,
            self.detector.as_ref(),
        )?;
        let scan = scanner.scan(&snapshot)?;

        let mut entries = scan.entries;
        let imports = allocate_aliases(&mut entries);
        validate_registry(&entries, &imports)?;

        let emitter = RegistryEmitter::new(&self.config.package_name, &self.config.module_name);
        let output_path = emitter.write(&self.config.output_dir, &imports, &entries)?;

        info!(
            entries = entries.len(),
            warnings = scan.warnings.len(),
            "generation finished"
        );

        Ok(GenerateReport {
            output_path,
            entries,
            imports,
            warnings: scan.warnings,
        })
    }
}

/// Absolute form of the scan root; it must exist
fn resolve_root(scan_root: &Path) -> Result<PathBuf, SourceError> {
    scan_root
        .canonicalize()
        .map_err(|e| SourceError::RootNotFound {
            path: scan_root.to_path_buf(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataservice::NoDataServices;
    use crate::error::{ConfigError, GenerateError};
    use crate::symbols::{FunctionDecl, Selection, SourceFile, SymbolSnapshot};
    use std::fs;
    use tempfile::TempDir;

    /// Serves a fixed snapshot
    struct FixedSource(SymbolSnapshot);

    impl SymbolSource for FixedSource {
        fn load(&self, _selection: &Selection) -> Result<SymbolSnapshot, SourceError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails to load
    struct BrokenSource;

    impl SymbolSource for BrokenSource {
        fn load(&self, _selection: &Selection) -> Result<SymbolSnapshot, SourceError> {
            Err(SourceError::Walk {
                path: PathBuf::from("/project/app"),
                reason: "permission denied".to_string(),
            })
        }
    }

    fn page(path: &str, package: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(path),
            package: package.to_string(),
            imports: vec![],
            functions: vec![FunctionDecl {
                name: "Page".to_string(),
                is_method: false,
                params: vec![],
                line: 3,
            }],
        }
    }

    fn config(out: &Path) -> GeneratorConfig {
        GeneratorConfig::new("/project/app", out, "github.com/test/project", "registry")
    }

    #[test]
    fn test_run_with_fixed_source() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let config = config(&out);
        let source = FixedSource(SymbolSnapshot::new(vec![
            page("/project/app/page_templ.go", "app"),
            page("/project/app/about/page_templ.go", "about"),
        ]));

        let report = Generator::new(&config)
            .with_detector(NoDataServices)
            .run_with(Path::new("/project/app"), &source)
            .unwrap();

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.imports.len(), 2);
        assert!(report.output_path.exists());
        let content = fs::read_to_string(&report.output_path).unwrap();
        assert!(content.contains("about.Page"));
    }

    #[test]
    fn test_invalid_config_fails_before_scanning() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = config(&temp_dir.path().join("out"));
        config.package_name = "bad-name".to_string();

        let result = Generator::new(&config).run_with(Path::new("/project/app"), &BrokenSource);
        assert!(matches!(
            result,
            Err(GenerateError::Config(ConfigError::InvalidPackageName(_)))
        ));
    }

    #[test]
    fn test_source_failure_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let config = config(&out);

        let result = Generator::new(&config).run_with(Path::new("/project/app"), &BrokenSource);
        assert!(matches!(result, Err(GenerateError::Source(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_duplicate_route_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");
        let config = config(&out);
        // The nested `app` directory maps back onto the root route
        let source = FixedSource(SymbolSnapshot::new(vec![
            page("/project/app/page_templ.go", "app"),
            page("/project/app/nested/app/page_templ.go", "app"),
        ]));

        let result = Generator::new(&config).run_with(Path::new("/project/app"), &source);
        assert!(matches!(result, Err(GenerateError::DuplicateRoute { .. })));
        assert!(!out.join(crate::emit::REGISTRY_FILE).exists());
    }

    #[test]
    fn test_missing_scan_root() {
        let temp_dir = TempDir::new().unwrap();
        let config = GeneratorConfig::new(
            temp_dir.path().join("missing"),
            temp_dir.path().join("out"),
            "github.com/test/project",
            "registry",
        );
        let result = Generator::new(&config).run();
        assert!(matches!(
            result,
            Err(GenerateError::Source(SourceError::RootNotFound { .. }))
        ));
    }
}
