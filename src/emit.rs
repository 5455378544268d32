//! Registry Emission
//!
//! Renders the generated Go file and replaces the previous one on disk.

use crate::alias::ImportGroup;
use crate::error::{GenResult, GenerateError};
use crate::scanner::TemplateEntry;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the generated registry inside the output directory
pub const REGISTRY_FILE: &str = "registry.go";

/// Renders and writes the registry source file
#[derive(Debug, Clone)]
pub struct RegistryEmitter {
    package_name: String,
    module_name: String,
    generated_at: DateTime<Utc>,
}

impl RegistryEmitter {
    pub fn new(package_name: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            module_name: module_name.into(),
            generated_at: Utc::now(),
        }
    }

    /// Override the timestamp written into the provenance header
    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render the registry source
    pub fn render(&self, imports: &[ImportGroup], entries: &[TemplateEntry]) -> String {
        let mut sorted: Vec<&TemplateEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| a.route.cmp(&b.route));

        let mut output = String::new();

        output.push_str(&format!(
            "// Code generated by {} v{}. DO NOT EDIT.\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        output.push_str(&format!(
            "// Generated at: {}\n",
            self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        output.push_str(&format!("// Module: {}\n\n", self.module_name));

        output.push_str(&format!("package {}\n\n", self.package_name));

        if !imports.is_empty() {
            output.push_str("import (\n");
            for group in imports {
                output.push_str(&format!("\t{} {}\n", group.alias, go_string(&group.path)));
            }
            output.push_str(")\n\n");
        }

        output.push_str("// Registry holds the template lookup tables.\n");
        output.push_str("type Registry struct {\n");
        output.push_str("\t// Templates maps an opaque key to a template function.\n");
        output.push_str("\tTemplates map[string]interface{}\n");
        output.push_str("\t// Routes maps a route pattern to an opaque key.\n");
        output.push_str("\tRoutes map[string]string\n");
        output.push_str("}\n\n");

        output.push_str("// Templates maps an opaque key to a template function.\n");
        output.push_str("var Templates = map[string]interface{}{\n");
        for entry in &sorted {
            output.push_str(&format!(
                "\t{}: {}.{}, // {}\n",
                go_string(&entry.key),
                entry.package_alias,
                entry.function_name,
                describe(entry)
            ));
        }
        output.push_str("}\n\n");

        output.push_str("// Routes maps a route pattern to an opaque key.\n");
        output.push_str("var Routes = map[string]string{\n");
        for entry in &sorted {
            output.push_str(&format!(
                "\t{}: {},\n",
                go_string(&entry.route),
                go_string(&entry.key)
            ));
        }
        output.push_str("}\n\n");

        output.push_str("// NewRegistry assembles the lookup tables.\n");
        output.push_str("func NewRegistry() *Registry {\n");
        output.push_str("\treturn &Registry{\n");
        output.push_str("\t\tTemplates: Templates,\n");
        output.push_str("\t\tRoutes:    Routes,\n");
        output.push_str("\t}\n");
        output.push_str("}\n");

        output
    }

    /// Write `registry.go` into `output_dir`, replacing any previous file
    ///
    /// The old file is removed before the new one is written, so a failed
    /// write leaves no registry behind rather than a truncated one.
    pub fn write(
        &self,
        output_dir: &Path,
        imports: &[ImportGroup],
        entries: &[TemplateEntry],
    ) -> GenResult<PathBuf> {
        let emit_error = |path: &Path, source: io::Error| GenerateError::Emit {
            path: path.to_path_buf(),
            source,
        };

        fs::create_dir_all(output_dir).map_err(|e| emit_error(output_dir, e))?;

        let path = output_dir.join(REGISTRY_FILE);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(emit_error(&path, e)),
        }

        let content = self.render(imports, entries);
        fs::write(&path, content).map_err(|e| emit_error(&path, e))?;

        info!(
            path = %path.display(),
            entries = entries.len(),
            imports = imports.len(),
            "wrote registry"
        );

        Ok(path)
    }
}

/// Trailing comment for a table row
fn describe(entry: &TemplateEntry) -> String {
    match &entry.data {
        Some(data) => format!(
            "{} (data: {} via {})",
            entry.human_name, data.param_type, data.service_interface
        ),
        None => entry.human_name.clone(),
    }
}

/// Quote `value` as a Go interpreted string literal
fn go_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::allocate_aliases;
    use crate::dataservice::DataDescriptor;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(import_path: &str, package: &str, key: &str, route: &str, human: &str) -> TemplateEntry {
        TemplateEntry {
            file_path: PathBuf::from("/p/page_templ.go"),
            function_name: "Page".to_string(),
            package_name: package.to_string(),
            package_alias: String::new(),
            import_path: import_path.to_string(),
            key: key.to_string(),
            route: route.to_string(),
            human_name: human.to_string(),
            data: None,
        }
    }

    fn emitter() -> RegistryEmitter {
        RegistryEmitter::new("registry", "github.com/test/project")
            .with_timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_go_string() {
        assert_eq!(go_string("/users/{id}"), "\"/users/{id}\"");
        assert_eq!(go_string("a\"b"), "\"a\\\"b\"");
        assert_eq!(go_string("a\\b"), "\"a\\\\b\"");
    }

    #[test]
    fn test_render_header_and_imports() {
        let mut entries = vec![
            entry("github.com/test/project/app", "app", "k1", "/", "Page"),
            entry(
                "github.com/test/project/app/error-demo",
                "errordemo",
                "k2",
                "/error-demo",
                "error-demo.Page",
            ),
        ];
        let imports = allocate_aliases(&mut entries);
        let source = emitter().render(&imports, &entries);

        assert!(source.starts_with("// Code generated by routegen v"));
        assert!(source.contains("// Generated at: 2024-05-01T12:00:00Z\n"));
        assert!(source.contains("package registry\n"));
        assert!(source.contains("\tapp \"github.com/test/project/app\"\n"));
        assert!(source.contains("\terrordemo \"github.com/test/project/app/error-demo\"\n"));
        assert!(source.contains("\t\"k1\": app.Page, // Page\n"));
        assert!(source.contains("\t\"k2\": errordemo.Page, // error-demo.Page\n"));
        assert!(source.contains("\t\"/\": \"k1\",\n"));
        assert!(source.contains("\t\"/error-demo\": \"k2\",\n"));
        assert!(source.contains("func NewRegistry() *Registry {"));
    }

    #[test]
    fn test_render_sorted_by_route() {
        let mut entries = vec![
            entry("m/app/z", "z", "kz", "/z", "z.Page"),
            entry("m/app/a", "a", "ka", "/a", "a.Page"),
        ];
        let imports = allocate_aliases(&mut entries);
        let source = emitter().render(&imports, &entries);

        let a = source.find("\"/a\"").unwrap();
        let z = source.find("\"/z\"").unwrap();
        assert!(a < z);
    }

    #[test]
    fn test_render_data_comment() {
        let mut entries = vec![entry("m/app/users", "users", "k", "/users", "users.Page")];
        entries[0].data = Some(DataDescriptor {
            requires_data: true,
            service_interface: "UserDataService".to_string(),
            param_type: "UserData".to_string(),
        });
        let imports = allocate_aliases(&mut entries);
        let source = emitter().render(&imports, &entries);
        assert!(source.contains("// users.Page (data: UserData via UserDataService)"));
    }

    #[test]
    fn test_render_empty_registry() {
        let source = emitter().render(&[], &[]);
        assert!(source.contains("package registry\n"));
        assert!(!source.contains("import ("));
        assert!(source.contains("var Templates = map[string]interface{}{\n}\n"));
        assert!(source.contains("var Routes = map[string]string{\n}\n"));
        assert!(source.contains("func NewRegistry() *Registry {"));
    }

    #[test]
    fn test_write_creates_directory_and_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("internal").join("registry");

        let path = emitter().write(&out, &[], &[]).unwrap();
        assert_eq!(path, out.join(REGISTRY_FILE));
        assert!(path.exists());

        fs::write(&path, "stale").unwrap();
        let mut entries = vec![entry("m/app", "app", "k1", "/", "Page")];
        let imports = allocate_aliases(&mut entries);
        emitter().write(&out, &imports, &entries).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale"));
        assert!(content.contains("app.Page"));
    }

    #[test]
    fn test_write_fails_when_output_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("out");
        fs::write(&blocker, "not a directory").unwrap();

        let result = emitter().write(&blocker, &[], &[]);
        assert!(matches!(result, Err(GenerateError::Emit { .. })));
    }
}
