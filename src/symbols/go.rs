//! Go Symbol Source
//!
//! Reads `_templ.go` files below a scan root and extracts their package
//! clause, imports and top-level functions with tree-sitter.

use super::{
    FunctionDecl, ImportDecl, Param, Selection, SourceFile, SymbolSnapshot, SymbolSource,
    TypeRef, TEMPLATE_SUFFIX,
};
use crate::error::SourceError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tree_sitter::{Node, Parser};
use walkdir::WalkDir;

/// Loads template symbols from Go sources on disk
#[derive(Debug, Clone)]
pub struct GoSymbolSource {
    root: PathBuf,
}

impl GoSymbolSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every template file below the root, sorted by path
    fn walk_all(&self) -> Result<Vec<PathBuf>, SourceError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| SourceError::Walk {
                path: self.root.clone(),
                reason: e.to_string(),
            })?;

            if entry.file_type().is_file() && is_template_file(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        Ok(files)
    }

    /// Template files directly inside `root/dir`, without descending further
    fn list_package(&self, dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let package_dir = self.root.join(dir);
        let read_dir = fs::read_dir(&package_dir).map_err(|e| SourceError::Read {
            path: package_dir.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| SourceError::Read {
                path: package_dir.clone(),
                source: e,
            })?;
            let path = entry.path();
            if path.is_file() && is_template_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

impl SymbolSource for GoSymbolSource {
    fn load(&self, selection: &Selection) -> Result<SymbolSnapshot, SourceError> {
        fs::metadata(&self.root).map_err(|e| SourceError::RootNotFound {
            path: self.root.clone(),
            source: e,
        })?;

        let paths = match selection {
            Selection::All => self.walk_all()?,
            Selection::Package(dir) => self.list_package(dir)?,
        };

        let mut parser = go_parser()?;
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let content = fs::read_to_string(&path).map_err(|e| SourceError::Read {
                path: path.clone(),
                source: e,
            })?;
            let file = parse_source(&mut parser, &path, &content)?;
            debug!(
                path = %path.display(),
                package = %file.package,
                functions = file.functions.len(),
                "parsed template file"
            );
            files.push(file);
        }

        Ok(SymbolSnapshot::new(files))
    }
}

fn is_template_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.ends_with(TEMPLATE_SUFFIX))
        .unwrap_or(false)
}

/// Create a parser configured for Go
pub fn go_parser() -> Result<Parser, SourceError> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
    Ok(parser)
}

/// Parse one Go file into its declarations
pub fn parse_source(
    parser: &mut Parser,
    path: &Path,
    content: &str,
) -> Result<SourceFile, SourceError> {
    let parse_error = |reason: &str| SourceError::Parse {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| parse_error("parser returned no tree"))?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(parse_error("syntax error"));
    }

    let mut package = None;
    let mut imports = Vec::new();
    let mut functions = Vec::new();

    let mut cursor = root.walk();
    for node in root.children(&mut cursor) {
        match node.kind() {
            "package_clause" => {
                package = extract_package_name(&node, content);
            }
            "import_declaration" => {
                imports.extend(extract_imports(&node, content));
            }
            "function_declaration" | "method_declaration" => {
                if let Some(decl) = extract_function(&node, content) {
                    functions.push(decl);
                }
            }
            _ => {}
        }
    }

    let package = package.ok_or_else(|| parse_error("missing package clause"))?;

    for decl in &mut functions {
        for param in &mut decl.params {
            resolve_type(&mut param.ty, &imports);
        }
    }

    Ok(SourceFile {
        path: path.to_path_buf(),
        package,
        imports,
        functions,
    })
}

fn extract_package_name(node: &Node, source: &str) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .children(&mut cursor)
        .find(|child| child.kind() == "package_identifier")
        .map(|child| node_text(&child, source));
    name
}

fn extract_imports(node: &Node, source: &str) -> Vec<ImportDecl> {
    let mut imports = Vec::new();
    let mut cursor = node.walk();

    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_spec" => imports.extend(extract_import_spec(&child, source)),
            "import_spec_list" => {
                let mut inner_cursor = child.walk();
                for spec in child.children(&mut inner_cursor) {
                    if spec.kind() == "import_spec" {
                        imports.extend(extract_import_spec(&spec, source));
                    }
                }
            }
            _ => {}
        }
    }

    imports
}

fn extract_import_spec(node: &Node, source: &str) -> Option<ImportDecl> {
    let path_node = node.child_by_field_name("path")?;
    let path = node_text(&path_node, source)
        .trim_matches(|c: char| c == '"' || c == '`')
        .to_string();
    let alias = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source));

    Some(ImportDecl { path, alias })
}

fn extract_function(node: &Node, source: &str) -> Option<FunctionDecl> {
    let name_node = node.child_by_field_name("name")?;
    let params = node
        .child_by_field_name("parameters")
        .map(|list| extract_params(&list, source))
        .unwrap_or_default();

    Some(FunctionDecl {
        name: node_text(&name_node, source),
        is_method: node.kind() == "method_declaration",
        params,
        line: node.start_position().row + 1,
    })
}

/// One [`Param`] per declared name; `a, b string` yields two
fn extract_params(list: &Node, source: &str) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = list.walk();

    for decl in list.children(&mut cursor) {
        if decl.kind() != "parameter_declaration"
            && decl.kind() != "variadic_parameter_declaration"
        {
            continue;
        }

        let Some(type_node) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut raw = node_text(&type_node, source);
        if decl.kind() == "variadic_parameter_declaration" {
            raw = format!("...{}", raw);
        }
        let ty = TypeRef::parse(&raw);

        let mut name_cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut name_cursor)
            .map(|n| node_text(&n, source))
            .collect();

        if names.is_empty() {
            params.push(Param {
                name: None,
                ty: ty.clone(),
            });
        } else {
            for name in names {
                params.push(Param {
                    name: Some(name),
                    ty: ty.clone(),
                });
            }
        }
    }

    params
}

fn resolve_type(ty: &mut TypeRef, imports: &[ImportDecl]) {
    if let Some(qualifier) = &ty.qualifier {
        ty.package_path = imports
            .iter()
            .find(|i| i.local_name() == qualifier)
            .map(|i| i.path.clone());
    }
}

/// Get text content of a node
fn node_text(node: &Node, source: &str) -> String {
    let start = node.start_byte();
    let end = node.end_byte();
    source[start..end].to_string()
}
