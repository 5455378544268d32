//! Package Resolution
//!
//! Maps a template file's directory onto the import path, package name and
//! display name used by the generated registry.

use crate::alias::sanitize_identifier;
use crate::route::{is_dynamic_segment, segments_after_root};
use std::path::Path;

/// Import information for one template file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub import_path: String,
    pub package_name: String,
}

/// Resolves packages relative to the scan root of one module
#[derive(Debug, Clone)]
pub struct PackageResolver {
    module: String,
    root_name: String,
}

impl PackageResolver {
    pub fn new(module: impl Into<String>, root_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            root_name: root_name.into(),
        }
    }

    /// Resolve the package of a file in `dir` whose package clause declares
    /// `declared_package`.
    ///
    /// Files below the scan root get a package name derived from their
    /// directory, since directory names like `error-demo` are not valid
    /// identifiers on their own.
    pub fn resolve(&self, dir: &Path, declared_package: &str) -> ResolvedPackage {
        let sub_path = segments_after_root(dir, &self.root_name);

        let mut import_path = format!("{}/{}", self.module.trim_end_matches('/'), self.root_name);
        if !sub_path.is_empty() {
            import_path.push('/');
            import_path.push_str(&sub_path.join("/"));
        }

        let package_name = match sub_path.last() {
            Some(last) => sanitize_identifier(last),
            None => declared_package.to_string(),
        };

        ResolvedPackage {
            import_path,
            package_name,
        }
    }

    /// Display name such as `users.Page`; root-level functions keep their bare name
    pub fn human_name(&self, dir: &Path, function_name: &str) -> String {
        let leaf = segments_after_root(dir, &self.root_name)
            .into_iter()
            .filter(|s| !is_dynamic_segment(s))
            .last();

        match leaf {
            Some(leaf) => format!("{}.{}", leaf, function_name),
            None => function_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn resolver() -> PackageResolver {
        PackageResolver::new("github.com/test/project", "app")
    }

    #[test]
    fn test_root_package_keeps_declared_name() {
        let resolved = resolver().resolve(&PathBuf::from("/work/project/app"), "app");
        assert_eq!(resolved.import_path, "github.com/test/project/app");
        assert_eq!(resolved.package_name, "app");
    }

    #[test]
    fn test_nested_package_sanitized_from_directory() {
        let resolved =
            resolver().resolve(&PathBuf::from("/work/project/app/error-demo"), "errordemo");
        assert_eq!(resolved.import_path, "github.com/test/project/app/error-demo");
        assert_eq!(resolved.package_name, "errordemo");

        let resolved = resolver().resolve(&PathBuf::from("/work/project/app/v1.2"), "whatever");
        assert_eq!(resolved.import_path, "github.com/test/project/app/v1.2");
        assert_eq!(resolved.package_name, "v12");
    }

    #[test]
    fn test_deep_package() {
        let resolved = resolver().resolve(&PathBuf::from("/w/app/users/id_/posts"), "posts");
        assert_eq!(
            resolved.import_path,
            "github.com/test/project/app/users/id_/posts"
        );
        assert_eq!(resolved.package_name, "posts");

        let resolved = resolver().resolve(&PathBuf::from("/w/app/users/id_"), "id_");
        assert_eq!(resolved.package_name, "id_");
    }

    #[test]
    fn test_trailing_slash_module() {
        let resolved = PackageResolver::new("example.com/site/", "views")
            .resolve(&PathBuf::from("/srv/site/views/about"), "about");
        assert_eq!(resolved.import_path, "example.com/site/views/about");
    }

    #[test]
    fn test_human_name() {
        let r = resolver();
        assert_eq!(r.human_name(&PathBuf::from("/w/app"), "Page"), "Page");
        assert_eq!(
            r.human_name(&PathBuf::from("/w/app/users"), "Layout"),
            "users.Layout"
        );
        assert_eq!(
            r.human_name(&PathBuf::from("/w/app/users/id_"), "Page"),
            "users.Page"
        );
        assert_eq!(r.human_name(&PathBuf::from("/w/app/id_"), "Page"), "Page");
        assert_eq!(
            r.human_name(&PathBuf::from("/w/app/error-demo"), "Page"),
            "error-demo.Page"
        );
    }
}
