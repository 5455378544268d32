//! Import Alias Allocation
//!
//! Groups template entries by import path and assigns every group an
//! identifier-safe alias that no other import path in the registry uses.

use crate::scanner::TemplateEntry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Fallback identifier used when sanitizing leaves nothing usable
const FALLBACK_IDENT: &str = "pkg";

/// Go keywords; none of them can name a package or an import
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Names an import alias must not take in the generated file: the blank
/// identifier, the `string` type used by the tables, and the file's own
/// top-level declarations.
pub const RESERVED_ALIASES: &[&str] = &[
    "_",
    "string",
    "Registry",
    "Templates",
    "Routes",
    "NewRegistry",
];

/// One aliased import in the generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportGroup {
    pub alias: String,
    pub path: String,
}

/// Turn an arbitrary directory or package name into a valid identifier.
///
/// Hyphens and dots are removed, any other character outside
/// `[A-Za-z0-9_]` is dropped, a leading digit gets a `pkg` prefix and an
/// empty result becomes `pkg`.
pub fn sanitize_identifier(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if cleaned.is_empty() {
        return FALLBACK_IDENT.to_string();
    }

    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("{}{}", FALLBACK_IDENT, cleaned);
    }

    cleaned
}

pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Check whether `name` is usable as an identifier in the generated source
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    well_formed && !is_keyword(name)
}

/// Check whether `name` can be used as an import alias in the registry file
pub fn is_valid_alias(name: &str) -> bool {
    is_valid_identifier(name) && !RESERVED_ALIASES.contains(&name)
}

/// Alias candidate for a package name; keywords and reserved names get a
/// `pkg` suffix (`default` -> `defaultpkg`)
pub fn alias_candidate(package_name: &str) -> String {
    let base = sanitize_identifier(package_name);
    if is_valid_alias(&base) {
        base
    } else {
        format!("{}{}", base, FALLBACK_IDENT)
    }
}

/// Assigns collision-free aliases to import paths
#[derive(Debug, Default)]
pub struct ImportAliasAllocator {
    /// alias -> import path that claimed it
    claimed: HashMap<String, String>,
    /// import path -> final alias
    assigned: BTreeMap<String, String>,
}

impl ImportAliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an alias for `import_path`, preferring `package_name`.
    ///
    /// Repeated calls for the same import path return the alias assigned on
    /// the first call.
    pub fn claim(&mut self, import_path: &str, package_name: &str) -> String {
        if let Some(alias) = self.assigned.get(import_path) {
            return alias.clone();
        }

        let base = alias_candidate(package_name);
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.claimed.contains_key(&candidate) {
            candidate = format!("{}{}", base, counter);
            counter += 1;
        }

        self.claimed
            .insert(candidate.clone(), import_path.to_string());
        self.assigned
            .insert(import_path.to_string(), candidate.clone());
        candidate
    }

    /// Import groups sorted by import path
    pub fn groups(&self) -> Vec<ImportGroup> {
        self.assigned
            .iter()
            .map(|(path, alias)| ImportGroup {
                alias: alias.clone(),
                path: path.clone(),
            })
            .collect()
    }
}

/// Annotate every entry with its group's alias and return the sorted imports.
///
/// Groups claim aliases in first-seen order, so the entry list order decides
/// which import path keeps the bare package name on a collision.
pub fn allocate_aliases(entries: &mut [TemplateEntry]) -> Vec<ImportGroup> {
    let mut allocator = ImportAliasAllocator::new();

    for entry in entries.iter_mut() {
        entry.package_alias = allocator.claim(&entry.import_path, &entry.package_name);
    }

    allocator.groups()
}
