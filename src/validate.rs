//! Post-scan validation
//!
//! Checks the invariants of the full entry set before anything is written.

use crate::alias::{is_valid_alias, ImportGroup};
use crate::error::{GenResult, GenerateError};
use crate::scanner::TemplateEntry;
use std::collections::HashMap;

/// Reject duplicate keys, duplicate routes and unusable aliases
pub fn validate_registry(entries: &[TemplateEntry], imports: &[ImportGroup]) -> GenResult<()> {
    check_unique(entries, |e| &e.key, |key, first, second| {
        GenerateError::DuplicateKey {
            key,
            first,
            second,
        }
    })?;

    check_unique(entries, |e| &e.route, |route, first, second| {
        GenerateError::DuplicateRoute {
            route,
            first,
            second,
        }
    })?;

    let mut alias_owners: HashMap<&str, &str> = HashMap::new();
    for group in imports {
        if !is_valid_alias(&group.alias) {
            return Err(GenerateError::InvalidAlias {
                alias: group.alias.clone(),
                import_path: group.path.clone(),
            });
        }
        if let Some(first) = alias_owners.insert(&group.alias, &group.path) {
            return Err(GenerateError::AliasCollision {
                alias: group.alias.clone(),
                first: first.to_string(),
                second: group.path.clone(),
            });
        }
    }

    Ok(())
}

fn check_unique<F, E>(entries: &[TemplateEntry], field: F, error: E) -> GenResult<()>
where
    F: Fn(&TemplateEntry) -> &String,
    E: Fn(String, String, String) -> GenerateError,
{
    let mut seen: HashMap<&str, &TemplateEntry> = HashMap::new();

    for entry in entries {
        let value = field(entry);
        if let Some(previous) = seen.insert(value.as_str(), entry) {
            return Err(error(
                value.clone(),
                describe(previous),
                describe(entry),
            ));
        }
    }

    Ok(())
}

fn describe(entry: &TemplateEntry) -> String {
    format!("{} in {}", entry.function_name, entry.file_path.display())
}
