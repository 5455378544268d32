//! Route Synthesis
//!
//! Derives URL route patterns from the directory a template file lives in.
//! Only the path matters; file contents are never consulted.

use crate::naming::ReservedName;
use std::path::Path;

/// Trailing character marking a directory as a dynamic URL parameter
pub const DYNAMIC_MARKER: char = '_';

/// Convert a camel or Pascal case name to lower snake_case.
///
/// An underscore is inserted before every uppercase letter except the first
/// character; non-letters pass through unchanged.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// A segment like `id_` denotes the dynamic parameter `{id}`
pub fn is_dynamic_segment(segment: &str) -> bool {
    segment.len() > DYNAMIC_MARKER.len_utf8() && segment.ends_with(DYNAMIC_MARKER)
}

/// Transform one directory name into its route form
pub fn transform_segment(segment: &str) -> String {
    if is_dynamic_segment(segment) {
        format!("{{{}}}", segment.trim_end_matches(DYNAMIC_MARKER))
    } else {
        to_snake_case(segment)
    }
}

/// Directory segments after the rightmost occurrence of `root_name`.
///
/// Returns an empty list when the directory is the scan root itself or when
/// no segment matches.
pub fn segments_after_root(dir: &Path, root_name: &str) -> Vec<String> {
    let segments: Vec<String> = dir
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();

    match segments.iter().rposition(|s| s == root_name) {
        Some(anchor) => segments[anchor + 1..].to_vec(),
        None => Vec::new(),
    }
}

/// Route suffix contributed by the function name
fn function_suffix(function_name: &str) -> String {
    match ReservedName::from_function(function_name) {
        Some(ReservedName::Page) => String::new(),
        Some(ReservedName::Layout) => "/layout".to_string(),
        Some(ReservedName::Error) => "/error".to_string(),
        None => format!("/{}", to_snake_case(function_name)),
    }
}

/// Build the route pattern for `function_name` declared in a file under `dir`
pub fn synthesize_route(dir: &Path, function_name: &str, root_name: &str) -> String {
    let cleaned: Vec<String> = segments_after_root(dir, root_name)
        .iter()
        .filter(|s| s.as_str() != root_name)
        .map(|s| transform_segment(s))
        .collect();

    let suffix = function_suffix(function_name);

    if cleaned.is_empty() {
        return if suffix.is_empty() {
            "/".to_string()
        } else {
            suffix
        };
    }

    format!("/{}{}", cleaned.join("/"), suffix)
}
