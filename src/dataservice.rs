//! Data Service Detection
//!
//! Reserved template functions may take a data argument that the runtime
//! fills from an injected service. Which service that is cannot be proven
//! from syntax alone, so detection goes through the [`DataServiceDetector`]
//! trait. [`SuffixHeuristic`] is the default and only looks at names.

use crate::symbols::TypeRef;
use serde::{Deserialize, Serialize};

/// Suffix appended to the base name to form a service interface name
pub const SERVICE_SUFFIX: &str = "DataService";

/// Inferred data dependency of a template function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDescriptor {
    pub requires_data: bool,
    /// Interface the runtime is expected to provide, e.g. `UserDataService`
    pub service_interface: String,
    /// Type of the first parameter, e.g. `UserData`
    pub param_type: String,
}

/// Decides whether a parameter type maps to an injected data service
pub trait DataServiceDetector {
    fn detect(&self, param: &TypeRef) -> Option<DataDescriptor>;
}

/// Name-based detector
///
/// A type qualifies when its name ends in one of `type_suffixes` or its
/// import path contains one of `path_segments`.
#[derive(Debug, Clone)]
pub struct SuffixHeuristic {
    pub type_suffixes: Vec<String>,
    pub path_segments: Vec<String>,
}

impl Default for SuffixHeuristic {
    fn default() -> Self {
        Self {
            type_suffixes: vec!["Data".into(), "Model".into(), "Entity".into()],
            path_segments: vec!["services".into(), "dataservice".into()],
        }
    }
}

impl SuffixHeuristic {
    fn matching_suffix(&self, name: &str) -> Option<&str> {
        self.type_suffixes
            .iter()
            .map(String::as_str)
            .find(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
    }

    fn in_service_area(&self, package_path: Option<&str>) -> bool {
        package_path
            .map(|path| {
                path.split('/')
                    .any(|segment| self.path_segments.iter().any(|s| s == segment))
            })
            .unwrap_or(false)
    }
}

impl DataServiceDetector for SuffixHeuristic {
    fn detect(&self, param: &TypeRef) -> Option<DataDescriptor> {
        let base = match self.matching_suffix(&param.name) {
            Some(suffix) => &param.name[..param.name.len() - suffix.len()],
            None if self.in_service_area(param.package_path.as_deref()) => param.name.as_str(),
            None => return None,
        };

        Some(DataDescriptor {
            requires_data: true,
            service_interface: format!("{}{}", base, SERVICE_SUFFIX),
            param_type: param.name.clone(),
        })
    }
}

/// Detector that never infers a dependency
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDataServices;

impl DataServiceDetector for NoDataServices {
    fn detect(&self, _param: &TypeRef) -> Option<DataDescriptor> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_ref(raw: &str, package_path: Option<&str>) -> TypeRef {
        let mut ty = TypeRef::parse(raw);
        ty.package_path = package_path.map(String::from);
        ty
    }

    #[test]
    fn test_suffix_swapped_for_service() {
        let detector = SuffixHeuristic::default();

        let found = detector.detect(&type_ref("*models.UserData", None)).unwrap();
        assert!(found.requires_data);
        assert_eq!(found.service_interface, "UserDataService");
        assert_eq!(found.param_type, "UserData");

        let found = detector.detect(&type_ref("OrderModel", None)).unwrap();
        assert_eq!(found.service_interface, "OrderDataService");

        let found = detector.detect(&type_ref("ProductEntity", None)).unwrap();
        assert_eq!(found.service_interface, "ProductDataService");
    }

    #[test]
    fn test_service_area_path() {
        let detector = SuffixHeuristic::default();
        let found = detector
            .detect(&type_ref(
                "accounts.Account",
                Some("github.com/acme/site/services/accounts"),
            ))
            .unwrap();
        assert_eq!(found.service_interface, "AccountDataService");
        assert_eq!(found.param_type, "Account");
    }

    #[test]
    fn test_unrelated_types_ignored() {
        let detector = SuffixHeuristic::default();
        assert!(detector.detect(&type_ref("string", None)).is_none());
        assert!(detector.detect(&type_ref("error", None)).is_none());
        assert!(detector
            .detect(&type_ref("ui.Props", Some("github.com/acme/site/ui")))
            .is_none());
        // A bare suffix has no base name to build a service from
        assert!(detector.detect(&type_ref("Data", None)).is_none());
    }

    #[test]
    fn test_substring_is_not_a_segment() {
        let detector = SuffixHeuristic::default();
        assert!(detector
            .detect(&type_ref("x.Thing", Some("github.com/acme/microservices")))
            .is_none());
    }

    #[test]
    fn test_no_data_services() {
        assert!(NoDataServices
            .detect(&type_ref("UserData", None))
            .is_none());
    }
}
