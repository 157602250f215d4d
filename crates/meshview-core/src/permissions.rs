use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Action required on a grant before its scope is offered in the dashboard.
pub const ACTION_API_GET: &str = "API_GET";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermissionGrant {
    pub runtime: String,
    pub namespace: String,
    #[serde(default)]
    pub actions: BTreeSet<String>,
}

impl PermissionGrant {
    pub fn allows_read(&self) -> bool {
        self.actions.contains(ACTION_API_GET)
    }
}

/// Distinct runtimes the user may read. Empty grants mean zero allowed
/// scopes, which is a valid displayable state rather than an error.
pub fn allowed_runtimes(grants: &[PermissionGrant]) -> BTreeSet<String> {
    grants
        .iter()
        .filter(|grant| grant.allows_read())
        .map(|grant| grant.runtime.clone())
        .collect()
}

/// Distinct namespaces the user may read under the given runtime.
pub fn allowed_namespaces(grants: &[PermissionGrant], runtime: &str) -> BTreeSet<String> {
    grants
        .iter()
        .filter(|grant| grant.runtime == runtime && grant.allows_read())
        .map(|grant| grant.namespace.clone())
        .collect()
}

pub fn can_read(grants: &[PermissionGrant], runtime: &str, namespace: &str) -> bool {
    grants
        .iter()
        .any(|grant| grant.runtime == runtime && grant.namespace == namespace && grant.allows_read())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(runtime: &str, namespace: &str, actions: &[&str]) -> PermissionGrant {
        PermissionGrant {
            runtime: runtime.to_string(),
            namespace: namespace.to_string(),
            actions: actions.iter().map(|action| action.to_string()).collect(),
        }
    }

    fn sample_grants() -> Vec<PermissionGrant> {
        vec![
            grant("primary", "default", &[ACTION_API_GET]),
            grant("primary", "payments", &[ACTION_API_GET, "DATA_PUBLISH"]),
            grant("primary", "restricted", &["DATA_PUBLISH"]),
            grant("edge", "default", &[ACTION_API_GET]),
            grant("edge", "default", &[ACTION_API_GET]),
        ]
    }

    #[test]
    fn runtimes_are_distinct_and_read_filtered() {
        let grants = sample_grants();
        let runtimes = allowed_runtimes(&grants);
        assert_eq!(
            runtimes.into_iter().collect::<Vec<_>>(),
            vec!["edge".to_string(), "primary".to_string()]
        );
    }

    #[test]
    fn namespaces_are_scoped_to_runtime() {
        let grants = sample_grants();
        let namespaces = allowed_namespaces(&grants, "primary");
        assert_eq!(
            namespaces.into_iter().collect::<Vec<_>>(),
            vec!["default".to_string(), "payments".to_string()]
        );
        assert!(allowed_namespaces(&grants, "unknown").is_empty());
    }

    #[test]
    fn projection_is_order_insensitive() {
        let grants = sample_grants();
        let mut reversed = grants.clone();
        reversed.reverse();
        assert_eq!(allowed_runtimes(&grants), allowed_runtimes(&reversed));
        assert_eq!(
            allowed_namespaces(&grants, "primary"),
            allowed_namespaces(&reversed, "primary")
        );
    }

    #[test]
    fn empty_grants_yield_empty_scopes() {
        assert!(allowed_runtimes(&[]).is_empty());
        assert!(allowed_namespaces(&[], "primary").is_empty());
        assert!(!can_read(&[], "primary", "default"));
    }

    #[test]
    fn read_check_requires_matching_scope_and_action() {
        let grants = sample_grants();
        assert!(can_read(&grants, "primary", "payments"));
        assert!(!can_read(&grants, "primary", "restricted"));
        assert!(!can_read(&grants, "edge", "payments"));
    }
}
