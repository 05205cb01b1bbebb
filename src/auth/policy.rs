//! Role-based access decisions by target path.

use crate::auth::claims::{Claims, Role};
use crate::config::PolicyRuleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

#[derive(Debug, Clone)]
struct PolicyRule {
    path_prefix: String,
    roles: Vec<Role>,
}

impl PolicyRule {
    /// Prefix match on whole path segments: `/api/admin` covers
    /// `/api/admin` and `/api/admin/users`, not `/api/administrators`.
    fn covers(&self, path: &str) -> bool {
        let prefix = self.path_prefix.trim_end_matches('/');
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.is_empty(),
            None => false,
        }
    }
}

/// Ordered set of role rules. The most specific (longest) matching prefix
/// decides; paths no rule covers are allowed.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<PolicyRule>,
}

impl AccessPolicy {
    pub fn from_config(rules: &[PolicyRuleConfig]) -> Self {
        let mut rules: Vec<PolicyRule> = rules
            .iter()
            .map(|r| PolicyRule {
                path_prefix: r.path_prefix.clone(),
                roles: r.roles.clone(),
            })
            .collect();
        rules.sort_by(|a, b| b.path_prefix.len().cmp(&a.path_prefix.len()));
        Self { rules }
    }

    pub fn decide(&self, path: &str, claims: &Claims) -> Decision {
        match self.rules.iter().find(|rule| rule.covers(path)) {
            Some(rule) if !rule.roles.contains(&claims.role) => Decision::Deny,
            _ => Decision::Allow,
        }
    }
}
