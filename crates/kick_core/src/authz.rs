//! Role-based visibility filtering.
//!
//! Roles are opaque strings; the rule is pure set intersection, so visibility
//! is a provable property of the two sets rather than a convention.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::descriptor::ExtensionDescriptor;

/// A set of role grants with explicit intersection semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn insert(&mut self, role: impl Into<String>) {
        self.0.insert(role.into());
    }

    /// True when the two sets share at least one role. Any single matching
    /// role suffices; nothing requires all roles to match.
    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.iter().any(|role| other.0.contains(role))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for role in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(role)?;
            first = false;
        }
        Ok(())
    }
}

/// Filters `descriptors` down to those visible to an actor holding
/// `actor_roles`.
///
/// A kick with no required roles is always visible; otherwise the actor needs
/// any one of the required roles. Relative order among the survivors is
/// preserved.
pub fn visible_to(
    actor_roles: &RoleSet,
    descriptors: &[Arc<ExtensionDescriptor>],
) -> Vec<Arc<ExtensionDescriptor>> {
    descriptors
        .iter()
        .filter(|descriptor| {
            descriptor.required_roles.is_empty()
                || descriptor.required_roles.intersects(actor_roles)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ExtensionProps;
    use crate::Component;

    struct Inert;

    impl Component for Inert {
        fn mount(&self, _props: ExtensionProps) {}
    }

    fn descriptor(id: &str, position: f64, roles: &[&str]) -> Arc<ExtensionDescriptor> {
        Arc::new(ExtensionDescriptor {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            position,
            required_roles: roles.iter().copied().collect(),
            component: Arc::new(Inert),
        })
    }

    #[test]
    fn intersection_needs_only_one_match() {
        let required: RoleSet = ["editor", "admin"].into_iter().collect();
        let actor: RoleSet = ["admin"].into_iter().collect();
        assert!(required.intersects(&actor));
        let stranger: RoleSet = ["viewer"].into_iter().collect();
        assert!(!required.intersects(&stranger));
    }

    #[test]
    fn roleless_descriptors_pass_through_unchanged() {
        let descriptors = vec![
            descriptor("a", 2.0, &[]),
            descriptor("b", 1.0, &[]),
            descriptor("c", 3.0, &[]),
        ];
        let visible = visible_to(&RoleSet::new(), &descriptors);
        let ids: Vec<_> = visible.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let descriptors = vec![
            descriptor("first", 1.0, &["editor"]),
            descriptor("second", 2.0, &[]),
            descriptor("third", 3.0, &["editor", "viewer"]),
            descriptor("fourth", 4.0, &["admin"]),
        ];
        let actor: RoleSet = ["viewer"].into_iter().collect();
        let visible = visible_to(&actor, &descriptors);
        let ids: Vec<_> = visible.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["second", "third"]);
    }

    #[test]
    fn viewer_only_sees_roleless_kick() {
        let descriptors = vec![
            descriptor("locked", 1.0, &["editor"]),
            descriptor("open", 2.0, &[]),
        ];
        let actor: RoleSet = ["viewer"].into_iter().collect();
        let visible = visible_to(&actor, &descriptors);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "open");
    }
}
