//! Descriptor model: metadata plus a component reference for one loaded kick.

use std::fmt;

use crate::authz::RoleSet;
use crate::protocol::ComponentRef;

/// One loaded extension, as validated and produced by the loader.
///
/// Descriptors are handed out behind `Arc` and are immutable after load;
/// re-loading a source yields a fresh list that fully replaces the old one.
pub struct ExtensionDescriptor {
    /// Opaque stable identifier, unique within one loaded set.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordering key; ties are broken by load order.
    pub position: f64,
    /// Roles allowed to see this kick. Empty means visible to everyone.
    pub required_roles: RoleSet,
    /// Renderable unit; the host renders it, never mutates it.
    pub component: ComponentRef,
}

impl fmt::Debug for ExtensionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("required_roles", &self.required_roles)
            .finish_non_exhaustive()
    }
}
