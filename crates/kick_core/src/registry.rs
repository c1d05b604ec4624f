//! Tracks loaded kick bundles per source and mounts instances.

use std::sync::Arc;

use tracing::{info, warn};

use crate::authz::{self, RoleSet};
use crate::descriptor::ExtensionDescriptor;
use crate::lifecycle::KickInstance;
use crate::loader::{self, LoadError, ModuleResolver};
use crate::services::HostServices;

struct SourceEntry {
    url: String,
    descriptors: Vec<Arc<ExtensionDescriptor>>,
}

/// Host-side registry over one resolver and any number of bundle sources.
///
/// Each source owns its descriptor list; re-loading a source fully replaces
/// that list, and a failing load leaves every other source untouched.
pub struct KickRegistry {
    resolver: Box<dyn ModuleResolver>,
    services: HostServices,
    sources: Vec<SourceEntry>,
}

impl KickRegistry {
    pub fn new(resolver: Box<dyn ModuleResolver>, services: HostServices) -> Self {
        Self {
            resolver,
            services,
            sources: Vec::new(),
        }
    }

    /// Loads (or reloads) one bundle, returning how many kicks it registered.
    pub fn load_source(&mut self, source_url: &str) -> Result<usize, LoadError> {
        let descriptors = loader::load(self.resolver.as_ref(), source_url)?;
        let count = descriptors.len();
        match self.sources.iter_mut().find(|entry| entry.url == source_url) {
            Some(entry) => entry.descriptors = descriptors,
            None => self.sources.push(SourceEntry {
                url: source_url.to_string(),
                descriptors,
            }),
        }
        info!(stage = "load", source = source_url, kicks = count);
        Ok(count)
    }

    /// Forgets a source and its descriptors. Returns false if it was unknown.
    pub fn unload_source(&mut self, source_url: &str) -> bool {
        let before = self.sources.len();
        self.sources.retain(|entry| entry.url != source_url);
        before != self.sources.len()
    }

    /// All loaded descriptors, ordered by position; ties fall back to load
    /// order (source arrival, then in-source order).
    pub fn descriptors(&self) -> Vec<Arc<ExtensionDescriptor>> {
        let mut all: Vec<Arc<ExtensionDescriptor>> = self
            .sources
            .iter()
            .flat_map(|entry| entry.descriptors.iter().cloned())
            .collect();
        all.sort_by(|a, b| a.position.total_cmp(&b.position));
        all
    }

    /// Descriptors visible to an actor holding `actor_roles`.
    pub fn visible_to(&self, actor_roles: &RoleSet) -> Vec<Arc<ExtensionDescriptor>> {
        authz::visible_to(actor_roles, &self.descriptors())
    }

    /// Mounts the kick with `id` if it exists and the actor may see it.
    pub fn mount(&self, id: &str, actor_roles: &RoleSet) -> Option<KickInstance> {
        let descriptor = self
            .visible_to(actor_roles)
            .into_iter()
            .find(|descriptor| descriptor.id == id);
        match descriptor {
            Some(descriptor) => Some(KickInstance::mount(descriptor, self.services.clone())),
            None => {
                warn!(kick = id, "mount refused: unknown or not visible to actor");
                None
            }
        }
    }
}
