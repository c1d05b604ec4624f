//! Resolves kick bundles and validates their registration payloads.
//!
//! Resolution itself is a black box behind [`ModuleResolver`]: given a source
//! URL it yields a loaded module exposing named entry points. The loader
//! invokes the registration entry point, validates the returned payload
//! element by element, and produces descriptors. One malformed kick never
//! takes down its siblings; a broken registration surface fails the whole
//! load with a typed error.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::authz::RoleSet;
use crate::descriptor::ExtensionDescriptor;
use crate::protocol::{RawValue, KICKS_KEY, REGISTRATION_ENTRY, USER_ROLES_KEY};

/// Yields loaded modules for source URLs.
///
/// The bundling and fetching mechanism behind this trait is deployment
/// machinery and not part of the protocol; only the entry-point surface of
/// the returned module is.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, source_url: &str) -> anyhow::Result<Box<dyn ExtensionModule>>;
}

/// A loaded module exposing named entry points.
pub trait ExtensionModule {
    /// Invokes the named exported function with no arguments.
    fn invoke(&self, entry_point: &str) -> Result<EntryReturn, EntryError>;
}

/// Result of invoking an entry point. Registration may complete synchronously
/// or deliver its value later; the loader accepts either.
pub enum EntryReturn {
    Ready(RawValue),
    Deferred(mpsc::Receiver<RawValue>),
}

/// Failure to invoke an entry point.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("module does not export '{0}'")]
    Missing(String),
    #[error("entry point raised: {0}")]
    Raised(anyhow::Error),
}

/// Errors that fail a whole load. Failures are scoped to one source; kicks
/// already loaded from other sources remain usable.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The module could not be resolved at all.
    #[error("kick bundle at '{source_url}' is unreachable: {cause}")]
    Unreachable {
        source_url: String,
        cause: anyhow::Error,
    },
    /// The bundle resolved but its registration surface is unusable.
    #[error("kick bundle at '{source_url}' violates the registration contract: {reason}")]
    ContractViolation {
        source_url: String,
        reason: String,
    },
}

fn contract(source_url: &str, reason: impl Into<String>) -> LoadError {
    LoadError::ContractViolation {
        source_url: source_url.to_string(),
        reason: reason.into(),
    }
}

/// Resolves `source_url` and turns its registration payload into descriptors.
///
/// Malformed elements are dropped with a warning; duplicate ids keep the
/// first occurrence. The result is ordered by `position`, ties broken by the
/// payload's own order. Loading is idempotent and has no side effects beyond
/// resolution.
pub fn load(
    resolver: &dyn ModuleResolver,
    source_url: &str,
) -> Result<Vec<Arc<ExtensionDescriptor>>, LoadError> {
    let module = resolver
        .resolve(source_url)
        .map_err(|cause| LoadError::Unreachable {
            source_url: source_url.to_string(),
            cause,
        })?;

    let outcome = catch_unwind(AssertUnwindSafe(|| module.invoke(REGISTRATION_ENTRY)))
        .map_err(|_| contract(source_url, format!("panic inside '{REGISTRATION_ENTRY}'")))?;
    let payload = match outcome {
        Ok(EntryReturn::Ready(value)) => value,
        Ok(EntryReturn::Deferred(receiver)) => receiver.recv().map_err(|_| {
            contract(source_url, "deferred registration was dropped before completing")
        })?,
        Err(EntryError::Missing(name)) => {
            return Err(contract(source_url, format!("missing entry point '{name}'")));
        }
        Err(EntryError::Raised(err)) => {
            return Err(contract(source_url, format!("entry point raised: {err}")));
        }
    };

    let kicks = payload
        .as_map()
        .and_then(|map| map.get(KICKS_KEY))
        .ok_or_else(|| {
            contract(
                source_url,
                format!(
                    "registration must be a map with a '{KICKS_KEY}' key, got {}",
                    payload.kind()
                ),
            )
        })?;
    let kicks = kicks.as_sequence().ok_or_else(|| {
        contract(
            source_url,
            format!("'{KICKS_KEY}' must be a sequence, got {}", kicks.kind()),
        )
    })?;

    let mut descriptors: Vec<Arc<ExtensionDescriptor>> = Vec::with_capacity(kicks.len());
    for (index, raw) in kicks.iter().enumerate() {
        match descriptor_from_raw(raw) {
            Ok(descriptor) => {
                if descriptors.iter().any(|d| d.id == descriptor.id) {
                    warn!(
                        source = source_url,
                        kick = %descriptor.id,
                        index,
                        "dropping kick with duplicate id"
                    );
                    continue;
                }
                descriptors.push(Arc::new(descriptor));
            }
            Err(err) => {
                warn!(source = source_url, index, error = %err, "dropping malformed kick");
            }
        }
    }

    // Stable sort: position ties keep their payload order.
    descriptors.sort_by(|a, b| a.position.total_cmp(&b.position));
    debug!(source = source_url, kicks = descriptors.len(), "kick bundle loaded");
    Ok(descriptors)
}

fn descriptor_from_raw(raw: &RawValue) -> anyhow::Result<ExtensionDescriptor> {
    let map = raw
        .as_map()
        .ok_or_else(|| anyhow::anyhow!("descriptor must be a map, got {}", raw.kind()))?;

    let id = require_text(map, "id")?;
    let name = require_text(map, "name")?;
    let description = map
        .get("description")
        .and_then(RawValue::as_str)
        .unwrap_or_default()
        .to_string();

    let position = map
        .get("position")
        .and_then(RawValue::as_number)
        .ok_or_else(|| anyhow::anyhow!("'position' must be a number"))?;
    if !position.is_finite() {
        anyhow::bail!("'position' must be finite, got {position}");
    }

    let component = map
        .get("component")
        .and_then(RawValue::as_component)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("'component' must be a component handle"))?;

    let required_roles = match map.get(USER_ROLES_KEY) {
        None | Some(RawValue::Null) => RoleSet::new(),
        Some(value) => roles_from_raw(value)?,
    };

    Ok(ExtensionDescriptor {
        id,
        name,
        description,
        position,
        required_roles,
        component,
    })
}

fn require_text(
    map: &std::collections::BTreeMap<String, RawValue>,
    key: &str,
) -> anyhow::Result<String> {
    let value = map
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("missing '{key}'"))?;
    let text = value
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("'{key}' must be a string, got {}", value.kind()))?;
    if text.trim().is_empty() {
        anyhow::bail!("'{key}' must not be empty");
    }
    Ok(text.to_string())
}

fn roles_from_raw(value: &RawValue) -> anyhow::Result<RoleSet> {
    let items = value
        .as_sequence()
        .ok_or_else(|| anyhow::anyhow!("'{USER_ROLES_KEY}' must be a sequence, got {}", value.kind()))?;
    let mut roles = RoleSet::new();
    for item in items {
        let role = item
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("'{USER_ROLES_KEY}' entries must be strings"))?;
        if role.trim().is_empty() {
            anyhow::bail!("'{USER_ROLES_KEY}' entries must not be empty");
        }
        roles.insert(role);
    }
    Ok(roles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ExtensionProps;
    use crate::Component;
    use std::collections::BTreeMap;

    struct Inert;

    impl Component for Inert {
        fn mount(&self, _props: ExtensionProps) {}
    }

    fn raw_kick(id: &str, position: f64) -> RawValue {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), id.into());
        map.insert("name".to_string(), id.to_uppercase().into());
        map.insert("position".to_string(), position.into());
        map.insert(
            "component".to_string(),
            RawValue::Component(Arc::new(Inert)),
        );
        RawValue::Map(map)
    }

    #[test]
    fn parses_minimal_descriptor() {
        let descriptor = descriptor_from_raw(&raw_kick("a", 1.0)).unwrap();
        assert_eq!(descriptor.id, "a");
        assert_eq!(descriptor.name, "A");
        assert!(descriptor.required_roles.is_empty());
        assert!(descriptor.description.is_empty());
    }

    #[test]
    fn rejects_blank_id() {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), "   ".into());
        map.insert("name".to_string(), "X".into());
        map.insert("position".to_string(), 1.0.into());
        map.insert(
            "component".to_string(),
            RawValue::Component(Arc::new(Inert)),
        );
        let err = descriptor_from_raw(&RawValue::Map(map)).unwrap_err();
        assert!(err.to_string().contains("'id'"));
    }

    #[test]
    fn rejects_non_finite_position() {
        let mut raw = raw_kick("a", 1.0);
        if let RawValue::Map(map) = &mut raw {
            map.insert("position".to_string(), f64::NAN.into());
        }
        let err = descriptor_from_raw(&raw).unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn rejects_empty_role_names() {
        let mut raw = raw_kick("a", 1.0);
        if let RawValue::Map(map) = &mut raw {
            map.insert(
                USER_ROLES_KEY.to_string(),
                RawValue::Sequence(vec!["editor".into(), "".into()]),
            );
        }
        let err = descriptor_from_raw(&raw).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn missing_component_is_rejected() {
        let mut raw = raw_kick("a", 1.0);
        if let RawValue::Map(map) = &mut raw {
            map.remove("component");
        }
        assert!(descriptor_from_raw(&raw).is_err());
    }
}
