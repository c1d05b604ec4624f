//! Manifest-backed kick bundles for local development and testing.
//!
//! A bundle source is a directory holding `kick.toml` (or a direct path to
//! such a file). The manifest lists the kicks the bundle registers; its
//! entries cross the module boundary verbatim, so the loader owns all
//! validation. Components are manifest-backed: they become ready on mount
//! and print the selection they execute, standing in for a real remote
//! bundle.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use kick_core::{
    Component, EntryError, EntryReturn, ExtensionModule, ExtensionProps, ModuleResolver,
    RawCapability, RawValue, SelectionItem, REGISTRATION_ENTRY,
};

pub const MANIFEST_FILE: &str = "kick.toml";

/// Resolves bundle sources against the local filesystem.
#[derive(Debug, Default)]
pub struct ManifestResolver;

impl ModuleResolver for ManifestResolver {
    fn resolve(&self, source_url: &str) -> anyhow::Result<Box<dyn ExtensionModule>> {
        let path = manifest_path(Path::new(source_url))?;
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;
        let manifest: BundleManifest = toml::from_str(&data)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
        Ok(Box::new(ManifestModule { manifest }))
    }
}

fn manifest_path(source: &Path) -> Result<PathBuf> {
    if source.is_file() {
        return Ok(source.to_path_buf());
    }
    let candidate = source.join(MANIFEST_FILE);
    if candidate.is_file() {
        Ok(candidate)
    } else {
        anyhow::bail!("no {MANIFEST_FILE} under {}", source.display())
    }
}

#[derive(Debug, Deserialize)]
struct BundleManifest {
    #[serde(default)]
    kicks: Vec<toml::Value>,
}

struct ManifestModule {
    manifest: BundleManifest,
}

impl ExtensionModule for ManifestModule {
    fn invoke(&self, entry_point: &str) -> Result<EntryReturn, EntryError> {
        if entry_point != REGISTRATION_ENTRY {
            return Err(EntryError::Missing(entry_point.to_string()));
        }
        let kicks = self.manifest.kicks.iter().map(entry_to_raw).collect();
        Ok(EntryReturn::Ready(RawValue::registration(kicks)))
    }
}

fn entry_to_raw(entry: &toml::Value) -> RawValue {
    let Some(table) = entry.as_table() else {
        return toml_to_raw(entry);
    };
    let mut map = BTreeMap::new();
    for (key, value) in table {
        match key.as_str() {
            // Manifest spelling to wire spelling.
            "user_roles" => {
                map.insert("userRoles".to_string(), toml_to_raw(value));
            }
            // Consumed below; configures the component, not the descriptor.
            "max_selection" => {}
            _ => {
                map.insert(key.clone(), toml_to_raw(value));
            }
        }
    }
    let id = table
        .get("id")
        .and_then(|value| value.as_str())
        .unwrap_or_default()
        .to_string();
    let name = table
        .get("name")
        .and_then(|value| value.as_str())
        .unwrap_or(&id)
        .to_string();
    let max_selection = table
        .get("max_selection")
        .and_then(|value| value.as_integer())
        .map(|n| n as usize);
    map.insert(
        "component".to_string(),
        RawValue::Component(Arc::new(ManifestKick {
            id,
            name,
            max_selection,
        })),
    );
    RawValue::Map(map)
}

fn toml_to_raw(value: &toml::Value) -> RawValue {
    match value {
        toml::Value::String(s) => RawValue::String(s.clone()),
        toml::Value::Integer(n) => RawValue::Number(*n as f64),
        toml::Value::Float(n) => RawValue::Number(*n),
        toml::Value::Boolean(b) => RawValue::Bool(*b),
        toml::Value::Datetime(dt) => RawValue::String(dt.to_string()),
        toml::Value::Array(items) => RawValue::Sequence(items.iter().map(toml_to_raw).collect()),
        toml::Value::Table(table) => RawValue::Map(
            table
                .iter()
                .map(|(key, value)| (key.clone(), toml_to_raw(value)))
                .collect(),
        ),
    }
}

/// Component standing in for a real bundle's renderable unit.
struct ManifestKick {
    id: String,
    name: String,
    max_selection: Option<usize>,
}

impl Component for ManifestKick {
    fn mount(&self, props: ExtensionProps) {
        debug!(kick = %self.id, theme = %props.services.theme.name, "manifest kick mounted");
        let name = self.name.clone();
        let mut capability = RawCapability::from_execute(move |items: &[SelectionItem]| {
            let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
            println!(
                "[{name}] executing on {} item(s): {}",
                items.len(),
                ids.join(", ")
            );
        });
        if let Some(max) = self.max_selection {
            capability =
                capability.with_can_execute(move |items| !items.is_empty() && items.len() <= max);
        }
        props.on_ready.ready(capability);
    }
}
