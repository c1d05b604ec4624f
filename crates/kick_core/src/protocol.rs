//! Wire shapes exchanged between the host and kick bundles.
//!
//! Everything a bundle hands across the module boundary arrives untyped and
//! is validated before the host acts on it. The shapes here are normative;
//! how a bundle is fetched and loaded is not.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::Component;

/// Name of the registration entry point every kick bundle must export.
pub const REGISTRATION_ENTRY: &str = "registerKicks";

/// Top-level key of the registration payload.
pub const KICKS_KEY: &str = "kicks";

/// Descriptor key carrying the required-roles list on the wire.
pub const USER_ROLES_KEY: &str = "userRoles";

/// Shared handle to a renderable unit produced by a bundle.
pub type ComponentRef = Arc<dyn Component>;

/// One selected unit of host content.
///
/// Kicks must treat the shape as read-only and must not assume attributes
/// beyond `id`; everything else is host-defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionItem {
    pub id: String,
    #[serde(flatten, default)]
    pub attributes: JsonMap<String, JsonValue>,
}

impl SelectionItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: JsonMap::new(),
        }
    }
}

/// Extension-defined side effect run on the current selection.
pub type ExecuteFn = Arc<dyn Fn(&[SelectionItem]) + Send + Sync>;

/// Extension-defined applicability predicate over the current selection.
pub type CanExecuteFn = Arc<dyn Fn(&[SelectionItem]) -> bool + Send + Sync>;

/// Capability payload as supplied by a kick through the readiness callback.
///
/// `execute` is mandatory on the wire; a payload without it violates the
/// contract and is rejected by [`Capability::validate`].
#[derive(Clone, Default)]
pub struct RawCapability {
    pub execute: Option<ExecuteFn>,
    pub can_execute: Option<CanExecuteFn>,
}

impl RawCapability {
    /// Payload that runs `f` on invocation, applicable to any selection.
    pub fn from_execute<F>(f: F) -> Self
    where
        F: Fn(&[SelectionItem]) + Send + Sync + 'static,
    {
        Self {
            execute: Some(Arc::new(f)),
            can_execute: None,
        }
    }

    /// Adds an applicability predicate.
    pub fn with_can_execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&[SelectionItem]) -> bool + Send + Sync + 'static,
    {
        self.can_execute = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for RawCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCapability")
            .field("execute", &self.execute.is_some())
            .field("can_execute", &self.can_execute.is_some())
            .finish()
    }
}

/// Validated capability object. The most recently stored one per instance is
/// authoritative; replacement is total, never a merge.
#[derive(Clone)]
pub struct Capability {
    execute: ExecuteFn,
    can_execute: Option<CanExecuteFn>,
}

impl Capability {
    /// Validates a raw payload at the boundary.
    pub fn validate(raw: RawCapability) -> anyhow::Result<Self> {
        let execute = raw
            .execute
            .ok_or_else(|| anyhow::anyhow!("capability payload is missing 'execute'"))?;
        Ok(Self {
            execute,
            can_execute: raw.can_execute,
        })
    }

    pub fn execute_fn(&self) -> &ExecuteFn {
        &self.execute
    }

    pub fn can_execute_fn(&self) -> Option<&CanExecuteFn> {
        self.can_execute.as_ref()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("can_execute", &self.can_execute.is_some())
            .finish()
    }
}

/// Untyped value returned by a registration entry point.
///
/// JSON-like so that malformed payloads can be inspected and reported field
/// by field, with an extra variant carrying live component handles, which
/// cannot cross a JSON boundary.
#[derive(Clone, Default)]
pub enum RawValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<RawValue>),
    Map(BTreeMap<String, RawValue>),
    Component(ComponentRef),
}

impl RawValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RawValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[RawValue]> {
        match self {
            RawValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, RawValue>> {
        match self {
            RawValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            RawValue::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Short type name used in validation diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::Sequence(_) => "sequence",
            RawValue::Map(_) => "map",
            RawValue::Component(_) => "component",
        }
    }

    /// Builds a well-formed registration payload around `kicks`.
    pub fn registration(kicks: Vec<RawValue>) -> RawValue {
        let mut map = BTreeMap::new();
        map.insert(KICKS_KEY.to_string(), RawValue::Sequence(kicks));
        RawValue::Map(map)
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("Null"),
            RawValue::Bool(b) => write!(f, "Bool({b})"),
            RawValue::Number(n) => write!(f, "Number({n})"),
            RawValue::String(s) => write!(f, "String({s:?})"),
            RawValue::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            RawValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            RawValue::Component(_) => f.write_str("Component(..)"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::String(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<Vec<RawValue>> for RawValue {
    fn from(value: Vec<RawValue>) -> Self {
        RawValue::Sequence(value)
    }
}

impl From<ComponentRef> for RawValue {
    fn from(value: ComponentRef) -> Self {
        RawValue::Component(value)
    }
}
