use std::collections::BTreeMap;
use std::sync::{mpsc, Arc};

use kick_core::{
    load, Component, EntryError, EntryReturn, ExtensionModule, ExtensionProps, LoadError,
    ModuleResolver, RawValue, REGISTRATION_ENTRY,
};

struct Inert;

impl Component for Inert {
    fn mount(&self, _props: ExtensionProps) {}
}

fn kick(id: &str, position: f64) -> RawValue {
    let mut map = BTreeMap::new();
    map.insert("id".to_string(), id.into());
    map.insert("name".to_string(), id.to_uppercase().into());
    map.insert("description".to_string(), format!("kick {id}").into());
    map.insert("position".to_string(), position.into());
    map.insert(
        "component".to_string(),
        RawValue::Component(Arc::new(Inert)),
    );
    RawValue::Map(map)
}

struct FnModule<F>(F);

impl<F> ExtensionModule for FnModule<F>
where
    F: Fn(&str) -> Result<EntryReturn, EntryError>,
{
    fn invoke(&self, entry_point: &str) -> Result<EntryReturn, EntryError> {
        (self.0)(entry_point)
    }
}

struct FnResolver<F>(F);

impl<F> ModuleResolver for FnResolver<F>
where
    F: Fn(&str) -> anyhow::Result<Box<dyn ExtensionModule>> + Send + Sync,
{
    fn resolve(&self, source_url: &str) -> anyhow::Result<Box<dyn ExtensionModule>> {
        (self.0)(source_url)
    }
}

fn returning(payload: RawValue) -> impl ModuleResolver {
    FnResolver(move |_: &str| {
        let payload = payload.clone();
        Ok(Box::new(FnModule(move |entry: &str| {
            if entry == REGISTRATION_ENTRY {
                Ok(EntryReturn::Ready(payload.clone()))
            } else {
                Err(EntryError::Missing(entry.to_string()))
            }
        })) as Box<dyn ExtensionModule>)
    })
}

#[test]
fn unreachable_source_fails_typed() {
    let resolver = FnResolver(|url: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        anyhow::bail!("no bundle at {url}")
    });
    let err = load(&resolver, "https://cdn.test/missing.js").unwrap_err();
    assert!(matches!(err, LoadError::Unreachable { .. }));
    assert!(err.to_string().contains("missing.js"));
}

#[test]
fn missing_entry_point_is_contract_violation() {
    let resolver = FnResolver(|_: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        Ok(Box::new(FnModule(|entry: &str| {
            Err(EntryError::Missing(entry.to_string()))
        })))
    });
    let err = load(&resolver, "bundle").unwrap_err();
    assert!(matches!(err, LoadError::ContractViolation { .. }));
    assert!(err.to_string().contains(REGISTRATION_ENTRY));
}

#[test]
fn raising_entry_point_is_contract_violation() {
    let resolver = FnResolver(|_: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        Ok(Box::new(FnModule(|_: &str| {
            Err(EntryError::Raised(anyhow::anyhow!("bundle exploded")))
        })))
    });
    let err = load(&resolver, "bundle").unwrap_err();
    assert!(matches!(err, LoadError::ContractViolation { .. }));
}

#[test]
fn panicking_entry_point_is_contained() {
    let resolver = FnResolver(|_: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        Ok(Box::new(FnModule(|_: &str| -> Result<EntryReturn, EntryError> {
            panic!("entry point panic")
        })))
    });
    let err = load(&resolver, "bundle").unwrap_err();
    assert!(matches!(err, LoadError::ContractViolation { .. }));
}

#[test]
fn kicks_must_be_a_sequence() {
    let mut map = BTreeMap::new();
    map.insert("kicks".to_string(), "not-an-array".into());
    let err = load(&returning(RawValue::Map(map)), "bundle").unwrap_err();
    match err {
        LoadError::ContractViolation { reason, .. } => {
            assert!(reason.contains("sequence"), "unexpected reason: {reason}");
        }
        other => panic!("expected contract violation, got {other:?}"),
    }
}

#[test]
fn top_level_shape_must_carry_kicks() {
    let err = load(&returning(RawValue::Null), "bundle").unwrap_err();
    assert!(matches!(err, LoadError::ContractViolation { .. }));
}

#[test]
fn malformed_element_does_not_sink_siblings() {
    let mut broken = BTreeMap::new();
    broken.insert("id".to_string(), "broken".into());
    broken.insert("position".to_string(), 2.0.into());
    // no name, no component
    let payload = RawValue::registration(vec![
        kick("a", 1.0),
        RawValue::Map(broken),
        kick("b", 3.0),
    ]);
    let descriptors = load(&returning(payload), "bundle").unwrap();
    let ids: Vec<_> = descriptors.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
}

#[test]
fn duplicate_id_keeps_first_occurrence() {
    let payload = RawValue::registration(vec![kick("a", 2.0), kick("a", 1.0), kick("b", 3.0)]);
    let descriptors = load(&returning(payload), "bundle").unwrap();
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0].id, "a");
    assert_eq!(descriptors[0].position, 2.0);
}

#[test]
fn ordering_is_by_position_with_stable_ties() {
    let payload = RawValue::registration(vec![kick("a", 5.0), kick("b", 1.0), kick("c", 5.0)]);
    let descriptors = load(&returning(payload), "bundle").unwrap();
    let ids: Vec<_> = descriptors.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["b", "a", "c"]);
}

#[test]
fn deferred_registration_is_accepted() {
    let resolver = FnResolver(|_: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        Ok(Box::new(FnModule(|entry: &str| {
            if entry != REGISTRATION_ENTRY {
                return Err(EntryError::Missing(entry.to_string()));
            }
            let (tx, rx) = mpsc::channel();
            tx.send(RawValue::registration(vec![kick("later", 1.0)]))
                .unwrap();
            Ok(EntryReturn::Deferred(rx))
        })))
    });
    let descriptors = load(&resolver, "bundle").unwrap();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].id, "later");
}

#[test]
fn dropped_deferred_registration_is_contract_violation() {
    let resolver = FnResolver(|_: &str| -> anyhow::Result<Box<dyn ExtensionModule>> {
        Ok(Box::new(FnModule(|_: &str| {
            let (_, rx) = mpsc::channel();
            Ok(EntryReturn::Deferred(rx))
        })))
    });
    let err = load(&resolver, "bundle").unwrap_err();
    assert!(matches!(err, LoadError::ContractViolation { .. }));
}

#[test]
fn loading_is_idempotent() {
    let resolver = returning(RawValue::registration(vec![kick("a", 1.0), kick("b", 2.0)]));
    let first = load(&resolver, "bundle").unwrap();
    let second = load(&resolver, "bundle").unwrap();
    let ids = |descriptors: &[Arc<kick_core::ExtensionDescriptor>]| {
        descriptors.iter().map(|d| d.id.clone()).collect::<Vec<_>>()
    };
    assert_eq!(ids(&first), ids(&second));
}
