//! Host-side protocol for registering and executing Kick UI extensions.
//!
//! A kick is an independently built and deployed bundle that exposes a single
//! registration entry point. The host resolves a source URL to a loaded
//! module, invokes the entry point and validates the descriptors it returns,
//! narrows the list to what the current actor may see, and renders each
//! surviving component inside a lifecycle controller. Once an instance
//! signals readiness with a capability object, the selection gate decides,
//! per selection, whether the kick may be invoked.
//!
//! Extension code is never trusted: every call into it is contained, and a
//! faulting kick degrades to "not applicable" or a reported dispatch failure
//! without disturbing the host or its sibling kicks.

pub mod authz;
pub mod descriptor;
pub mod gate;
pub mod lifecycle;
pub mod loader;
pub mod protocol;
pub mod registry;
pub mod services;

pub use authz::{visible_to, RoleSet};
pub use descriptor::ExtensionDescriptor;
pub use gate::GateError;
pub use lifecycle::{CloseSignal, ExtensionProps, KickInstance, Phase, ReadySignal};
pub use loader::{load, EntryError, EntryReturn, ExtensionModule, LoadError, ModuleResolver};
pub use protocol::{
    Capability, ComponentRef, RawCapability, RawValue, SelectionItem, KICKS_KEY,
    REGISTRATION_ENTRY,
};
pub use registry::KickRegistry;
pub use services::{FetchRequest, FetchResponse, HostServices, KickFetch, NoNetwork, Theme};

/// Behaviour of a renderable unit delivered by a kick bundle.
///
/// The host renders the component exactly once per instance and never mutates
/// it. Readiness is signalled through the props, at whatever later point the
/// component chooses; an instance that never signals simply stays
/// non-invocable.
pub trait Component: Send + Sync {
    /// Called when the host renders the kick.
    fn mount(&self, props: ExtensionProps);
}
