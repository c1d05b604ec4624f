//! Per-instance lifecycle: mount, readiness handshake, capability slot,
//! close.
//!
//! One [`KickInstance`] exists per currently-rendered kick. The capability
//! object lives in a single owned slot behind one mutex; readiness calls swap
//! it under a single assignment, and invocations read the reference
//! atomically, so no in-flight call can straddle a replacement.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, warn};

use crate::descriptor::ExtensionDescriptor;
use crate::gate::{self, GateError};
use crate::protocol::{Capability, RawCapability, SelectionItem};
use crate::services::HostServices;

/// Observable lifecycle phase of a mounted kick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Mounted, no capability delivered yet; not invocable.
    AwaitingReady,
    /// A capability object is stored and authoritative.
    Ready,
    /// Terminal. The capability is discarded; further calls are errors.
    Closed,
}

enum InstanceState {
    AwaitingReady,
    Ready(Arc<Capability>),
    Closed,
}

struct InstanceInner {
    kick_id: String,
    state: Mutex<InstanceState>,
}

impl InstanceInner {
    // Transitions are single assignments, so a poisoned lock holds no torn
    // state and can be recovered.
    fn lock(&self) -> MutexGuard<'_, InstanceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn close(&self) {
        let mut state = self.lock();
        match *state {
            InstanceState::Closed => {}
            _ => {
                *state = InstanceState::Closed;
                debug!(kick = %self.kick_id, "kick instance closed");
            }
        }
    }
}

/// Props handed to a component when the host renders it.
///
/// The component borrows everything here for the lifetime of the instance;
/// the services are shared read-only across all instances.
#[derive(Clone)]
pub struct ExtensionProps {
    pub on_ready: ReadySignal,
    pub on_close: CloseSignal,
    pub services: HostServices,
}

/// Host-owned readiness callback for one instance.
#[derive(Clone)]
pub struct ReadySignal {
    inner: Arc<InstanceInner>,
}

impl ReadySignal {
    /// Delivers or replaces the instance's capability object.
    ///
    /// The first valid call makes the instance invocable; each later call
    /// atomically replaces the stored object (kicks may legitimately
    /// re-signal, e.g. after re-binding their execute function). A payload
    /// without `execute` is reported and ignored, leaving the prior state
    /// unchanged.
    pub fn ready(&self, capability: RawCapability) {
        let validated = match Capability::validate(capability) {
            Ok(capability) => Arc::new(capability),
            Err(err) => {
                warn!(kick = %self.inner.kick_id, error = %err, "ignoring invalid readiness payload");
                return;
            }
        };
        let mut state = self.inner.lock();
        match *state {
            InstanceState::Closed => {
                warn!(kick = %self.inner.kick_id, "readiness signalled after close; ignoring");
            }
            InstanceState::AwaitingReady => {
                *state = InstanceState::Ready(validated);
                debug!(kick = %self.inner.kick_id, "kick ready");
            }
            InstanceState::Ready(_) => {
                *state = InstanceState::Ready(validated);
                debug!(kick = %self.inner.kick_id, "capability replaced");
            }
        }
    }
}

/// Lets a kick dismiss its own instance.
#[derive(Clone)]
pub struct CloseSignal {
    inner: Arc<InstanceInner>,
}

impl CloseSignal {
    pub fn close(&self) {
        self.inner.close();
    }
}

/// Lifecycle controller for one rendered kick.
pub struct KickInstance {
    descriptor: Arc<ExtensionDescriptor>,
    inner: Arc<InstanceInner>,
}

impl KickInstance {
    /// Renders the descriptor's component and starts the readiness handshake.
    ///
    /// A component that panics during mount is contained; the instance simply
    /// never becomes invocable. No timeout is imposed on readiness.
    pub fn mount(descriptor: Arc<ExtensionDescriptor>, services: HostServices) -> Self {
        let inner = Arc::new(InstanceInner {
            kick_id: descriptor.id.clone(),
            state: Mutex::new(InstanceState::AwaitingReady),
        });
        let props = ExtensionProps {
            on_ready: ReadySignal {
                inner: inner.clone(),
            },
            on_close: CloseSignal {
                inner: inner.clone(),
            },
            services,
        };
        let component = descriptor.component.clone();
        if catch_unwind(AssertUnwindSafe(|| component.mount(props))).is_err() {
            error!(kick = %descriptor.id, "component panicked during mount");
        }
        Self { descriptor, inner }
    }

    pub fn descriptor(&self) -> &Arc<ExtensionDescriptor> {
        &self.descriptor
    }

    pub fn phase(&self) -> Phase {
        match *self.inner.lock() {
            InstanceState::AwaitingReady => Phase::AwaitingReady,
            InstanceState::Ready(_) => Phase::Ready,
            InstanceState::Closed => Phase::Closed,
        }
    }

    /// Atomically reads the current capability reference, if any.
    pub fn capability(&self) -> Option<Arc<Capability>> {
        match &*self.inner.lock() {
            InstanceState::Ready(capability) => Some(capability.clone()),
            _ => None,
        }
    }

    /// Whether the kick may be invoked for `selection` right now.
    ///
    /// Never true before the first readiness call; an error once closed so
    /// that callers can detect stale references.
    pub fn is_applicable(&self, selection: &[SelectionItem]) -> Result<bool, GateError> {
        // Clone the reference out so the lock is not held across extension
        // code; a re-signalling predicate must not deadlock the instance.
        let capability = {
            let state = self.inner.lock();
            match &*state {
                InstanceState::Closed => {
                    return Err(GateError::Closed {
                        kick_id: self.descriptor.id.clone(),
                    })
                }
                InstanceState::AwaitingReady => return Ok(false),
                InstanceState::Ready(capability) => capability.clone(),
            }
        };
        Ok(gate::is_applicable(
            &self.descriptor.id,
            Some(&capability),
            selection,
        ))
    }

    /// Gates and forwards `selection` to the kick's execute function.
    ///
    /// Applicability is re-checked against the capability object read at this
    /// moment, never a cached verdict; the same object then receives the
    /// execute call. Before readiness this is a refusing no-op.
    pub fn dispatch(&self, selection: &[SelectionItem]) -> Result<(), GateError> {
        let capability = {
            let state = self.inner.lock();
            match &*state {
                InstanceState::Closed => {
                    return Err(GateError::Closed {
                        kick_id: self.descriptor.id.clone(),
                    })
                }
                InstanceState::AwaitingReady => {
                    return Err(GateError::NotApplicable {
                        kick_id: self.descriptor.id.clone(),
                    })
                }
                InstanceState::Ready(capability) => capability.clone(),
            }
        };
        gate::dispatch(&self.descriptor.id, &capability, selection)
    }

    /// Host-side unmount. Terminal; discards any stored capability.
    pub fn close(&self) {
        self.inner.close();
    }
}
