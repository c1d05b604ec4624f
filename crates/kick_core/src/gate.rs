//! Applicability checks and dispatch at the extension boundary.
//!
//! `can_execute` and `execute` are extension-authored and must be treated as
//! slow or faulty. Every call runs contained: a fault degrades to "not
//! applicable" or a reported dispatch failure and never crosses into host
//! control flow.

use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;
use tracing::{error, warn};

use crate::protocol::{Capability, SelectionItem};

/// Errors surfaced at the invocation boundary of one instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
    /// The instance reached its terminal state; the caller holds a stale
    /// reference.
    #[error("kick '{kick_id}' is closed")]
    Closed { kick_id: String },
    /// The kick refused (or is not yet able to accept) this selection.
    #[error("kick '{kick_id}' is not applicable to the current selection")]
    NotApplicable { kick_id: String },
    /// The kick's own code faulted during the call. Isolated per call.
    #[error("kick '{kick_id}' faulted inside '{call}'")]
    ExtensionFault {
        kick_id: String,
        call: &'static str,
    },
}

/// Whether `capability` permits invocation for `selection`.
///
/// No capability (instance not yet ready) is never applicable. A capability
/// without `can_execute` is applicable by default. A panicking predicate is
/// reported and treated as not applicable.
pub fn is_applicable(
    kick_id: &str,
    capability: Option<&Capability>,
    selection: &[SelectionItem],
) -> bool {
    let Some(capability) = capability else {
        return false;
    };
    let Some(can_execute) = capability.can_execute_fn() else {
        return true;
    };
    match catch_unwind(AssertUnwindSafe(|| can_execute(selection))) {
        Ok(verdict) => verdict,
        Err(_) => {
            warn!(kick = kick_id, "can_execute faulted; treating as not applicable");
            false
        }
    }
}

/// Re-checks applicability against exactly this capability object and, if it
/// holds, forwards the selection to `execute`.
///
/// The check happens immediately before dispatch — selection can change
/// between the moment a UI affordance was enabled and the moment the actor
/// acts, so a cached verdict is never trusted.
pub fn dispatch(
    kick_id: &str,
    capability: &Capability,
    selection: &[SelectionItem],
) -> Result<(), GateError> {
    if !is_applicable(kick_id, Some(capability), selection) {
        return Err(GateError::NotApplicable {
            kick_id: kick_id.to_string(),
        });
    }
    let execute = capability.execute_fn();
    match catch_unwind(AssertUnwindSafe(|| execute(selection))) {
        Ok(()) => Ok(()),
        Err(_) => {
            error!(kick = kick_id, "execute faulted");
            Err(GateError::ExtensionFault {
                kick_id: kick_id.to_string(),
                call: "execute",
            })
        }
    }
}
