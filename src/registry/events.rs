//! Registry Events
//!
//! Events emitted by the IP registry for external consumers to react to
//! record lifecycle changes.

use super::record::{IpId, Principal};
use serde::{Deserialize, Serialize};

/// Events emitted by the IP registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A new record was registered
    IpRegistered {
        id: IpId,
        owner: Principal,
        title: String,
    },

    /// Ownership moved to a new principal
    OwnershipTransferred {
        id: IpId,
        previous_owner: Principal,
        new_owner: Principal,
    },

    /// The active flag was set by the owner
    StatusChanged { id: IpId, is_active: bool },

    /// A non-owner attempted to mutate a record
    MutationDenied { id: IpId, caller: Principal },
}

impl RegistryEvent {
    /// Get the record id associated with this event
    pub fn id(&self) -> IpId {
        match self {
            RegistryEvent::IpRegistered { id, .. } => *id,
            RegistryEvent::OwnershipTransferred { id, .. } => *id,
            RegistryEvent::StatusChanged { id, .. } => *id,
            RegistryEvent::MutationDenied { id, .. } => *id,
        }
    }

    /// Check if this event reflects a state change
    pub fn is_state_change(&self) -> bool {
        !matches!(self, RegistryEvent::MutationDenied { .. })
    }
}
