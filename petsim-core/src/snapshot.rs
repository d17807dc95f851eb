//! Point-in-time copy of everything needed to rebuild a pet.
//!
//! A snapshot is plain data: no timer handles, no locks, no channels.
//! [`crate::PetEngine::from_snapshot`] turns one back into a live engine with
//! freshly started timers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;
use crate::inventory::Inventory;
use crate::personality::Personality;
use crate::types::{Action, LifecycleState, Mood, PetId};

/// Schema version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialisable state of one pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetSnapshot {
    /// Schema version of this record.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Identity of the pet.
    #[serde(default)]
    pub pet_id: PetId,
    /// The pet's name.
    #[serde(default)]
    pub name: String,
    /// Bounded attributes.
    pub attributes: Attributes,
    /// Alive / Sleeping / Dead.
    #[serde(default)]
    pub lifecycle: LifecycleState,
    /// Chosen personality, if any.
    #[serde(default)]
    pub personality: Option<Personality>,
    /// Last computed preferred action.
    #[serde(default)]
    pub preferred_action: Option<Action>,
    /// Inventory contents, oldest first.
    #[serde(default)]
    pub inventory: Inventory,
    /// Wall-clock time of the last user interaction.
    pub last_interaction: DateTime<Utc>,
    /// Whether background decay had been enabled.
    #[serde(default)]
    pub started: bool,
}

impl PetSnapshot {
    /// Derived mood at the time of the snapshot.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.attributes.mood()
    }

    /// Whether this build can restore the snapshot.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.version <= SNAPSHOT_VERSION
    }
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_record_fills_defaults() {
        let json = r#"{
            "attributes": {"hunger":10,"social":90,"sleep":5,"health":99,"score":3},
            "last_interaction": "2024-01-01T00:00:00Z"
        }"#;
        let snap: PetSnapshot = serde_json::from_str(json).expect("parse");
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert_eq!(snap.lifecycle, LifecycleState::Alive);
        assert!(snap.inventory.is_empty());
        assert!(snap.personality.is_none());
        assert!(!snap.started);
        assert_eq!(snap.mood(), Mood::Happy);
    }

    #[test]
    fn future_version_is_unsupported() {
        let json = r#"{
            "version": 99,
            "attributes": {"hunger":10,"social":90,"sleep":5,"health":99,"score":3},
            "last_interaction": "2024-01-01T00:00:00Z"
        }"#;
        let snap: PetSnapshot = serde_json::from_str(json).expect("parse");
        assert!(!snap.is_supported());
    }
}
