//! Rotation pass state machine
//!
//! Tracks how far one rotation pass has progressed.

use serde::{Deserialize, Serialize};

use super::error::{RotationError, RotationResult};

/// Stage of a rotation pass
///
/// # State Transitions
///
/// ```text
/// Listed → Classified → Planned → RoomMade ─────────────────────→ Finalized
///                                     └→ Created → Persisted ──↗
/// ```
///
/// Failure at any stage aborts the pass; no stage is re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationStage {
    /// Key set fetched from the store
    Listed,

    /// Keys partitioned into expired / valid
    Classified,

    /// Deletion and creation plan computed
    Planned,

    /// Non-current keys marked for deletion have been deleted
    RoomMade,

    /// Replacement key minted
    Created,

    /// Replacement written to every sink
    Persisted,

    /// Deferred deletion of the current key done (or nothing left to do)
    Finalized,
}

impl RotationStage {
    /// Check if transition to the target stage is valid
    #[must_use]
    pub fn can_transition_to(&self, target: RotationStage) -> bool {
        use RotationStage::*;

        matches!(
            (self, target),
            (Listed, Classified)
                | (Classified, Planned)
                | (Planned, RoomMade)
                | (RoomMade, Created)
                | (RoomMade, Finalized)
                | (Created, Persisted)
                | (Persisted, Finalized)
        )
    }

    /// Validate and perform stage transition
    pub fn transition_to(&self, target: RotationStage) -> RotationResult<RotationStage> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(RotationError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if stage is terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RotationStage::Finalized)
    }
}

impl std::fmt::Display for RotationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationStage::Listed => write!(f, "listed"),
            RotationStage::Classified => write!(f, "classified"),
            RotationStage::Planned => write!(f, "planned"),
            RotationStage::RoomMade => write!(f, "room_made"),
            RotationStage::Created => write!(f, "created"),
            RotationStage::Persisted => write!(f, "persisted"),
            RotationStage::Finalized => write!(f, "finalized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RotationStage::*;

    #[test]
    fn test_forward_transitions() {
        assert!(Listed.can_transition_to(Classified));
        assert!(Classified.can_transition_to(Planned));
        assert!(Planned.can_transition_to(RoomMade));
        assert!(RoomMade.can_transition_to(Created));
        assert!(Created.can_transition_to(Persisted));
        assert!(Persisted.can_transition_to(Finalized));
    }

    #[test]
    fn test_skip_creation_branch() {
        assert!(RoomMade.can_transition_to(Finalized));
        assert!(!Created.can_transition_to(Finalized));
    }

    #[test]
    fn test_no_reentry_or_backtracking() {
        assert!(!Planned.can_transition_to(Planned));
        assert!(!Persisted.can_transition_to(Created));
        assert!(!Finalized.can_transition_to(Listed));
        assert!(Finalized.is_terminal());
        assert!(!Persisted.is_terminal());
    }

    #[test]
    fn test_transition_error() {
        let err = Listed.transition_to(RoomMade).unwrap_err();
        assert!(err.to_string().contains("listed"));
        assert!(err.to_string().contains("room_made"));
    }
}
