//! Batch lifecycle phases.

/// The phase of one batch submission.
///
/// Phase transitions:
/// ```text
/// Dispatching ──┬──► Committed
///               └──► Compensating ──┬──► RolledBack
///                                   └──► CompensationIncomplete
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    /// Create calls are in flight.
    Dispatching,

    /// At least one submission was rejected; accepted reviews are being deleted.
    Compensating,

    /// Every submission was accepted (terminal state).
    Committed,

    /// Every accepted review was deleted again (terminal state).
    RolledBack,

    /// At least one rollback delete failed (terminal state).
    CompensationIncomplete,
}

impl BatchPhase {
    /// Returns the phase name, also used as the metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPhase::Dispatching => "dispatching",
            BatchPhase::Compensating => "compensating",
            BatchPhase::Committed => "committed",
            BatchPhase::RolledBack => "rolled_back",
            BatchPhase::CompensationIncomplete => "compensation_incomplete",
        }
    }
}

impl std::fmt::Display for BatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
