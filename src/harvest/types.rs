// Types and enums for the harvest loop
use crate::targeting::TargetPoint;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// Too many consecutive failures
    FailureLimit { streak: u32 },
    /// The configured number of iterations ran
    IterationLimit { iterations: u64 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FailureLimit { streak } => {
                write!(f, "reached {streak} consecutive failures (window missing or item not found)")
            }
            StopReason::IterationLimit { iterations } => {
                write!(f, "completed {iterations} iterations")
            }
        }
    }
}

/// What one pass through the loop amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IterationOutcome {
    WindowMissing,
    ActivationFailed,
    TargetNotFound,
    Clicked(TargetPoint),
}

impl IterationOutcome {
    /// Only a completed click counts as success
    pub fn is_success(&self) -> bool {
        matches!(self, IterationOutcome::Clicked(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub iterations: u64,
    pub successes: u64,
    pub stop_reason: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_clicks_succeed() {
        assert!(IterationOutcome::Clicked(TargetPoint { x: 1, y: 2 }).is_success());
        assert!(!IterationOutcome::WindowMissing.is_success());
        assert!(!IterationOutcome::ActivationFailed.is_success());
        assert!(!IterationOutcome::TargetNotFound.is_success());
    }
}
