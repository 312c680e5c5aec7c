//! Stage status state machine

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Status of a stage during execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Degraded,
    Failed,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Running => "running",
            StageStatus::Succeeded => "succeeded",
            StageStatus::Degraded => "degraded",
            StageStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StageStatus::Succeeded | StageStatus::Degraded | StageStatus::Failed
        )
    }

    /// Whether downstream stages may proceed after this one
    pub fn is_usable(&self) -> bool {
        matches!(self, StageStatus::Succeeded | StageStatus::Degraded)
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(self, next: StageStatus) -> Result<StageStatus, DomainError> {
        let allowed = matches!(
            (self, next),
            (StageStatus::Pending, StageStatus::Running)
                | (StageStatus::Running, StageStatus::Succeeded)
                | (StageStatus::Running, StageStatus::Degraded)
                | (StageStatus::Running, StageStatus::Failed)
        );
        if allowed {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
