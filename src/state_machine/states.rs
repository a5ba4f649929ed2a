use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use super::guards::{is_valid_generation_transition, is_valid_task_transition};

/// Task status definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Initial state when the task is planned
    #[default]
    Created,
    /// Task is being driven by an executor
    InProgress,
    /// Every sequence completed
    Completed,
    /// At least one step, sequence or observer failed
    Failed,
    /// Cancelled from outside the executor
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        Self::Created,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, to: TaskStatus) -> bool {
        is_valid_task_transition(*self, to)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::InProgress => write!(f, "inProgress"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "inProgress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

/// Generation lifecycle status, shared by steps and sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Created,
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl GenerationStatus {
    pub const ALL: [GenerationStatus; 6] = [
        Self::Created,
        Self::Queued,
        Self::Running,
        Self::Completed,
        Self::Failed,
        Self::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, to: GenerationStatus) -> bool {
        is_valid_generation_transition(*self, to)
    }

    /// Shortest chain of legal transitions leading from `self` to `target`,
    /// excluding `self`. `None` when `target` is unreachable; an empty chain
    /// when already there.
    pub fn path_to(&self, target: GenerationStatus) -> Option<Vec<GenerationStatus>> {
        if *self == target {
            return Some(Vec::new());
        }

        let mut queue = VecDeque::from([vec![*self]]);
        while let Some(chain) = queue.pop_front() {
            let last = *chain.last()?;
            for next in Self::ALL {
                if chain.contains(&next) || !last.can_transition_to(next) {
                    continue;
                }
                let mut extended = chain.clone();
                extended.push(next);
                if next == target {
                    extended.remove(0);
                    return Some(extended);
                }
                queue.push_back(extended);
            }
        }
        None
    }
}

impl fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid generation status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_terminal_check() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
        assert!(TaskStatus::Cancelled.is_terminal());
        assert!(!TaskStatus::Created.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(TaskStatus::InProgress.to_string(), "inProgress");
        assert_eq!(
            "completed".parse::<TaskStatus>().unwrap(),
            TaskStatus::Completed
        );
        assert!("in_progress".parse::<TaskStatus>().is_err());

        for status in GenerationStatus::ALL {
            assert_eq!(status.to_string().parse::<GenerationStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");
        let parsed: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TaskStatus::InProgress);

        let json = serde_json::to_string(&GenerationStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }

    #[test]
    fn test_path_to() {
        use GenerationStatus::*;
        assert_eq!(Created.path_to(Running), Some(vec![Queued, Running]));
        assert_eq!(Queued.path_to(Running), Some(vec![Running]));
        assert_eq!(Created.path_to(Completed), Some(vec![Queued, Running, Completed]));
        assert_eq!(Queued.path_to(Cancelled), Some(vec![Cancelled]));
        assert_eq!(Running.path_to(Running), Some(vec![]));
        assert_eq!(Running.path_to(Queued), None);
        assert_eq!(Completed.path_to(Failed), None);
    }
}
