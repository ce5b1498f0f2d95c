use crate::error::{FetchError, NotifyError};

/// Whether a check cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Checking,
}

impl std::fmt::Display for MonitorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MonitorState::Idle => "idle",
            MonitorState::Checking => "checking",
        };
        write!(f, "{s}")
    }
}

/// Result of one check cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Fetched body equals the snapshot.
    Unchanged,
    /// Body differs and the alert went out.
    Changed { content: String },
    /// Body differs but the alert could not be delivered.
    NotifyFailed { content: String, error: NotifyError },
    /// The page could not be fetched; nothing was compared.
    FetchFailed(FetchError),
}

impl CycleOutcome {
    /// New page body to store, if this outcome replaces the snapshot.
    pub fn new_snapshot(&self) -> Option<&str> {
        match self {
            CycleOutcome::Changed { content } | CycleOutcome::NotifyFailed { content, .. } => {
                Some(content)
            }
            CycleOutcome::Unchanged | CycleOutcome::FetchFailed(_) => None,
        }
    }

    /// True when a notification was attempted, successful or not.
    pub fn is_change(&self) -> bool {
        self.new_snapshot().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_changes_carry_a_new_snapshot() {
        assert_eq!(CycleOutcome::Unchanged.new_snapshot(), None);
        let fetch_failed = CycleOutcome::FetchFailed(FetchError::Status {
            status: 500,
            url: "http://localhost".to_string(),
        });
        assert_eq!(fetch_failed.new_snapshot(), None);
        assert!(!fetch_failed.is_change());

        let changed = CycleOutcome::Changed {
            content: "v2".to_string(),
        };
        assert_eq!(changed.new_snapshot(), Some("v2"));

        let notify_failed = CycleOutcome::NotifyFailed {
            content: "v3".to_string(),
            error: NotifyError::Transport("connection refused".to_string()),
        };
        assert_eq!(notify_failed.new_snapshot(), Some("v3"));
        assert!(notify_failed.is_change());
    }

    #[test]
    fn state_display() {
        assert_eq!(MonitorState::Idle.to_string(), "idle");
        assert_eq!(MonitorState::Checking.to_string(), "checking");
    }
}
