//! Lifecycle actions and their per-host outcomes

use std::fmt;

use vmfleet_client::{Document, RemoteApi, Result};

/// Tally label for hosts whose remote call failed
pub const ERROR_LABEL: &str = "error";

/// State reported when a successful response carries no state
pub const UNKNOWN_STATE: &str = "unknown";

/// Per-host lifecycle action driven by the batch orchestrator
///
/// Fleet-wide listing is a single request and lives in
/// [`crate::inventory`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchAction {
    /// Send the `start` command
    Start,
    /// Send the `stop` command
    Stop,
    /// Query the current state
    Status,
}

impl BatchAction {
    /// Issue this action for one VM
    pub(crate) async fn invoke(self, api: &dyn RemoteApi, vm_id: &str) -> Result<Document> {
        match self {
            BatchAction::Start => api.post_action(vm_id, "start").await,
            BatchAction::Stop => api.post_action(vm_id, "stop").await,
            BatchAction::Status => api.fetch(vm_id).await,
        }
    }

    /// Path of the state field in the response document
    #[must_use]
    pub fn state_path(self) -> &'static str {
        match self {
            BatchAction::Start | BatchAction::Stop => "action.status.state",
            BatchAction::Status => "vm.status.state",
        }
    }

    /// Render the summary prefix for `total` processed hosts
    #[must_use]
    pub fn summary_prefix(self, total: usize) -> String {
        match self {
            BatchAction::Start => format!("{total} vms sent the start command"),
            BatchAction::Stop => format!("{total} vms sent the stop command"),
            BatchAction::Status => format!("status of {total} vms"),
        }
    }
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BatchAction::Start => "start",
            BatchAction::Stop => "stop",
            BatchAction::Status => "status",
        };
        f.write_str(name)
    }
}

/// Classified result of one host's action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Remote call succeeded; `state` is never empty
    Success {
        /// Reported lifecycle state, or [`UNKNOWN_STATE`]
        state: String,
    },
    /// Remote call failed
    Failure {
        /// Error message shown next to the host name
        error: String,
    },
}

impl ActionOutcome {
    /// Classify a response, substituting [`UNKNOWN_STATE`] for a missing state
    #[must_use]
    pub fn from_response(action: BatchAction, response: &Document) -> Self {
        let state = response.text(action.state_path());
        let state = if state.is_empty() {
            UNKNOWN_STATE.to_string()
        } else {
            state
        };
        ActionOutcome::Success { state }
    }

    /// Tally label: the state, or [`ERROR_LABEL`] for failures
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            ActionOutcome::Success { state } => state,
            ActionOutcome::Failure { .. } => ERROR_LABEL,
        }
    }

    /// Text shown in the per-host report line
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            ActionOutcome::Success { state } => state,
            ActionOutcome::Failure { error } => error,
        }
    }
}
