//! Generation job status and thread message types.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of remote job statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted but not yet picked up
    Queued,

    /// Being worked on by the remote service
    Running,

    /// Finished with a reply in the thread
    Completed,

    /// Finished without a usable reply
    Failed,

    /// Cancelled on the remote side
    Cancelled,

    /// Expired before it could finish
    Expired,
}

impl JobStatus {
    /// Returns true for statuses from which no further transition occurs.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Expired => "expired",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    /// Parses the remote service's run status vocabulary.
    ///
    /// Transitional remote states (`in_progress`, `requires_action`,
    /// `cancelling`) collapse into `Running`; `incomplete` counts as failed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queued" => Ok(JobStatus::Queued),
            "running" | "in_progress" | "requires_action" | "cancelling" => Ok(JobStatus::Running),
            "completed" => Ok(JobStatus::Completed),
            "failed" | "incomplete" => Ok(JobStatus::Failed),
            "cancelled" => Ok(JobStatus::Cancelled),
            "expired" => Ok(JobStatus::Expired),
            _ => Err(format!("Invalid job status: {s}")),
        }
    }
}

/// Handle for one submitted job. Lives only inside a single submit-and-poll
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub assistant_id: String,
    pub thread_id: String,
    pub run_id: String,
    pub status: JobStatus,
}

/// Author of a thread message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A message read back from a remote thread, reduced to its primary text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: MessageRole,
    pub text: String,
}

impl ThreadMessage {
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }
}
