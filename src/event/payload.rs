//! Typed decoding of the webhook payload fields the templates use.
//!
//! Each supported event kind has its own struct with exactly the fields its
//! template needs, all required. Decoding an event whose payload lacks any
//! of them fails with [`DecodeError::Malformed`]. Extra fields are ignored.

use serde::Deserialize;
use thiserror::Error;

/// `X-GitHub-Event` value for stars.
pub const STAR: &str = "star";
/// `X-GitHub-Event` value for pushes.
pub const PUSH: &str = "push";
/// `X-GitHub-Event` value for workflow runs.
pub const WORKFLOW_RUN: &str = "workflow_run";

/// Why an event produced no notification.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No template exists for this event/action pair.
    #[error("unsupported event '{event_type}' (action: {})", .action.as_deref().unwrap_or("none"))]
    Unsupported {
        /// The `X-GitHub-Event` header value
        event_type: String,
        /// The payload's `action`, if present
        action: Option<String>,
    },

    /// The event is supported but a required field is missing or mistyped.
    #[error("malformed '{event_type}' payload: {source}")]
    Malformed {
        /// The `X-GitHub-Event` header value
        event_type: &'static str,
        /// Underlying deserialization error
        #[source]
        source: serde_json::Error,
    },
}

/// Whether a star was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarAction {
    /// `action: "created"`
    Created,
    /// `action: "deleted"`
    Deleted,
}

/// A decoded, supported webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubEvent {
    /// A repository was starred or unstarred.
    Star {
        /// Starred or unstarred
        action: StarAction,
        /// Event fields
        payload: StarPayload,
    },
    /// Commits were pushed.
    Push(PushPayload),
    /// A workflow run finished.
    WorkflowRunCompleted(WorkflowRunPayload),
}

/// Repository fields shared by star and push events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// `owner/name`
    pub full_name: String,
    /// Web URL of the repository
    pub html_url: String,
    /// Current star count
    pub stargazers_count: u64,
}

/// Repository fields used by workflow run events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryName {
    /// `owner/name`
    pub full_name: String,
}

/// The account that triggered the event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sender {
    /// GitHub login
    pub login: String,
}

/// Payload of a `star` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StarPayload {
    /// Starred repository
    pub repository: Repository,
    /// Who (un)starred it
    pub sender: Sender,
}

/// The git identity that pushed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pusher {
    /// Git author name
    pub name: String,
}

/// One pushed commit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Commit {
    /// Commit SHA
    pub id: String,
    /// Full commit message
    pub message: String,
    /// Web URL of the commit
    pub url: String,
}

/// Payload of a `push` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushPayload {
    /// Target repository
    pub repository: Repository,
    /// Who pushed
    pub pusher: Pusher,
    /// Pushed commits, oldest first
    pub commits: Vec<Commit>,
    /// Compare view URL for the pushed range
    pub compare: String,
}

/// The run summary inside a `workflow_run` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRun {
    /// Event that triggered the run (`push`, `pull_request`, ...)
    pub event: String,
    /// Workflow name
    pub name: String,
    /// `success`, `failure`, `cancelled`, ...
    pub conclusion: String,
    /// Title shown in the Actions UI, usually the commit headline
    pub display_title: String,
    /// Web URL of the run
    pub html_url: String,
}

/// Payload of a completed `workflow_run` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkflowRunPayload {
    /// Repository the workflow ran in
    pub repository: RepositoryName,
    /// Who triggered the run
    pub sender: Sender,
    /// Run details
    pub workflow_run: WorkflowRun,
}

impl GithubEvent {
    /// Decodes a webhook payload for the given event type and action.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Unsupported`] for event/action pairs without a
    /// template and [`DecodeError::Malformed`] when a required field is
    /// missing or has the wrong type.
    pub fn decode(
        event_type: &str,
        action: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<Self, DecodeError> {
        match (event_type, action) {
            (STAR, Some("created")) => Ok(Self::Star {
                action: StarAction::Created,
                payload: decode_as(STAR, payload)?,
            }),
            (STAR, Some("deleted")) => Ok(Self::Star {
                action: StarAction::Deleted,
                payload: decode_as(STAR, payload)?,
            }),
            (PUSH, _) => Ok(Self::Push(decode_as(PUSH, payload)?)),
            (WORKFLOW_RUN, Some("completed")) => {
                Ok(Self::WorkflowRunCompleted(decode_as(WORKFLOW_RUN, payload)?))
            }
            _ => Err(DecodeError::Unsupported {
                event_type: event_type.to_string(),
                action: action.map(ToString::to_string),
            }),
        }
    }
}

fn decode_as<'a, T: Deserialize<'a>>(
    event_type: &'static str,
    payload: &'a serde_json::Value,
) -> Result<T, DecodeError> {
    T::deserialize(payload).map_err(|source| DecodeError::Malformed { event_type, source })
}
