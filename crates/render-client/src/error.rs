//! Error types for render submission, the progress channel, and sessions.

use lyrivid_common::error::LyrividError;

/// Message used when the progress channel drops without a terminal event.
pub const CONNECTION_LOST_MESSAGE: &str = "Lost connection to the render server";

/// Failure of the render submission call.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },
}

impl SubmitError {
    pub fn rejected(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Transport-level failure of the progress channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Failed to connect to progress stream: {0}")]
    Connect(String),

    #[error("Progress stream returned HTTP {0}")]
    Status(u16),

    #[error("Progress stream interrupted: {0}")]
    Transport(String),

    #[error("Progress stream ended unexpectedly")]
    Ended,
}

/// Why a render session did not complete.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Preconditions unmet; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Another session holds the render slot.
    #[error("A render is already in progress")]
    Busy,

    /// The submission call failed or was rejected.
    #[error("Render submission failed: {0}")]
    Submission(String),

    /// The server pushed an `error` event.
    #[error("{0}")]
    Render(String),

    /// The progress channel failed.
    #[error("Lost connection to the render server: {0}")]
    Transport(String),
}

impl SessionError {
    /// Text shown in a failure notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => CONNECTION_LOST_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<SessionError> for LyrividError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(message) => LyrividError::validation(message),
            SessionError::Transport(message) => LyrividError::network(message),
            other => LyrividError::render(other.to_string()),
        }
    }
}
