//! Error types shared across Lyrivid crates.

/// Top-level error type for Lyrivid operations.
#[derive(Debug, thiserror::Error)]
pub enum LyrividError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Project error: {message}")]
    Project { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using LyrividError.
pub type LyrividResult<T> = Result<T, LyrividError>;

impl LyrividError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn project(msg: impl Into<String>) -> Self {
        Self::Project {
            message: msg.into(),
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Message suitable for a user-facing notification.
    ///
    /// Wrapper variants keep their `Display` output; domain variants drop the
    /// category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message }
            | Self::Render { message }
            | Self::Project { message }
            | Self::Network { message }
            | Self::Config { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = LyrividError::validation("Add lyrics before rendering");
        assert_eq!(
            err.to_string(),
            "Validation error: Add lyrics before rendering"
        );
    }

    #[test]
    fn test_user_message_strips_category() {
        let err = LyrividError::network("connection refused");
        assert_eq!(err.user_message(), "connection refused");

        let project = LyrividError::project("missing.lyrivid.json: not found");
        assert_eq!(project.user_message(), "missing.lyrivid.json: not found");
        assert!(project.to_string().starts_with("Project error:"));

        let io = LyrividError::from(std::io::Error::other("disk full"));
        assert_eq!(io.user_message(), "disk full");
    }
}
