//! Render job and progress types exchanged with the render server.
//!
//! Wire formats use camelCase field names to match the server's JSON.

use serde::{Deserialize, Serialize};

use crate::lyrics::DerivedLyricLine;

/// Message used when the server reports an error without saying why.
pub const DEFAULT_RENDER_ERROR_MESSAGE: &str = "Render failed";

/// A render request. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    /// Composition the server should instantiate.
    pub composition_id: String,

    /// Parameters handed to the composition.
    pub input_props: InputProps,

    /// File name the server writes the video to.
    pub output_file_name: String,

    /// Length of the video in frames.
    pub total_frames: u64,
}

/// Serializable composition parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputProps {
    pub lyrics: Vec<DerivedLyricLine>,
    pub audio_url: String,
    pub fps: u32,
    pub duration_in_frames: u64,
}

/// Current status of a render, as last reported by the server.
///
/// Built from a [`ProgressEvent`]; never serialized directly.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderProgress {
    /// The server is bundling the composition.
    Bundling,
    /// Frames are being rendered; `progress` is in `[0, 1]`.
    Rendering { progress: f64 },
    /// The video is ready.
    Complete { download_url: String },
    /// The render failed.
    Error { message: String },
}

impl RenderProgress {
    /// Parse a pushed JSON payload.
    pub fn parse(payload: &str) -> Result<Self, ProgressEventError> {
        let event: ProgressEvent = serde_json::from_str(payload)?;
        Self::try_from(event)
    }

    /// `complete` and `error` end a render session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Short label for logs and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bundling => "bundling",
            Self::Rendering { .. } => "rendering",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}

/// Raw event as pushed over the progress channel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub progress: Option<f64>,
    pub message: Option<String>,
    pub download_url: Option<String>,
}

/// Why a pushed payload could not become a [`RenderProgress`].
#[derive(Debug, thiserror::Error)]
pub enum ProgressEventError {
    #[error("Malformed progress event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown progress event type: {0}")]
    UnknownType(String),
}

impl TryFrom<ProgressEvent> for RenderProgress {
    type Error = ProgressEventError;

    fn try_from(event: ProgressEvent) -> Result<Self, ProgressEventError> {
        match event.kind.as_str() {
            "bundling" => Ok(Self::Bundling),
            "rendering" => {
                let progress = event
                    .progress
                    .filter(|p| p.is_finite())
                    .unwrap_or(0.0)
                    .clamp(0.0, 1.0);
                Ok(Self::Rendering { progress })
            }
            "complete" => Ok(Self::Complete {
                download_url: event.download_url.unwrap_or_default(),
            }),
            "error" => Ok(Self::Error {
                message: event
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_RENDER_ERROR_MESSAGE.to_string()),
            }),
            other => Err(ProgressEventError::UnknownType(other.to_string())),
        }
    }
}

/// Reply to a render submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSubmission {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

fn default_success() -> bool {
    true
}
