//! Lyric line types.
//!
//! A [`LyricLine`] is what the editor produces: text plus a start time in
//! seconds. A [`DerivedLyricLine`] is the same line mapped onto video frames
//! for composition. Order is playback order in both.

use serde::{Deserialize, Serialize};

/// A single lyric line as authored in the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Displayed text.
    pub text: String,

    /// When the line starts, in seconds from the beginning of the audio.
    pub start_time_secs: f64,

    /// Optional explicit end time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_secs: Option<f64>,
}

impl LyricLine {
    /// Create a line without an explicit end.
    pub fn new(text: impl Into<String>, start_time_secs: f64) -> Self {
        Self {
            text: text.into(),
            start_time_secs,
            end_time_secs: None,
        }
    }

    /// Set an explicit end time.
    pub fn with_end(mut self, end_time_secs: f64) -> Self {
        self.end_time_secs = Some(end_time_secs);
        self
    }
}

/// A lyric line annotated with the frame range it occupies in the video.
///
/// Invariant: `end_frame > start_frame`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedLyricLine {
    pub text: String,
    pub start_frame: u64,
    pub end_frame: u64,
}

impl DerivedLyricLine {
    /// Number of frames the line is on screen.
    pub fn duration_frames(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    /// Whether `frame` falls inside `[start_frame, end_frame)`.
    pub fn contains(&self, frame: u64) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }
}

/// Reference to the audio track a lyric video is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRef {
    /// URL (or server-side file reference) the render server can fetch.
    pub url: String,

    /// Duration in seconds, once the audio has been loaded.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl AudioRef {
    pub fn new(url: impl Into<String>, duration_secs: Option<f64>) -> Self {
        Self {
            url: url.into(),
            duration_secs,
        }
    }

    /// Duration usable for frame math. Unknown, negative, or non-finite
    /// durations count as zero.
    pub fn effective_duration_secs(&self) -> f64 {
        match self.duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => d,
            _ => 0.0,
        }
    }
}

/// Read-only view of the editor state at one instant.
///
/// The deriver and the render controller only ever see a snapshot, never
/// the live editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorSnapshot {
    /// Currently selected audio, if any.
    pub audio: Option<AudioRef>,

    /// Lyric lines in playback order.
    pub lines: Vec<LyricLine>,
}

impl EditorSnapshot {
    pub fn new(audio: Option<AudioRef>, lines: Vec<LyricLine>) -> Self {
        Self { audio, lines }
    }

    /// Audio duration for frame math (0 when no audio is loaded).
    pub fn audio_duration_secs(&self) -> f64 {
        self.audio
            .as_ref()
            .map(AudioRef::effective_duration_secs)
            .unwrap_or(0.0)
    }

    /// Whether an audio reference has been selected.
    pub fn has_audio(&self) -> bool {
        self.audio
            .as_ref()
            .map(|a| !a.url.trim().is_empty())
            .unwrap_or(false)
    }
}
