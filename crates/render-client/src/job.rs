//! Render job construction and trigger preconditions.

use lyrivid_project_model::lyrics::EditorSnapshot;
use lyrivid_project_model::project::RenderSettings;
use lyrivid_project_model::render::{InputProps, RenderJob};
use lyrivid_timing::deriver::DerivedTimeline;

use crate::error::SessionError;

pub const NO_AUDIO_MESSAGE: &str = "Select an audio track before rendering";
pub const NO_LYRICS_MESSAGE: &str = "Add lyrics before rendering";

/// Check that a render can be triggered: audio selected, lyrics present.
pub fn validate_trigger(
    snapshot: &EditorSnapshot,
    timeline: &DerivedTimeline,
) -> Result<(), SessionError> {
    if !snapshot.has_audio() {
        return Err(SessionError::Validation(NO_AUDIO_MESSAGE.to_string()));
    }
    if timeline.is_empty() {
        return Err(SessionError::Validation(NO_LYRICS_MESSAGE.to_string()));
    }
    Ok(())
}

/// Build the job for a validated snapshot.
pub fn build_render_job(
    snapshot: &EditorSnapshot,
    timeline: &DerivedTimeline,
    default_composition_id: &str,
    settings: &RenderSettings,
) -> Result<RenderJob, SessionError> {
    validate_trigger(snapshot, timeline)?;
    let audio_url = snapshot
        .audio
        .as_ref()
        .map(|a| a.url.clone())
        .unwrap_or_default();

    let composition_id = settings
        .composition_id
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| default_composition_id.to_string());

    let output_file_name = settings
        .output_file_name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(default_output_file_name);

    Ok(RenderJob {
        composition_id,
        input_props: InputProps {
            lyrics: timeline.lines.clone(),
            audio_url,
            fps: timeline.frame_rate.fps(),
            duration_in_frames: timeline.total_frames,
        },
        output_file_name,
        total_frames: timeline.total_frames,
    })
}

/// `lyric-video-<unix millis>.mp4`
pub fn default_output_file_name() -> String {
    format!("lyric-video-{}.mp4", chrono::Utc::now().timestamp_millis())
}
