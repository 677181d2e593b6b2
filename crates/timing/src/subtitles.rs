//! Subtitle generation in SRT and VTT formats from derived lyric timings.
//!
//! Cue times come from the frame ranges, so exported subtitles line up with
//! the rendered video exactly rather than with the raw authored seconds.

use std::path::Path;

use lyrivid_common::error::LyrividResult;

use crate::deriver::DerivedTimeline;

/// Generate SRT subtitle content.
pub fn generate_srt(timeline: &DerivedTimeline) -> String {
    let rate = timeline.frame_rate;
    let mut output = String::new();

    for (i, line) in timeline.lines.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(rate.frame_to_secs(line.start_frame)),
            format_srt_time(rate.frame_to_secs(line.end_frame)),
        ));
        output.push_str(&line.text);
        output.push_str("\n\n");
    }

    output
}

/// Generate WebVTT subtitle content.
pub fn generate_vtt(timeline: &DerivedTimeline) -> String {
    let rate = timeline.frame_rate;
    let mut output = String::from("WEBVTT\n\n");

    for line in &timeline.lines {
        output.push_str(&format!(
            "{} --> {}\n",
            format_vtt_time(rate.frame_to_secs(line.start_frame)),
            format_vtt_time(rate.frame_to_secs(line.end_frame)),
        ));
        output.push_str(&line.text);
        output.push_str("\n\n");
    }

    output
}

fn split_time(secs: f64) -> (u64, u64, u64, u64) {
    let total_ms = (secs * 1000.0).round() as u64;
    (
        total_ms / 3_600_000,
        (total_ms % 3_600_000) / 60_000,
        (total_ms % 60_000) / 1000,
        total_ms % 1000,
    )
}

/// Format seconds as SRT timestamp: HH:MM:SS,mmm
fn format_srt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_time(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Format seconds as VTT timestamp: HH:MM:SS.mmm
fn format_vtt_time(secs: f64) -> String {
    let (hours, minutes, seconds, millis) = split_time(secs);
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Save subtitles to a file. `.vtt` selects WebVTT; anything else is SRT.
pub fn save_subtitles(timeline: &DerivedTimeline, path: &Path) -> LyrividResult<()> {
    let content = match path.extension().and_then(|e| e.to_str()) {
        Some("vtt") => generate_vtt(timeline),
        _ => generate_srt(timeline),
    };
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), cues = timeline.lines.len(), "Wrote subtitles");
    Ok(())
}
