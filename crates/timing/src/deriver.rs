//! Lyric-to-frame timing derivation.
//!
//! Each line starts at `round(start * fps)` and runs until the next line
//! starts. The last line runs to its explicit end, or for
//! `default_line_frames` when it has none. The video covers the longer of
//! the audio and the lyrics, plus a fixed tail of `buffer_frames`.

use serde::{Deserialize, Serialize};

use lyrivid_common::config::RenderDefaults;
use lyrivid_common::frames::FrameRate;
use lyrivid_project_model::lyrics::{DerivedLyricLine, EditorSnapshot, LyricLine};

/// Parameters for timing derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Composition frame rate.
    pub frame_rate: FrameRate,

    /// Frames appended after the end of the audio or the last line.
    pub buffer_frames: u64,

    /// Length of the final line when it has no explicit end.
    pub default_line_frames: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_rate: FrameRate::default(),
            buffer_frames: 30,
            default_line_frames: 90,
        }
    }
}

impl From<&RenderDefaults> for TimingConfig {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            frame_rate: FrameRate::new(defaults.fps),
            buffer_frames: defaults.buffer_frames,
            default_line_frames: defaults.default_line_frames,
        }
    }
}

/// Lyric lines mapped onto frames, plus the total video length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedTimeline {
    pub lines: Vec<DerivedLyricLine>,
    pub total_frames: u64,
    pub frame_rate: FrameRate,
}

impl DerivedTimeline {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last frame covered by any lyric line (exclusive).
    pub fn lyrics_end_frame(&self) -> u64 {
        self.lines.iter().map(|l| l.end_frame).max().unwrap_or(0)
    }

    /// Video length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_rate.frame_to_secs(self.total_frames)
    }

    /// The line on screen at `frame`, if any. Later lines win on overlap.
    pub fn line_at(&self, frame: u64) -> Option<&DerivedLyricLine> {
        self.lines.iter().rev().find(|l| l.contains(frame))
    }
}

/// Derive frame ranges for `lines` against an audio track of
/// `audio_duration_secs` (0 when unknown).
///
/// Always yields `end_frame > start_frame`: out-of-order starts and explicit
/// ends at or before the start collapse to a one-frame line. An empty input
/// yields an empty timeline with zero frames.
pub fn derive_timings(
    lines: &[LyricLine],
    audio_duration_secs: f64,
    config: &TimingConfig,
) -> DerivedTimeline {
    let rate = config.frame_rate;
    if lines.is_empty() {
        return DerivedTimeline {
            lines: vec![],
            total_frames: 0,
            frame_rate: rate,
        };
    }

    let starts: Vec<u64> = lines
        .iter()
        .map(|l| rate.secs_to_frame(l.start_time_secs))
        .collect();
    let last = lines.len() - 1;

    let derived: Vec<DerivedLyricLine> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let start_frame = starts[i];
            let proposed_end = if i < last {
                starts[i + 1]
            } else {
                match line.end_time_secs {
                    Some(end) => rate.secs_to_frame(end),
                    None => start_frame.saturating_add(config.default_line_frames),
                }
            };
            DerivedLyricLine {
                text: line.text.clone(),
                start_frame,
                end_frame: proposed_end.max(start_frame + 1),
            }
        })
        .collect();

    let lyrics_end = derived.iter().map(|l| l.end_frame).max().unwrap_or(0);
    let audio_frames = rate.secs_to_frames_ceil(audio_duration_secs);
    let total_frames = audio_frames.max(lyrics_end) + config.buffer_frames;

    tracing::trace!(
        lines = derived.len(),
        audio_frames,
        lyrics_end,
        total_frames,
        "Derived lyric timings"
    );

    DerivedTimeline {
        lines: derived,
        total_frames,
        frame_rate: rate,
    }
}

/// Derive timings from an editor snapshot.
pub fn derive_snapshot(snapshot: &EditorSnapshot, config: &TimingConfig) -> DerivedTimeline {
    derive_timings(&snapshot.lines, snapshot.audio_duration_secs(), config)
}

/// Caches the last derivation and reuses it while inputs stay identical.
#[derive(Debug, Default)]
pub struct MemoizedDeriver {
    cached: Option<CacheEntry>,
    recomputations: u64,
}

#[derive(Debug)]
struct CacheEntry {
    lines: Vec<LyricLine>,
    audio_bits: u64,
    config: TimingConfig,
    timeline: DerivedTimeline,
}

impl CacheEntry {
    fn matches(&self, lines: &[LyricLine], audio_secs: f64, config: &TimingConfig) -> bool {
        self.audio_bits == audio_secs.to_bits() && self.config == *config && self.lines == lines
    }
}

impl MemoizedDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timeline for `snapshot`, recomputed only when lines, audio duration,
    /// or config differ from the previous call.
    pub fn derive(&mut self, snapshot: &EditorSnapshot, config: &TimingConfig) -> &DerivedTimeline {
        let audio_secs = snapshot.audio_duration_secs();
        let entry = match self.cached.take() {
            Some(entry) if entry.matches(&snapshot.lines, audio_secs, config) => entry,
            _ => {
                self.recomputations += 1;
                CacheEntry {
                    lines: snapshot.lines.clone(),
                    audio_bits: audio_secs.to_bits(),
                    config: *config,
                    timeline: derive_timings(&snapshot.lines, audio_secs, config),
                }
            }
        };
        &self.cached.insert(entry).timeline
    }

    /// How many times the timeline was actually recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyrivid_project_model::lyrics::AudioRef;

    fn two_lines() -> Vec<LyricLine> {
        vec![LyricLine::new("a", 0.0), LyricLine::new("b", 2.0)]
    }

    #[test]
    fn test_two_line_scenario() {
        let timeline = derive_timings(&two_lines(), 5.0, &TimingConfig::default());

        assert_eq!(timeline.lines.len(), 2);
        assert_eq!(timeline.lines[0].start_frame, 0);
        assert_eq!(timeline.lines[0].end_frame, 60);
        assert_eq!(timeline.lines[1].start_frame, 60);
        assert_eq!(timeline.lines[1].end_frame, 150);
        assert_eq!(timeline.total_frames, 150.max(150) + 30);
    }

    #[test]
    fn test_empty_lines_yield_zero_frames() {
        let timeline = derive_timings(&[], 120.0, &TimingConfig::default());
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_frames, 0);
    }

    #[test]
    fn test_unknown_audio_follows_lyrics() {
        let timeline = derive_timings(&two_lines(), 0.0, &TimingConfig::default());
        assert_eq!(timeline.total_frames, 150 + 30);
    }

    #[test]
    fn test_long_audio_drives_total() {
        let timeline = derive_timings(&two_lines(), 60.0, &TimingConfig::default());
        assert_eq!(timeline.total_frames, 1800 + 30);
        assert!((timeline.duration_secs() - 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_end_on_last_line() {
        let lines = vec![LyricLine::new("a", 0.0), LyricLine::new("b", 2.0).with_end(2.5)];
        let timeline = derive_timings(&lines, 0.0, &TimingConfig::default());
        assert_eq!(timeline.lines[1].end_frame, 75);
    }

    #[test]
    fn test_degenerate_ranges_are_widened() {
        let lines = vec![
            LyricLine::new("a", 1.0),
            LyricLine::new("same", 1.0),
            LyricLine::new("back", 0.5).with_end(0.1),
        ];
        let timeline = derive_timings(&lines, 0.0, &TimingConfig::default());
        for line in &timeline.lines {
            assert!(line.end_frame > line.start_frame, "{line:?}");
        }
        assert_eq!(timeline.lines[0].end_frame, 31);
        assert_eq!(timeline.lines[2].end_frame, 16);
    }

    #[test]
    fn test_line_at_frame() {
        let timeline = derive_timings(&two_lines(), 5.0, &TimingConfig::default());
        assert_eq!(timeline.line_at(0).map(|l| l.text.as_str()), Some("a"));
        assert_eq!(timeline.line_at(60).map(|l| l.text.as_str()), Some("b"));
        assert!(timeline.line_at(175).is_none());
    }

    #[test]
    fn test_config_from_render_defaults() {
        let defaults = RenderDefaults {
            fps: 24,
            buffer_frames: 12,
            default_line_frames: 48,
            composition_id: "X".to_string(),
        };
        let config = TimingConfig::from(&defaults);
        assert_eq!(config.frame_rate.fps(), 24);
        assert_eq!(config.buffer_frames, 12);
        assert_eq!(config.default_line_frames, 48);
    }

    #[test]
    fn test_memoized_deriver_reuses_identical_inputs() {
        let config = TimingConfig::default();
        let mut deriver = MemoizedDeriver::new();
        let snapshot = EditorSnapshot::new(Some(AudioRef::new("s.mp3", Some(5.0))), two_lines());

        let first = deriver.derive(&snapshot, &config).clone();
        let second = deriver.derive(&snapshot, &config).clone();
        assert_eq!(first, second);
        assert_eq!(deriver.recomputations(), 1);

        let mut edited = snapshot.clone();
        edited.lines[1].start_time_secs = 3.0;
        let third = deriver.derive(&edited, &config);
        assert_eq!(third.lines[0].end_frame, 90);
        assert_eq!(deriver.recomputations(), 2);

        let faster = TimingConfig {
            frame_rate: FrameRate::new(60),
            ..config
        };
        deriver.derive(&edited, &faster);
        assert_eq!(deriver.recomputations(), 3);
    }
}
