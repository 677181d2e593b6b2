//! Import of LRC (`[mm:ss.xx] text`) lyric files.
//!
//! Supported:
//! - one or more timestamp tags per line (`[00:12.30][01:02.00]Chorus`)
//! - `mm:ss`, `mm:ss.xx`, `mm:ss.xxx`, and `mm:ss:xx` timestamps
//! - the `[offset:±ms]` header (positive values make lyrics appear earlier)
//! - other `[key:value]` headers, which are skipped
//!
//! A timestamp with no text marks the end of the line before it.

use crate::lyrics::LyricLine;

/// Errors that can occur while parsing an LRC file.
#[derive(Debug, thiserror::Error)]
pub enum LrcError {
    #[error("Invalid timestamp '{tag}' on line {line}")]
    InvalidTimestamp { line: usize, tag: String },

    #[error("Invalid offset '{value}' on line {line}")]
    InvalidOffset { line: usize, value: String },
}

/// Parse LRC content into lyric lines sorted by start time.
pub fn parse_lrc(content: &str) -> Result<Vec<LyricLine>, LrcError> {
    let mut offset_secs = 0.0;
    // (start, text); empty text marks an end time
    let mut entries: Vec<(f64, String)> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let mut rest = raw.trim();
        let mut stamps = Vec::new();

        while let Some(tag_body) = rest.strip_prefix('[') {
            let Some(close) = tag_body.find(']') else {
                break;
            };
            let tag = &tag_body[..close];

            // "[Chorus]" and similar are part of the lyric text
            let Some((key, value)) = tag.split_once(':') else {
                break;
            };
            rest = &tag_body[close + 1..];

            if key.trim().chars().all(|c| c.is_ascii_digit()) && !key.trim().is_empty() {
                let secs = parse_timestamp(key.trim(), value.trim()).ok_or_else(|| {
                    LrcError::InvalidTimestamp {
                        line: line_no,
                        tag: tag.to_string(),
                    }
                })?;
                stamps.push(secs);
            } else if key.trim().eq_ignore_ascii_case("offset") {
                let ms: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| LrcError::InvalidOffset {
                        line: line_no,
                        value: value.trim().to_string(),
                    })?;
                offset_secs = ms / 1000.0;
            }
        }

        let text = rest.trim();
        for secs in stamps {
            entries.push((secs, text.to_string()));
        }
    }

    entries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut lines: Vec<LyricLine> = Vec::with_capacity(entries.len());
    for (secs, text) in entries {
        let start = (secs - offset_secs).max(0.0);
        if text.is_empty() {
            if let Some(prev) = lines.last_mut() {
                if prev.end_time_secs.is_none() && start > prev.start_time_secs {
                    prev.end_time_secs = Some(start);
                }
            }
            continue;
        }
        lines.push(LyricLine::new(text, start));
    }

    Ok(lines)
}

/// Parse `mm` and `ss[.fff]` / `ss:xx` into seconds.
fn parse_timestamp(minutes: &str, rest: &str) -> Option<f64> {
    let minutes: u64 = minutes.parse().ok()?;
    let (secs, fraction) = match rest.split_once(['.', ':']) {
        Some((s, f)) => (s, Some(f)),
        None => (rest, None),
    };
    if secs.is_empty() || !secs.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let secs: u64 = secs.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    let fraction = match fraction {
        Some(f) if !f.is_empty() && f.chars().all(|c| c.is_ascii_digit()) => {
            f.parse::<u64>().ok()? as f64 / 10f64.powi(f.len() as i32)
        }
        Some(_) => return None,
        None => 0.0,
    };
    Some(minutes as f64 * 60.0 + secs as f64 + fraction)
}
