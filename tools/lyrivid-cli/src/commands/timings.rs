//! Print derived lyric timings.

use std::path::PathBuf;

use lyrivid_common::config::AppConfig;
use lyrivid_timing::{derive_snapshot, TimingConfig};

use super::load_project;

pub fn run(config: &AppConfig, path: PathBuf, json: bool) -> anyhow::Result<()> {
    let project = load_project(&path)?;

    let timing = TimingConfig::from(&config.render);
    let timeline = derive_snapshot(&project.project.snapshot(), &timing);

    if json {
        println!("{}", serde_json::to_string_pretty(&timeline)?);
        return Ok(());
    }

    let rate = timeline.frame_rate;
    println!(
        "{} line(s) @ {}fps, {} total frames ({:.2}s)",
        timeline.lines.len(),
        rate.fps(),
        timeline.total_frames,
        timeline.duration_secs()
    );
    for (i, line) in timeline.lines.iter().enumerate() {
        println!(
            "  {:>3}  {:>6}..{:<6} {:>7.2}s  {}",
            i + 1,
            line.start_frame,
            line.end_frame,
            rate.frame_to_secs(line.start_frame),
            line.text
        );
    }

    Ok(())
}
