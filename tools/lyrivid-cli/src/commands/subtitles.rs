//! Write subtitles from derived lyric timings.

use std::path::PathBuf;

use lyrivid_common::config::AppConfig;
use lyrivid_timing::{derive_snapshot, save_subtitles, TimingConfig};

use super::load_project;

pub fn run(config: &AppConfig, path: PathBuf, output: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;

    let timeline = derive_snapshot(
        &project.project.snapshot(),
        &TimingConfig::from(&config.render),
    );
    if timeline.is_empty() {
        anyhow::bail!("Project '{}' has no lyric lines", project.project.name);
    }

    save_subtitles(&timeline, &output)
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;
    println!(
        "Wrote {} cue(s) to {}",
        timeline.lines.len(),
        output.display()
    );

    Ok(())
}
