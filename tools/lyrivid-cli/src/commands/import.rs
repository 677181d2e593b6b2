//! Import lyric lines from an LRC file.

use std::path::PathBuf;

use lyrivid_project_model::parse_lrc;

use super::{load_project, save_project};

pub fn run(path: PathBuf, lrc: PathBuf) -> anyhow::Result<()> {
    let mut project = load_project(&path)?;

    let content = std::fs::read_to_string(&lrc)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", lrc.display()))?;
    let lines = parse_lrc(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", lrc.display()))?;

    if lines.is_empty() {
        anyhow::bail!("No timed lyric lines found in {}", lrc.display());
    }

    let replaced = project.project.lines.len();
    let imported = lines.len();
    project.project.set_lines(lines);
    save_project(&project)?;

    tracing::info!(imported, replaced, "Imported lyrics");
    println!(
        "Imported {imported} line(s) into '{}' (replaced {replaced})",
        project.project.name
    );

    Ok(())
}
