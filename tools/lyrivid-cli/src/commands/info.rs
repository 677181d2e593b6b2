//! Show project information.

use std::path::PathBuf;

use lyrivid_common::config::AppConfig;
use lyrivid_timing::{derive_snapshot, TimingConfig};

use super::load_project;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let project = load_project(&path)?;

    let p = &project.project;

    println!("Project: {}", p.name);
    println!("  ID: {}", p.id);
    println!("  Version: {}", p.version);
    println!("  Created: {}", p.created_at);
    println!("  Modified: {}", p.modified_at);
    println!();

    println!("Audio:");
    match &p.audio {
        Some(audio) => {
            println!("  URL: {}", audio.url);
            match audio.duration_secs {
                Some(secs) => println!("  Duration: {secs:.2}s"),
                None => println!("  Duration: unknown"),
            }
        }
        None => println!("  (none)"),
    }
    println!();

    let timing = TimingConfig::from(&config.render);
    let timeline = derive_snapshot(&p.snapshot(), &timing);

    println!("Timing:");
    println!("  Lines: {}", p.lines.len());
    println!("  FPS: {}", timeline.frame_rate.fps());
    println!(
        "  Total frames: {} ({:.2}s)",
        timeline.total_frames,
        timeline.duration_secs()
    );
    println!("  Lyrics end at frame: {}", timeline.lyrics_end_frame());
    println!();

    println!("Render:");
    println!(
        "  Composition: {}",
        p.render
            .composition_id
            .as_deref()
            .unwrap_or(&config.render.composition_id)
    );
    println!(
        "  Output file: {}",
        p.render.output_file_name.as_deref().unwrap_or("(generated)")
    );

    let issues = p.validate();
    if !issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
    }

    Ok(())
}
