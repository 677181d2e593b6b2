//! Initialize a new Lyrivid project.

use std::path::PathBuf;

use lyrivid_common::config::AppConfig;
use lyrivid_common::error::LyrividError;
use lyrivid_project_model::lyrics::AudioRef;
use lyrivid_project_model::LoadedProject;

use super::save_project;

pub fn run(
    config: &AppConfig,
    name: String,
    output: Option<PathBuf>,
    audio: Option<String>,
    duration: Option<f64>,
) -> anyhow::Result<()> {
    let dir = output.unwrap_or_else(|| config.projects_dir.clone());
    println!("Creating project '{}' in {}", name, dir.display());

    let mut project =
        LoadedProject::create(&dir, &name).map_err(|e| LyrividError::project(e.to_string()))?;

    if let Some(url) = audio {
        if let Some(secs) = duration {
            if !secs.is_finite() || secs < 0.0 {
                anyhow::bail!("Audio duration must be a non-negative number of seconds");
            }
        }
        project.project.audio = Some(AudioRef::new(url, duration));
        project.project.touch();
        save_project(&project)?;
    }

    println!("Project created successfully:");
    println!("  File: {}", project.path.display());
    println!("  ID: {}", project.project.id);
    match &project.project.audio {
        Some(audio) => println!("  Audio: {}", audio.url),
        None => println!("  Audio: (none)"),
    }
    println!();
    println!("Next: lyrivid import {} <lyrics.lrc>", project.path.display());

    Ok(())
}
