use std::path::Path;

use lyrivid_common::error::LyrividError;
use lyrivid_project_model::LoadedProject;

pub mod import;
pub mod info;
pub mod init;
pub mod render;
pub mod subtitles;
pub mod timings;

/// Load a project file, reporting failures as project errors.
pub fn load_project(path: &Path) -> Result<LoadedProject, LyrividError> {
    LoadedProject::load(path).map_err(|e| LyrividError::project(e.to_string()))
}

pub fn save_project(project: &LoadedProject) -> Result<(), LyrividError> {
    project
        .save()
        .map_err(|e| LyrividError::project(e.to_string()))
}
