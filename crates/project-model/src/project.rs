//! Lyric project metadata and persistence.
//!
//! A project ties together the audio reference, the edited lyric lines, and
//! render settings. It is stored as a single pretty-printed JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::lyrics::{AudioRef, EditorSnapshot, LyricLine};

/// File extension used for project files.
pub const PROJECT_FILE_SUFFIX: &str = ".lyrivid.json";

/// Top-level project file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LyricProject {
    /// Schema version.
    pub version: String,

    /// Human-readable project name.
    pub name: String,

    /// Unique project identifier (UUID).
    pub id: String,

    /// Creation timestamp (ISO 8601).
    pub created_at: String,

    /// Last modified timestamp (ISO 8601).
    pub modified_at: String,

    /// Selected audio track.
    #[serde(default)]
    pub audio: Option<AudioRef>,

    /// Lyric lines in playback order.
    #[serde(default)]
    pub lines: Vec<LyricLine>,

    /// Render settings.
    #[serde(default)]
    pub render: RenderSettings,
}

/// Per-project render settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Composition override; the configured default is used when unset.
    #[serde(default)]
    pub composition_id: Option<String>,

    /// Output file name override; a timestamped name is generated when unset.
    #[serde(default)]
    pub output_file_name: Option<String>,
}

/// A project together with the file it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// Filesystem path to the project file.
    pub path: PathBuf,

    /// Project contents.
    pub project: LyricProject,
}

impl LyricProject {
    /// Create a new, empty project.
    pub fn new(name: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: "1.0".to_string(),
            name: name.into(),
            id: uuid_v4(),
            created_at: now.clone(),
            modified_at: now,
            audio: None,
            lines: vec![],
            render: RenderSettings::default(),
        }
    }

    /// Read-only snapshot handed to timing derivation and rendering.
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot::new(self.audio.clone(), self.lines.clone())
    }

    /// Replace all lyric lines.
    pub fn set_lines(&mut self, lines: Vec<LyricLine>) {
        self.lines = lines;
        self.touch();
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }

    /// Report problems that would stop or degrade a render.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = vec![];

        match &self.audio {
            None => issues.push("No audio selected".to_string()),
            Some(audio) if audio.url.trim().is_empty() => {
                issues.push("Audio reference is empty".to_string())
            }
            Some(audio) if audio.duration_secs.is_none() => {
                issues.push("Audio duration unknown; video length follows lyrics only".to_string())
            }
            Some(_) => {}
        }

        if self.lines.is_empty() {
            issues.push("No lyric lines".to_string());
        }

        for (i, line) in self.lines.iter().enumerate() {
            if line.text.trim().is_empty() {
                issues.push(format!("Line {} has no text", i + 1));
            }
            if !line.start_time_secs.is_finite() || line.start_time_secs < 0.0 {
                issues.push(format!("Line {} has an invalid start time", i + 1));
            }
        }

        for (i, pair) in self.lines.windows(2).enumerate() {
            if pair[1].start_time_secs <= pair[0].start_time_secs {
                issues.push(format!(
                    "Line {} does not start after line {}",
                    i + 2,
                    i + 1
                ));
            }
        }

        issues
    }
}

impl LoadedProject {
    /// Load a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();

        let json = std::fs::read_to_string(&path).map_err(|e| ProjectError::IoError {
            path: path.clone(),
            source: e,
        })?;

        let project: LyricProject =
            serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
                path: path.clone(),
                source: e,
            })?;

        Ok(Self { path, project })
    }

    /// Save the project back to its file.
    pub fn save(&self) -> Result<(), ProjectError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ProjectError::IoError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let json =
            serde_json::to_string_pretty(&self.project).map_err(|e| ProjectError::ParseError {
                path: self.path.clone(),
                source: e,
            })?;
        std::fs::write(&self.path, json).map_err(|e| ProjectError::IoError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// Create a new project file `<dir>/<name>.lyrivid.json`.
    ///
    /// Refuses to overwrite an existing file.
    pub fn create(dir: impl AsRef<Path>, name: impl Into<String>) -> Result<Self, ProjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProjectError::ValidationError {
                message: "project name must not be empty".to_string(),
            });
        }

        let path = dir.as_ref().join(format!("{name}{PROJECT_FILE_SUFFIX}"));
        if path.exists() {
            return Err(ProjectError::ValidationError {
                message: format!("{} already exists", path.display()),
            });
        }

        let loaded = Self {
            path,
            project: LyricProject::new(name),
        };
        loaded.save()?;
        Ok(loaded)
    }
}

/// Errors that can occur when working with projects.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

/// Generate a time-seeded UUID v4-shaped identifier.
fn uuid_v4() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mixed = seed ^ (seed << 37) ^ (std::process::id() as u128) << 96;
    format!(
        "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
        (mixed & 0xFFFF_FFFF) as u32,
        ((mixed >> 32) & 0xFFFF) as u16,
        ((mixed >> 48) & 0x0FFF) as u16,
        (((mixed >> 60) & 0x3FFF) as u16) | 0x8000,
        (mixed >> 76) & 0xFFFF_FFFF_FFFF,
    )
}
