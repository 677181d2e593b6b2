//! Lyrivid CLI: manage lyric projects and render lyric videos.
//!
//! Usage:
//!   lyrivid init <NAME>                 Create an empty project
//!   lyrivid import <PROJECT> <LRC>      Replace lyric lines from an LRC file
//!   lyrivid info <PROJECT>              Show project information
//!   lyrivid timings <PROJECT>           Print derived frame ranges
//!   lyrivid subtitles <PROJECT> <OUT>   Write SRT/VTT subtitles
//!   lyrivid render <PROJECT>            Render a video on the render server

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lyrivid_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "lyrivid",
    about = "Lyric video projects: timing, subtitles, and rendering",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new empty project
    Init {
        /// Project name
        name: String,

        /// Output directory (defaults to the configured projects directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Audio track URL or server path
        #[arg(long)]
        audio: Option<String>,

        /// Audio duration in seconds
        #[arg(long, requires = "audio")]
        duration: Option<f64>,
    },

    /// Replace a project's lyric lines from an LRC file
    Import {
        /// Path to the project file
        project: PathBuf,

        /// LRC file to import
        lrc: PathBuf,
    },

    /// Show project information
    Info {
        /// Path to the project file
        project: PathBuf,
    },

    /// Print per-line frame ranges and the total frame count
    Timings {
        /// Path to the project file
        project: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Write subtitles from derived timings (.srt or .vtt)
    Subtitles {
        /// Path to the project file
        project: PathBuf,

        /// Output subtitle file
        output: PathBuf,
    },

    /// Render the project on the render server
    Render {
        /// Path to the project file
        project: PathBuf,

        /// Render server base URL (overrides config)
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    lyrivid_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Init {
            name,
            output,
            audio,
            duration,
        } => commands::init::run(&config, name, output, audio, duration),
        Commands::Import { project, lrc } => commands::import::run(project, lrc),
        Commands::Info { project } => commands::info::run(&config, project),
        Commands::Timings { project, json } => commands::timings::run(&config, project, json),
        Commands::Subtitles { project, output } => {
            commands::subtitles::run(&config, project, output)
        }
        Commands::Render { project, server } => {
            commands::render::run(config, project, server).await
        }
    }
}
