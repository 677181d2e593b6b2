//! Render a project on the render server.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use lyrivid_common::config::AppConfig;
use lyrivid_common::error::LyrividError;
use lyrivid_render_client::{Notifier, RenderController, SessionError, SessionState};

use super::load_project;

/// Prints render outcomes to the terminal.
struct CliNotifier;

impl Notifier for CliNotifier {
    fn success(&self, download_url: &str) {
        println!("\nVideo rendered successfully: {download_url}");
    }

    fn failure(&self, message: &str) {
        println!("\nRender failed: {message}");
    }
}

pub async fn run(
    mut config: AppConfig,
    path: PathBuf,
    server: Option<String>,
) -> anyhow::Result<()> {
    if let Some(server) = server {
        config.server.base_url = server;
    }

    let project = load_project(&path)?;

    println!("Rendering '{}'", project.project.name);
    println!("  Server: {}", config.server.base_url);

    let controller = RenderController::from_app_config(&config, Arc::new(CliNotifier))
        .map_err(|e| anyhow::anyhow!("{}", e.user_message()))?;

    let mut states = controller.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            match state {
                SessionState::Requested => print!("\r  Requested...                "),
                SessionState::Bundling => print!("\r  Bundling...                 "),
                SessionState::Rendering { progress } => {
                    print!("\r  Rendering: {:.1}%          ", progress * 100.0)
                }
                SessionState::Idle => {}
            }
            std::io::stdout().flush().ok();
        }
    });

    let result = controller
        .render(&project.project.snapshot(), &project.project.render)
        .await;
    printer.abort();

    match result {
        Ok(outcome) => {
            if let Some(file_name) = outcome.file_name {
                println!("  File: {file_name}");
            }
            Ok(())
        }
        Err(e) => Err(session_failure(e)),
    }
}

/// Error returned once a render fails. The notifier has already printed
/// every failure except a busy rejection, so only that one is repeated.
fn session_failure(err: SessionError) -> anyhow::Error {
    match err {
        SessionError::Busy => LyrividError::from(err).into(),
        _ => anyhow::anyhow!("render did not complete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notified_failures_are_not_repeated() {
        let err = session_failure(SessionError::Validation(
            "Add lyrics before rendering".to_string(),
        ));
        assert!(!err.to_string().contains("Add lyrics"));

        let err = session_failure(SessionError::Transport("reset".to_string()));
        assert!(!err.to_string().contains("reset"));
    }

    #[test]
    fn test_busy_is_reported() {
        let err = session_failure(SessionError::Busy);
        assert!(err.to_string().contains("already in progress"));
    }
}
