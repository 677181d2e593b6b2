//! User-facing notifications for render outcomes.

/// Receives the user-visible outcome of a render trigger.
pub trait Notifier: Send + Sync {
    /// The video is ready at `download_url`.
    fn success(&self, download_url: &str);

    /// The trigger was refused or the render failed.
    fn failure(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, download_url: &str) {
        tracing::info!(download_url, "Video rendered successfully");
    }

    fn failure(&self, message: &str) {
        tracing::error!(message, "Render failed");
    }
}
