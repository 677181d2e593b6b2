//! Render session state machine.
//!
//! A [`RenderSession`] owns the progress channel for one render, from the
//! moment the render is requested until a terminal outcome. Every input
//! goes through one of the `on_*` transitions; the first terminal transition
//! closes the channel, fires exactly one notification, and makes all later
//! inputs no-ops.

use std::sync::Arc;

use lyrivid_project_model::render::{RenderProgress, RenderSubmission};

use crate::channel::ProgressChannel;
use crate::error::{ChannelError, SessionError};
use crate::notify::Notifier;

/// Externally visible state of the render controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No render in flight.
    Idle,
    /// Render triggered; nothing heard from the server yet.
    Requested,
    /// The server is bundling the composition.
    Bundling,
    /// Frames are being rendered.
    Rendering { progress: f64 },
}

impl SessionState {
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Whether the session is still waiting for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Continue,
    Finished,
}

/// A successfully completed render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub download_url: String,
    /// File name reported by the submission reply, if it arrived in time.
    pub file_name: Option<String>,
}

pub struct RenderSession {
    channel: Box<dyn ProgressChannel>,
    notifier: Arc<dyn Notifier>,
    state: SessionState,
    status: Option<RenderProgress>,
    submission: Option<RenderSubmission>,
    outcome: Option<Result<RenderOutcome, SessionError>>,
    closed: bool,
}

impl RenderSession {
    /// Start a session on an already opened channel.
    pub fn new(channel: Box<dyn ProgressChannel>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            channel,
            notifier,
            state: SessionState::Requested,
            status: None,
            submission: None,
            outcome: None,
            closed: false,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Last progress reported by the server.
    pub fn status(&self) -> Option<&RenderProgress> {
        self.status.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Read the next payload from the channel. `None` after close.
    pub async fn next_payload(&mut self) -> Option<Result<String, ChannelError>> {
        if self.closed {
            return None;
        }
        self.channel.next_payload().await
    }

    /// Apply one pushed payload.
    pub fn on_event(&mut self, payload: &str) -> Transition {
        if self.is_finished() {
            tracing::debug!("Ignoring progress event after session end");
            return Transition::Finished;
        }

        let progress = match RenderProgress::parse(payload) {
            Ok(progress) => progress,
            Err(e) => {
                tracing::warn!(error = %e, payload, "Ignoring unusable progress event");
                return Transition::Continue;
            }
        };

        tracing::debug!(status = progress.label(), "Render progress");
        self.status = Some(progress.clone());

        match progress {
            RenderProgress::Bundling => {
                self.state = SessionState::Bundling;
                Transition::Continue
            }
            RenderProgress::Rendering { progress } => {
                self.state = SessionState::Rendering { progress };
                Transition::Continue
            }
            RenderProgress::Complete { download_url } => {
                let file_name = self.submission.as_ref().and_then(|s| s.file_name.clone());
                self.finish(Ok(RenderOutcome {
                    download_url,
                    file_name,
                }))
            }
            RenderProgress::Error { message } => self.finish(Err(SessionError::Render(message))),
        }
    }

    /// The channel failed at the transport level, or ended without a
    /// terminal event.
    pub fn on_transport_error(&mut self, err: &ChannelError) -> Transition {
        if self.is_finished() {
            return Transition::Finished;
        }
        tracing::warn!(error = %err, "Progress channel failed");
        self.finish(Err(SessionError::Transport(err.to_string())))
    }

    /// The submission call resolved successfully.
    pub fn on_submitted(&mut self, reply: RenderSubmission) -> Transition {
        if self.is_finished() {
            return Transition::Finished;
        }
        tracing::info!(
            file_name = ?reply.file_name,
            message = %reply.message,
            "Render accepted by server"
        );
        self.submission = Some(reply);
        Transition::Continue
    }

    /// The submission call failed or was rejected.
    pub fn on_submission_failed(&mut self, message: &str) -> Transition {
        if self.is_finished() {
            return Transition::Finished;
        }
        self.finish(Err(SessionError::Submission(message.to_string())))
    }

    /// Close the progress channel. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.channel.close();
    }

    /// Take the terminal outcome, if the session has finished.
    pub fn take_outcome(&mut self) -> Option<Result<RenderOutcome, SessionError>> {
        self.outcome.take()
    }

    fn finish(&mut self, outcome: Result<RenderOutcome, SessionError>) -> Transition {
        self.close();
        match &outcome {
            Ok(done) => {
                tracing::info!(download_url = %done.download_url, "Render complete");
                self.notifier.success(&done.download_url);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Render session failed");
                self.notifier.failure(&e.user_message());
            }
        }
        self.state = SessionState::Idle;
        self.outcome = Some(outcome);
        Transition::Finished
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.close();
    }
}
