//! Render session controller.
//!
//! Gates render triggers through a single atomic slot, then drives one
//! [`RenderSession`] to completion: the submission call and the progress
//! channel are polled together, and the session decides when it is over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::watch;

use lyrivid_common::config::AppConfig;
use lyrivid_common::error::{LyrividError, LyrividResult};
use lyrivid_project_model::lyrics::EditorSnapshot;
use lyrivid_project_model::project::RenderSettings;
use lyrivid_timing::deriver::{derive_snapshot, TimingConfig};

use crate::api::{Endpoints, HttpRenderApi, RenderApi};
use crate::channel::{HttpProgressConnector, ProgressConnector};
use crate::error::{ChannelError, SessionError};
use crate::job::{build_render_job, validate_trigger};
use crate::notify::Notifier;
use crate::session::{RenderOutcome, RenderSession, SessionState, Transition};

/// Settings the controller applies to every render.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub timing: TimingConfig,
    pub composition_id: String,
}

impl From<&AppConfig> for ControllerConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timing: TimingConfig::from(&config.render),
            composition_id: config.render.composition_id.clone(),
        }
    }
}

/// Runs at most one render session at a time.
pub struct RenderController {
    api: Arc<dyn RenderApi>,
    connector: Arc<dyn ProgressConnector>,
    notifier: Arc<dyn Notifier>,
    config: ControllerConfig,
    active: AtomicBool,
    state_tx: watch::Sender<SessionState>,
}

/// Holds the render slot. Dropping it, including when the render future is
/// cancelled, publishes `Idle` and then frees the slot.
struct SessionSlot<'a> {
    active: &'a AtomicBool,
    state_tx: &'a watch::Sender<SessionState>,
}

impl Drop for SessionSlot<'_> {
    fn drop(&mut self) {
        publish_state(self.state_tx, SessionState::Idle);
        self.active.store(false, Ordering::Release);
    }
}

fn publish_state(state_tx: &watch::Sender<SessionState>, state: SessionState) {
    state_tx.send_if_modified(|current| {
        if *current == state {
            false
        } else {
            *current = state;
            true
        }
    });
}

impl RenderController {
    pub fn new(
        api: Arc<dyn RenderApi>,
        connector: Arc<dyn ProgressConnector>,
        notifier: Arc<dyn Notifier>,
        config: ControllerConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Idle);
        Self {
            api,
            connector,
            notifier,
            config,
            active: AtomicBool::new(false),
            state_tx,
        }
    }

    /// Controller talking to the configured render server over HTTP.
    pub fn from_app_config(config: &AppConfig, notifier: Arc<dyn Notifier>) -> LyrividResult<Self> {
        let endpoints = Endpoints::from_config(&config.server)?;
        let http = Client::builder()
            .build()
            .map_err(|e| LyrividError::network(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            submit = %endpoints.submit,
            progress = %endpoints.progress,
            "Render server endpoints"
        );

        Ok(Self::new(
            Arc::new(HttpRenderApi::new(http.clone(), &endpoints)),
            Arc::new(HttpProgressConnector::new(http, endpoints.progress.clone())),
            notifier,
            ControllerConfig::from(config),
        ))
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Watch state changes (e.g. to drive a progress bar).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Whether a session currently holds the render slot.
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Trigger a render of `snapshot` and drive it to a terminal outcome.
    ///
    /// Fails fast without touching the network when audio or lyrics are
    /// missing, and with [`SessionError::Busy`] while another render holds
    /// the slot. Every other path ends with the progress channel closed, one
    /// notification fired, and the controller back to idle. Dropping the
    /// returned future also closes the channel and returns to idle, without
    /// a notification.
    pub async fn render(
        &self,
        snapshot: &EditorSnapshot,
        settings: &RenderSettings,
    ) -> Result<RenderOutcome, SessionError> {
        let timeline = derive_snapshot(snapshot, &self.config.timing);
        if let Err(e) = validate_trigger(snapshot, &timeline) {
            tracing::warn!(error = %e, "Render trigger rejected");
            self.notifier.failure(&e.user_message());
            return Err(e);
        }

        let _slot = self.acquire_slot()?;
        let job = build_render_job(snapshot, &timeline, &self.config.composition_id, settings)?;

        tracing::info!(
            lines = timeline.lines.len(),
            total_frames = job.total_frames,
            output = %job.output_file_name,
            "Render requested"
        );
        self.publish(SessionState::Requested);

        let mut session = RenderSession::new(self.connector.open(), self.notifier.clone());
        let submission = self.api.submit(&job);
        tokio::pin!(submission);
        let mut submitted = false;

        loop {
            let transition = tokio::select! {
                result = &mut submission, if !submitted => {
                    submitted = true;
                    match result {
                        Ok(reply) => session.on_submitted(reply),
                        Err(e) => session.on_submission_failed(&e.to_string()),
                    }
                }
                next = session.next_payload() => match next {
                    Some(Ok(payload)) => session.on_event(&payload),
                    Some(Err(e)) => session.on_transport_error(&e),
                    None => session.on_transport_error(&ChannelError::Ended),
                }
            };

            self.publish(session.state().clone());
            if transition == Transition::Finished {
                break;
            }
        }

        if !submitted {
            tracing::debug!("Session ended before the submission call resolved");
        }

        session.close();
        session.take_outcome().unwrap_or_else(|| {
            Err(SessionError::Transport(
                "session ended without an outcome".to_string(),
            ))
        })
    }

    fn acquire_slot(&self) -> Result<SessionSlot<'_>, SessionError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| {
                tracing::warn!("Render already in progress; trigger rejected");
                SessionError::Busy
            })?;
        Ok(SessionSlot {
            active: &self.active,
            state_tx: &self.state_tx,
        })
    }

    fn publish(&self, state: SessionState) {
        publish_state(&self.state_tx, state);
    }
}
