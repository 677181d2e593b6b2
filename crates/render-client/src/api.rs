//! Render submission over HTTP.

use reqwest::{Client, Url};
use serde::Deserialize;

use lyrivid_common::config::ServerConfig;
use lyrivid_common::error::{LyrividError, LyrividResult};
use lyrivid_project_model::render::{RenderJob, RenderSubmission};

use crate::error::SubmitError;

/// Resolved render server URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub submit: Url,
    pub progress: Url,
}

impl Endpoints {
    /// Resolve the submission and progress URLs against the configured base.
    pub fn from_config(server: &ServerConfig) -> LyrividResult<Self> {
        let mut base = server.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| LyrividError::config(format!("invalid server URL '{base}': {e}")))?;

        let join = |path: &str| {
            base.join(path.trim_start_matches('/'))
                .map_err(|e| LyrividError::config(format!("invalid endpoint path '{path}': {e}")))
        };

        Ok(Self {
            submit: join(&server.submit_path)?,
            progress: join(&server.progress_path)?,
        })
    }
}

/// Submits render jobs to the server.
#[async_trait::async_trait]
pub trait RenderApi: Send + Sync {
    /// Submit a job. Resolves once the server has accepted or rejected it;
    /// the render itself continues on the server.
    async fn submit(&self, job: &RenderJob) -> Result<RenderSubmission, SubmitError>;
}

/// [`RenderApi`] over `POST {base}/render`.
#[derive(Debug, Clone)]
pub struct HttpRenderApi {
    http: Client,
    submit_url: Url,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: Option<String>,
}

impl HttpRenderApi {
    pub fn new(http: Client, endpoints: &Endpoints) -> Self {
        Self {
            http,
            submit_url: endpoints.submit.clone(),
        }
    }
}

#[async_trait::async_trait]
impl RenderApi for HttpRenderApi {
    async fn submit(&self, job: &RenderJob) -> Result<RenderSubmission, SubmitError> {
        tracing::info!(
            url = %self.submit_url,
            composition = %job.composition_id,
            total_frames = job.total_frames,
            output = %job.output_file_name,
            "Submitting render job"
        );

        let response = self
            .http
            .post(self.submit_url.clone())
            .json(job)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("server returned HTTP {}", status.as_u16()));
            return Err(SubmitError::rejected(Some(status.as_u16()), message));
        }

        let reply: RenderSubmission = serde_json::from_str(&body).map_err(|e| {
            let snippet = body.chars().take(200).collect::<String>();
            SubmitError::rejected(
                Some(status.as_u16()),
                format!("unexpected response ({e}): {snippet}"),
            )
        })?;

        if !reply.success {
            let message = if reply.message.trim().is_empty() {
                "render request was rejected".to_string()
            } else {
                reply.message.clone()
            };
            return Err(SubmitError::rejected(Some(status.as_u16()), message));
        }

        tracing::debug!(file_name = ?reply.file_name, "Render job accepted");
        Ok(reply)
    }
}
