//! Server-push progress channel.
//!
//! A channel is opened synchronously and connects lazily the first time it
//! is read, so the connection attempt runs concurrently with whatever the
//! caller awaits alongside it. Reads are cancel-safe: an interrupted read
//! resumes the same connection attempt or stream on the next call.

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;
use futures_util::{FutureExt, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Url};

use crate::error::ChannelError;
use crate::sse::SseDecoder;

/// A one-way stream of JSON progress payloads.
#[async_trait::async_trait]
pub trait ProgressChannel: Send {
    /// Next event payload. `None` once the channel is closed or the server
    /// ended the stream.
    async fn next_payload(&mut self) -> Option<Result<String, ChannelError>>;

    /// Release the connection. Calling it again is a no-op.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

/// Opens progress channels.
pub trait ProgressConnector: Send + Sync {
    fn open(&self) -> Box<dyn ProgressChannel>;
}

/// [`ProgressConnector`] for `GET {base}/render-progress` server-sent events.
#[derive(Debug, Clone)]
pub struct HttpProgressConnector {
    http: Client,
    url: Url,
}

impl HttpProgressConnector {
    pub fn new(http: Client, url: Url) -> Self {
        Self { http, url }
    }
}

impl ProgressConnector for HttpProgressConnector {
    fn open(&self) -> Box<dyn ProgressChannel> {
        tracing::debug!(url = %self.url, "Opening progress stream");
        Box::new(HttpProgressChannel::connect(&self.http, self.url.clone()))
    }
}

enum StreamState {
    Connecting(BoxFuture<'static, reqwest::Result<reqwest::Response>>),
    Streaming(BoxStream<'static, reqwest::Result<Vec<u8>>>),
    Ended,
    Closed,
}

/// Server-sent event stream read with reqwest.
pub struct HttpProgressChannel {
    url: Url,
    state: StreamState,
    decoder: SseDecoder,
}

impl HttpProgressChannel {
    pub fn connect(http: &Client, url: Url) -> Self {
        let request = http
            .get(url.clone())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .boxed();
        Self {
            url,
            state: StreamState::Connecting(request),
            decoder: SseDecoder::new(),
        }
    }
}

#[async_trait::async_trait]
impl ProgressChannel for HttpProgressChannel {
    async fn next_payload(&mut self) -> Option<Result<String, ChannelError>> {
        loop {
            if matches!(self.state, StreamState::Closed) {
                return None;
            }
            if let Some(event) = self.decoder.next_event() {
                if let Some(name) = &event.event {
                    tracing::trace!(event = %name, "Named progress event");
                }
                return Some(Ok(event.data));
            }

            match &mut self.state {
                StreamState::Connecting(request) => match request.as_mut().await {
                    Ok(response) if response.status().is_success() => {
                        tracing::debug!(url = %self.url, "Progress stream connected");
                        let stream = response
                            .bytes_stream()
                            .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
                            .boxed();
                        self.state = StreamState::Streaming(stream);
                    }
                    Ok(response) => {
                        self.state = StreamState::Ended;
                        return Some(Err(ChannelError::Status(response.status().as_u16())));
                    }
                    Err(e) => {
                        self.state = StreamState::Ended;
                        return Some(Err(ChannelError::Connect(e.to_string())));
                    }
                },
                StreamState::Streaming(stream) => match stream.next().await {
                    Some(Ok(chunk)) => {
                        if let Err(e) = self.decoder.feed(&chunk) {
                            tracing::warn!(url = %self.url, error = %e, "Abandoning progress stream");
                            self.state = StreamState::Ended;
                            return Some(Err(ChannelError::Transport(e.to_string())));
                        }
                    }
                    Some(Err(e)) => {
                        self.state = StreamState::Ended;
                        return Some(Err(ChannelError::Transport(e.to_string())));
                    }
                    None => {
                        if self.decoder.has_partial() {
                            tracing::debug!("Discarding incomplete trailing event");
                        }
                        tracing::debug!(url = %self.url, "Progress stream ended by server");
                        self.state = StreamState::Ended;
                    }
                },
                StreamState::Ended | StreamState::Closed => return None,
            }
        }
    }

    fn close(&mut self) {
        if matches!(self.state, StreamState::Closed) {
            return;
        }
        tracing::debug!(url = %self.url, "Closing progress stream");
        self.state = StreamState::Closed;
    }

    fn is_closed(&self) -> bool {
        matches!(self.state, StreamState::Closed)
    }
}
