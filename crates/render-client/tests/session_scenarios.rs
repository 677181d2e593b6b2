use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};

use lyrivid_project_model::lyrics::{AudioRef, EditorSnapshot, LyricLine};
use lyrivid_project_model::project::RenderSettings;
use lyrivid_project_model::render::{RenderJob, RenderSubmission};
use lyrivid_render_client::{
    ChannelError, ControllerConfig, Notifier, ProgressChannel, ProgressConnector, RenderApi,
    RenderController, SessionError, SessionState, SubmitError, CONNECTION_LOST_MESSAGE,
};
use lyrivid_timing::TimingConfig;

type Feed = mpsc::UnboundedSender<Result<String, ChannelError>>;

#[derive(Default)]
struct FakeApi {
    calls: AtomicUsize,
    jobs: Mutex<Vec<RenderJob>>,
    reject_with: Mutex<Option<String>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

#[async_trait::async_trait]
impl RenderApi for FakeApi {
    async fn submit(&self, job: &RenderJob) -> Result<RenderSubmission, SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let rejection = self.reject_with.lock().unwrap().clone();
        match rejection {
            Some(message) => Err(SubmitError::rejected(Some(503), message)),
            None => Ok(RenderSubmission {
                success: true,
                message: "Render started".to_string(),
                file_name: Some(job.output_file_name.clone()),
                download_url: None,
            }),
        }
    }
}

struct FakeChannel {
    rx: mpsc::UnboundedReceiver<Result<String, ChannelError>>,
    close_calls: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait::async_trait]
impl ProgressChannel for FakeChannel {
    async fn next_payload(&mut self) -> Option<Result<String, ChannelError>> {
        if self.closed {
            return None;
        }
        self.rx.recv().await
    }

    fn close(&mut self) {
        // counts raw calls so tests see every close the controller issues
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[derive(Default)]
struct FakeConnector {
    opens: AtomicUsize,
    close_calls: Arc<AtomicUsize>,
    pending: Mutex<Vec<mpsc::UnboundedReceiver<Result<String, ChannelError>>>>,
}

impl FakeConnector {
    /// Queue a channel for the next `open`; returns its sending side.
    fn prepare(&self) -> Feed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.pending.lock().unwrap().push(rx);
        tx
    }
}

impl ProgressConnector for FakeConnector {
    fn open(&self) -> Box<dyn ProgressChannel> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let rx = self.pending.lock().unwrap().remove(0);
        Box::new(FakeChannel {
            rx,
            close_calls: self.close_calls.clone(),
            closed: false,
        })
    }
}

#[derive(Default)]
struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl Notifier for RecordingNotifier {
    fn success(&self, download_url: &str) {
        self.successes.lock().unwrap().push(download_url.to_string());
    }

    fn failure(&self, message: &str) {
        self.failures.lock().unwrap().push(message.to_string());
    }
}

struct Harness {
    controller: Arc<RenderController>,
    api: Arc<FakeApi>,
    connector: Arc<FakeConnector>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        let api = Arc::new(FakeApi::default());
        let connector = Arc::new(FakeConnector::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = Arc::new(RenderController::new(
            api.clone(),
            connector.clone(),
            notifier.clone(),
            ControllerConfig {
                timing: TimingConfig::default(),
                composition_id: "LyricVideo".to_string(),
            },
        ));
        Self {
            controller,
            api,
            connector,
            notifier,
        }
    }

    fn spawn_render(
        &self,
        snapshot: EditorSnapshot,
    ) -> tokio::task::JoinHandle<Result<lyrivid_render_client::RenderOutcome, SessionError>> {
        let controller = self.controller.clone();
        tokio::spawn(async move {
            controller
                .render(&snapshot, &RenderSettings::default())
                .await
        })
    }

    async fn wait_for(&self, predicate: impl FnMut(&SessionState) -> bool) {
        let mut rx = self.controller.subscribe();
        rx.wait_for(predicate).await.unwrap();
    }

    fn closes(&self) -> usize {
        self.connector.close_calls.load(Ordering::SeqCst)
    }
}

fn snapshot() -> EditorSnapshot {
    EditorSnapshot::new(
        Some(AudioRef::new("uploads/song.mp3", Some(5.0))),
        vec![LyricLine::new("a", 0.0), LyricLine::new("b", 2.0)],
    )
}

#[tokio::test]
async fn empty_lyrics_fail_fast_without_network() {
    let h = Harness::new();
    let empty = EditorSnapshot::new(Some(AudioRef::new("uploads/song.mp3", Some(5.0))), vec![]);

    let result = h
        .controller
        .render(&empty, &RenderSettings::default())
        .await;

    assert!(matches!(result, Err(SessionError::Validation(_))));
    assert_eq!(h.controller.state(), SessionState::Idle);
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.connector.opens.load(Ordering::SeqCst), 0);
    assert_eq!(h.notifier.failures.lock().unwrap().len(), 1);
    assert!(!h.controller.is_busy());
}

#[tokio::test]
async fn missing_audio_fails_fast_without_network() {
    let h = Harness::new();
    let no_audio = EditorSnapshot::new(None, vec![LyricLine::new("a", 0.0)]);

    let result = h
        .controller
        .render(&no_audio, &RenderSettings::default())
        .await;

    assert!(matches!(result, Err(SessionError::Validation(_))));
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.connector.opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rendering_then_complete_notifies_success_once() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    h.wait_for(|s| *s == SessionState::Requested).await;

    feed.send(Ok(r#"{"type":"rendering","progress":0.5}"#.to_string()))
        .unwrap();
    h.wait_for(|s| *s == SessionState::Rendering { progress: 0.5 })
        .await;
    assert!(h.controller.is_busy());

    feed.send(Ok(r#"{"type":"complete","downloadUrl":"x"}"#.to_string()))
        .unwrap();
    let outcome = task.await.unwrap().unwrap();

    assert_eq!(outcome.download_url, "x");
    assert_eq!(h.controller.state(), SessionState::Idle);
    assert_eq!(h.closes(), 1);
    assert_eq!(*h.notifier.successes.lock().unwrap(), vec!["x".to_string()]);
    assert!(h.notifier.failures.lock().unwrap().is_empty());
    assert!(!h.controller.is_busy());

    let jobs = h.api.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].total_frames, 180);
    assert_eq!(jobs[0].input_props.lyrics[1].start_frame, 60);
}

#[tokio::test]
async fn transport_error_mid_session_fails_once() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok(r#"{"type":"bundling"}"#.to_string())).unwrap();
    h.wait_for(|s| *s == SessionState::Bundling).await;

    feed.send(Err(ChannelError::Transport("connection reset".to_string())))
        .unwrap();
    // must never be observed
    let _ = feed.send(Ok(r#"{"type":"error","message":"late"}"#.to_string()));

    let result = task.await.unwrap();

    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(h.controller.state(), SessionState::Idle);
    assert_eq!(h.closes(), 1);
    assert_eq!(
        *h.notifier.failures.lock().unwrap(),
        vec![CONNECTION_LOST_MESSAGE.to_string()]
    );
    assert!(h.notifier.successes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn streamed_error_event_reports_server_message() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok(r#"{"type":"error","message":"Composition not found"}"#.to_string()))
        .unwrap();
    let result = task.await.unwrap();

    assert_eq!(
        result,
        Err(SessionError::Render("Composition not found".to_string()))
    );
    assert_eq!(h.closes(), 1);
    assert_eq!(
        *h.notifier.failures.lock().unwrap(),
        vec!["Composition not found".to_string()]
    );
}

#[tokio::test]
async fn submission_failure_closes_open_channel() {
    let h = Harness::new();
    *h.api.reject_with.lock().unwrap() = Some("renderer offline".to_string());
    let _feed = h.connector.prepare();

    let result = h
        .controller
        .render(&snapshot(), &RenderSettings::default())
        .await;

    assert_eq!(
        result,
        Err(SessionError::Submission("renderer offline".to_string()))
    );
    assert_eq!(h.connector.opens.load(Ordering::SeqCst), 1);
    assert_eq!(h.closes(), 1);
    assert_eq!(h.notifier.failures.lock().unwrap().len(), 1);
    assert_eq!(h.controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn stream_ending_without_terminal_event_is_a_transport_failure() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok(r#"{"type":"rendering","progress":0.9}"#.to_string()))
        .unwrap();
    drop(feed);

    let result = task.await.unwrap();
    assert!(matches!(result, Err(SessionError::Transport(_))));
    assert_eq!(h.closes(), 1);
    assert_eq!(h.notifier.failures.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn progress_may_complete_before_submission_resolves() {
    let h = Harness::new();
    let (release, gate) = oneshot::channel();
    *h.api.gate.lock().unwrap() = Some(gate);
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok(r#"{"type":"bundling"}"#.to_string())).unwrap();
    feed.send(Ok(r#"{"type":"complete","downloadUrl":"/out.mp4"}"#.to_string()))
        .unwrap();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome.download_url, "/out.mp4");
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.closes(), 1);
    drop(release);
}

#[tokio::test]
async fn second_trigger_while_active_is_rejected() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());
    h.wait_for(|s| *s == SessionState::Requested).await;

    let second = h
        .controller
        .render(&snapshot(), &RenderSettings::default())
        .await;
    assert_eq!(second, Err(SessionError::Busy));
    assert_eq!(h.api.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.connector.opens.load(Ordering::SeqCst), 1);

    feed.send(Ok(r#"{"type":"complete","downloadUrl":"x"}"#.to_string()))
        .unwrap();
    task.await.unwrap().unwrap();

    // slot is free again
    let feed = h.connector.prepare();
    feed.send(Ok(r#"{"type":"complete","downloadUrl":"y"}"#.to_string()))
        .unwrap();
    let again = h
        .controller
        .render(&snapshot(), &RenderSettings::default())
        .await
        .unwrap();
    assert_eq!(again.download_url, "y");
    assert_eq!(h.connector.opens.load(Ordering::SeqCst), 2);
    assert_eq!(h.closes(), 2);
}

#[tokio::test]
async fn cancelled_render_returns_to_idle() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok(r#"{"type":"rendering","progress":0.5}"#.to_string()))
        .unwrap();
    h.wait_for(|s| *s == SessionState::Rendering { progress: 0.5 })
        .await;

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    assert_eq!(h.controller.state(), SessionState::Idle);
    assert!(!h.controller.is_busy());
    assert_eq!(h.closes(), 1);
    assert!(h.notifier.successes.lock().unwrap().is_empty());
    assert!(h.notifier.failures.lock().unwrap().is_empty());

    // the slot can be taken again
    let feed = h.connector.prepare();
    feed.send(Ok(r#"{"type":"complete","downloadUrl":"z"}"#.to_string()))
        .unwrap();
    let outcome = h
        .controller
        .render(&snapshot(), &RenderSettings::default())
        .await
        .unwrap();
    assert_eq!(outcome.download_url, "z");
}

#[tokio::test]
async fn malformed_events_do_not_end_the_session() {
    let h = Harness::new();
    let feed = h.connector.prepare();
    let task = h.spawn_render(snapshot());

    feed.send(Ok("not json".to_string())).unwrap();
    feed.send(Ok(r#"{"type":"queued"}"#.to_string())).unwrap();
    feed.send(Ok(r#"{"type":"complete","downloadUrl":"ok"}"#.to_string()))
        .unwrap();

    let outcome = task.await.unwrap().unwrap();
    assert_eq!(outcome.download_url, "ok");
    assert!(h.notifier.failures.lock().unwrap().is_empty());
}
