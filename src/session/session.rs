use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::analysis::{AnalysisError, NutritionAnalysisClient, NutritionData};
use crate::error::VoiceInputError;
use crate::search::IngredientSearchIndex;

use super::permissions::PermissionGate;
use super::state::{RecordingState, SessionSignal};
use super::transcription::{TranscriptEvent, TranscriptionProvider};

/// Session tuning knobs
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Auto-stop after this long without a transcript update
    pub silence_timeout: Duration,

    /// Ingredient context lines passed to analysis
    pub context_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            silence_timeout: Duration::from_secs(2),
            context_limit: 5,
        }
    }
}

/// A voice-capture session driving the idle → recording → processing →
/// success/error lifecycle.
///
/// All transitions run on one serialized event loop: commands, transcript
/// updates, silence timeouts, and analysis completions are applied strictly
/// in arrival order. `start`/`stop` resolve once their transition has
/// committed. Unknown (state, event) pairs are no-ops.
pub struct RecordingSession {
    events: mpsc::UnboundedSender<SessionEvent>,
    state_rx: watch::Receiver<RecordingState>,
    signal_tx: broadcast::Sender<SessionSignal>,
    shared: Arc<SessionShared>,
    driver: JoinHandle<()>,
}

impl RecordingSession {
    pub fn new(
        gate: Arc<PermissionGate>,
        provider: Arc<dyn TranscriptionProvider>,
        analyzer: Arc<NutritionAnalysisClient>,
        index: Arc<IngredientSearchIndex>,
        config: SessionConfig,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(RecordingState::Idle);
        let (signal_tx, _) = broadcast::channel(16);
        let shared = Arc::new(SessionShared::default());

        let driver = SessionDriver {
            state: RecordingState::Idle,
            transcript: String::new(),
            gate,
            provider,
            analyzer,
            index,
            config,
            events_tx: events_tx.clone(),
            state_tx,
            signal_tx: signal_tx.clone(),
            shared: Arc::clone(&shared),
            transcript_task: None,
            silence_timer: None,
            silence_epoch: 0,
        };

        let driver = tokio::spawn(driver.run(events_rx));

        Self {
            events: events_tx,
            state_rx,
            signal_tx,
            shared,
            driver,
        }
    }

    /// Request a transition into Recording.
    ///
    /// Resolves with the committed state: Recording on success, or
    /// Error(permission/availability kind) when a guard fails. A no-op when
    /// already recording or processing.
    pub async fn start(&self) -> Result<RecordingState> {
        self.command(SessionEvent::Start).await
    }

    /// Request a transition out of Recording.
    ///
    /// Resolves once Processing (or Error for an empty transcript) has
    /// committed; analysis continues in the background and lands in the
    /// observable state. A no-op outside Recording.
    pub async fn stop(&self) -> Result<RecordingState> {
        self.command(SessionEvent::Stop).await
    }

    /// Current state snapshot
    pub fn state(&self) -> RecordingState {
        self.state_rx.borrow().clone()
    }

    /// Observe every committed state transition
    pub fn subscribe_state(&self) -> watch::Receiver<RecordingState> {
        self.state_rx.clone()
    }

    /// Observe feedback signals (recording started/stopped, failure)
    pub fn subscribe_signals(&self) -> broadcast::Receiver<SessionSignal> {
        self.signal_tx.subscribe()
    }

    /// Last applied transcript value
    pub async fn transcript(&self) -> String {
        self.shared.transcript.read().await.clone()
    }

    /// Analysis result, present after a transition to Success
    pub async fn nutrition_data(&self) -> Option<NutritionData> {
        self.shared.nutrition.read().await.clone()
    }

    async fn command(
        &self,
        make: impl FnOnce(oneshot::Sender<RecordingState>) -> SessionEvent,
    ) -> Result<RecordingState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.events
            .send(make(reply_tx))
            .map_err(|_| anyhow!("session driver stopped"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("session driver stopped"))
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[derive(Default)]
struct SessionShared {
    transcript: RwLock<String>,
    nutrition: RwLock<Option<NutritionData>>,
}

enum SessionEvent {
    Start(oneshot::Sender<RecordingState>),
    Stop(oneshot::Sender<RecordingState>),
    Transcript(TranscriptEvent),
    SilenceTimeout(u64),
    AnalysisDone(Result<NutritionData, AnalysisError>),
}

struct SessionDriver {
    state: RecordingState,
    transcript: String,

    gate: Arc<PermissionGate>,
    provider: Arc<dyn TranscriptionProvider>,
    analyzer: Arc<NutritionAnalysisClient>,
    index: Arc<IngredientSearchIndex>,
    config: SessionConfig,

    events_tx: mpsc::UnboundedSender<SessionEvent>,
    state_tx: watch::Sender<RecordingState>,
    signal_tx: broadcast::Sender<SessionSignal>,
    shared: Arc<SessionShared>,

    transcript_task: Option<JoinHandle<()>>,
    silence_timer: Option<JoinHandle<()>>,
    silence_epoch: u64,
}

impl SessionDriver {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::Start(reply) => {
                    let state = self.handle_start().await;
                    let _ = reply.send(state);
                }
                SessionEvent::Stop(reply) => {
                    if self.state.is_recording() {
                        self.finish_recording().await;
                    }
                    let _ = reply.send(self.state.clone());
                }
                SessionEvent::Transcript(update) => {
                    self.handle_transcript(update).await;
                }
                SessionEvent::SilenceTimeout(epoch) => {
                    // Stale timers (re-armed after this one fired) are ignored
                    if self.state.is_recording() && epoch == self.silence_epoch {
                        info!("Silence timeout reached, stopping recording");
                        self.finish_recording().await;
                    }
                }
                SessionEvent::AnalysisDone(result) => {
                    self.handle_analysis(result).await;
                }
            }
        }
    }

    /// idle | success | error --start--> recording, guarded by permissions
    /// and provider availability
    async fn handle_start(&mut self) -> RecordingState {
        if !self.state.accepts_start() {
            return self.state.clone();
        }

        let combined = self.gate.combined_status().await;
        if !combined.is_authorized() {
            let error = if combined.is_restricted() {
                VoiceInputError::PermissionRestricted
            } else {
                VoiceInputError::PermissionDenied
            };
            self.transition(RecordingState::Error(error)).await;
            return self.state.clone();
        }

        if !self.provider.is_available() {
            self.transition(RecordingState::Error(VoiceInputError::ServiceUnavailable))
                .await;
            return self.state.clone();
        }

        match self.provider.start().await {
            Ok(mut stream) => {
                self.transcript.clear();
                *self.shared.transcript.write().await = String::new();
                *self.shared.nutrition.write().await = None;

                let events = self.events_tx.clone();
                self.transcript_task = Some(tokio::spawn(async move {
                    while let Some(update) = stream.recv().await {
                        if events.send(SessionEvent::Transcript(update)).is_err() {
                            break;
                        }
                    }
                }));

                self.transition(RecordingState::Recording).await;
                self.arm_silence_timer();
            }
            Err(failure) => {
                self.transition(RecordingState::Error(VoiceInputError::from_recording(
                    &failure,
                )))
                .await;
            }
        }

        self.state.clone()
    }

    async fn handle_transcript(&mut self, update: TranscriptEvent) {
        if !self.state.is_recording() {
            // Late updates after stop must not mutate the transcript
            return;
        }

        match update {
            TranscriptEvent::Partial(text) | TranscriptEvent::Final(text) => {
                self.transcript = text.clone();
                *self.shared.transcript.write().await = text;
                self.arm_silence_timer();
            }
            TranscriptEvent::Error(detail) => {
                self.teardown_capture().await;
                self.transition(RecordingState::Error(
                    VoiceInputError::TranscriptionFailed(detail),
                ))
                .await;
            }
            TranscriptEvent::Ended => {
                self.finish_recording().await;
            }
        }
    }

    /// recording --stop--> processing (or error on an empty transcript),
    /// then hand the transcript to analysis off the event loop
    async fn finish_recording(&mut self) {
        self.teardown_capture().await;

        let transcript = self.transcript.trim().to_string();
        if transcript.is_empty() {
            self.transition(RecordingState::Error(
                VoiceInputError::TranscriptionFailed("No speech detected".to_string()),
            ))
            .await;
            return;
        }

        self.transition(RecordingState::Processing).await;

        // Only one analysis can be in flight: stop is only valid from
        // Recording, and analysis only ever starts here.
        let analyzer = Arc::clone(&self.analyzer);
        let index = Arc::clone(&self.index);
        let events = self.events_tx.clone();
        let context_limit = self.config.context_limit;

        tokio::spawn(async move {
            let context = match index.context_for(&transcript, context_limit).await {
                Ok(lines) => lines,
                Err(error) => {
                    warn!("Ingredient context lookup failed: {}", error);
                    Vec::new()
                }
            };

            let result = analyzer.analyze(&transcript, &context).await;
            let _ = events.send(SessionEvent::AnalysisDone(result));
        });
    }

    async fn handle_analysis(&mut self, result: Result<NutritionData, AnalysisError>) {
        if !self.state.is_processing() {
            return;
        }

        match result {
            Ok(data) => {
                *self.shared.nutrition.write().await = Some(data);
                self.transition(RecordingState::Success).await;
            }
            Err(error) => {
                self.transition(RecordingState::Error(VoiceInputError::from_analysis(
                    &error,
                )))
                .await;
            }
        }
    }

    /// Cancel the transcript stream and the silence timer
    async fn teardown_capture(&mut self) {
        self.disarm_silence_timer();
        if let Some(task) = self.transcript_task.take() {
            task.abort();
        }
        self.provider.stop().await;
    }

    /// Commit a transition: publish the new state and emit its feedback
    /// signal
    async fn transition(&mut self, next: RecordingState) {
        let signal = match &next {
            RecordingState::Recording => Some(SessionSignal::RecordingStarted),
            RecordingState::Processing => Some(SessionSignal::RecordingStopped),
            RecordingState::Error(_) => Some(SessionSignal::Failed),
            _ => None,
        };

        info!("Session transition: {:?} -> {:?}", self.state, next);

        self.state = next.clone();
        let _ = self.state_tx.send(next);

        if let Some(signal) = signal {
            let _ = self.signal_tx.send(signal);
        }
    }

    /// (Re)arm the silence auto-stop; called on entering Recording and on
    /// every transcript update
    fn arm_silence_timer(&mut self) {
        self.disarm_silence_timer();
        self.silence_epoch += 1;

        let epoch = self.silence_epoch;
        let timeout = self.config.silence_timeout;
        let events = self.events_tx.clone();

        self.silence_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = events.send(SessionEvent::SilenceTimeout(epoch));
        }));
    }

    fn disarm_silence_timer(&mut self) {
        if let Some(timer) = self.silence_timer.take() {
            timer.abort();
        }
    }
}
