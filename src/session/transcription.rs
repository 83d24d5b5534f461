use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Setup failure reported by a transcription provider's `start`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingFailure {
    #[error("input device unavailable")]
    DeviceUnavailable,

    #[error("transcription service not available")]
    NotAvailable,

    #[error("capture permission denied")]
    PermissionDenied,

    #[error("capture engine error: {0}")]
    EngineError(String),

    #[error("recording failed: {0}")]
    Failed(String),
}

/// One update pushed by the transcription stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Interim hypothesis; replaces the previous transcript value
    Partial(String),
    /// Final hypothesis; replaces the previous transcript value
    Final(String),
    /// Terminal stream error
    Error(String),
    /// The provider ended the stream on its own (e.g. endpoint detection)
    Ended,
}

/// Streaming transcription collaborator.
///
/// `start` returns a channel of transcript updates; events arrive in the
/// order the provider produced them. `stop` cancels the stream; the channel
/// closes afterwards.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Whether the provider can currently transcribe
    fn is_available(&self) -> bool;

    /// Begin capturing; fails with a [`RecordingFailure`] on setup error
    async fn start(&self) -> Result<mpsc::Receiver<TranscriptEvent>, RecordingFailure>;

    /// Cancel the stream
    async fn stop(&self);
}
