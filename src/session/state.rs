use serde::{Deserialize, Serialize};

use crate::error::VoiceInputError;

/// Lifecycle state of a single voice-capture attempt.
///
/// Owned exclusively by the session event loop; every mutation goes through
/// the transition table. Success and Error both accept a new start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordingState {
    Idle,
    Recording,
    Processing,
    Success,
    Error(VoiceInputError),
}

impl RecordingState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    pub fn has_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn error(&self) -> Option<&VoiceInputError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Whether a start command is accepted in this state
    pub fn accepts_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Success | Self::Error(_))
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Externally observable feedback signal, emitted as a pure function of the
/// transition that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// Entered Recording
    RecordingStarted,
    /// Left Recording for Processing
    RecordingStopped,
    /// Entered Error
    Failed,
}
