use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::network::NetworkError;
use crate::session::RecordingFailure;

/// Unified error surfaced to callers of the voice input pipeline.
///
/// Every failure from the permission, transcription, network, and analysis
/// layers maps into exactly one of these variants. Each variant carries a
/// display message and a manual-entry fallback flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum VoiceInputError {
    #[error("Microphone is not available on this device")]
    DeviceUnavailable,

    #[error("Microphone access denied. Please enable in Settings.")]
    PermissionDenied,

    #[error("Microphone access is restricted. Please check parental controls.")]
    PermissionRestricted,

    #[error("Speech recognition is not available. Please try again later.")]
    ServiceUnavailable,

    #[error("Recording failed: {0}")]
    RecordingFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("An unknown error occurred: {0}")]
    Unknown(String),
}

impl VoiceInputError {
    /// Whether the UI should offer manual entry as a fallback.
    ///
    /// False only for a missing input device, where manual entry of a spoken
    /// description would not help either.
    pub fn offers_manual_entry(&self) -> bool {
        !matches!(self, Self::DeviceUnavailable)
    }

    /// A short actionable hint for the user, where one exists.
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Go to Settings > Privacy & Security > Microphone and enable access for this app."
            }
            Self::PermissionRestricted => "Check your device's parental controls or restrictions.",
            Self::ServiceUnavailable => "Ensure you have an internet connection and try again.",
            Self::NetworkError(_) => "Check your internet connection and try again.",
            Self::DeviceUnavailable => "Ensure your microphone is not blocked and try again.",
            _ => "Try again or use manual entry instead.",
        }
    }

    /// Map a transport-layer failure into the unified taxonomy.
    pub fn from_network(error: &NetworkError) -> Self {
        Self::NetworkError(error.to_string())
    }

    /// Map a nutrition-analysis failure into the unified taxonomy.
    pub fn from_analysis(error: &AnalysisError) -> Self {
        match error {
            AnalysisError::NoApiKey => Self::NetworkError("API key not configured".to_string()),
            AnalysisError::InvalidResponse => {
                Self::NetworkError("Invalid response from nutrition service".to_string())
            }
            AnalysisError::ParsingError => {
                Self::NetworkError("Failed to parse nutritional data".to_string())
            }
            AnalysisError::ApiError(message) => {
                Self::NetworkError(format!("Nutrition service error: {message}"))
            }
        }
    }

    /// Map a transcription-provider setup failure into the unified taxonomy.
    pub fn from_recording(failure: &RecordingFailure) -> Self {
        match failure {
            RecordingFailure::DeviceUnavailable => Self::DeviceUnavailable,
            RecordingFailure::NotAvailable => Self::ServiceUnavailable,
            RecordingFailure::PermissionDenied => Self::PermissionDenied,
            RecordingFailure::EngineError(detail) => Self::RecordingFailed(detail.clone()),
            RecordingFailure::Failed(detail) => Self::RecordingFailed(detail.clone()),
        }
    }
}

/// Errors from the external repository collaborators (ingredients, entries).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("repository is unavailable")]
    Unavailable,

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("validation failed: {0}")]
    Validation(String),
}
