// Tests for permission combination, the request flow, and the unified
// error taxonomy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use nutrivoice::analysis::AnalysisError;
use nutrivoice::error::VoiceInputError;
use nutrivoice::network::NetworkError;
use nutrivoice::session::{
    CapabilityCheck, PermissionGate, PermissionStatus, RecordingFailure, StaticCapability,
};

use PermissionStatus::{Authorized, Denied, NotDetermined, Restricted};

#[test]
fn test_combine_authorized_only_when_both_are() {
    assert_eq!(PermissionStatus::combine(Authorized, Authorized), Authorized);

    for other in [NotDetermined, Denied, Restricted] {
        assert_ne!(PermissionStatus::combine(Authorized, other), Authorized);
        assert_ne!(PermissionStatus::combine(other, Authorized), Authorized);
    }
}

#[test]
fn test_combine_denied_wins_over_restricted() {
    assert_eq!(PermissionStatus::combine(Denied, Restricted), Denied);
    assert_eq!(PermissionStatus::combine(Restricted, Denied), Denied);
    assert_eq!(PermissionStatus::combine(Denied, Authorized), Denied);
    assert_eq!(PermissionStatus::combine(Denied, NotDetermined), Denied);
}

#[test]
fn test_combine_restricted_before_not_determined() {
    assert_eq!(PermissionStatus::combine(Restricted, Authorized), Restricted);
    assert_eq!(
        PermissionStatus::combine(Restricted, NotDetermined),
        Restricted
    );
    assert_eq!(
        PermissionStatus::combine(NotDetermined, NotDetermined),
        NotDetermined
    );
    assert_eq!(
        PermissionStatus::combine(NotDetermined, Authorized),
        NotDetermined
    );
}

#[test]
fn test_requires_action() {
    assert!(Denied.requires_action());
    assert!(Restricted.requires_action());
    assert!(!Authorized.requires_action());
    assert!(!NotDetermined.requires_action());
}

/// Capability that counts prompts and resolves them to a fixed status
struct CountingCapability {
    resolves_to: PermissionStatus,
    requests: AtomicUsize,
}

impl CountingCapability {
    fn new(resolves_to: PermissionStatus) -> Arc<Self> {
        Arc::new(Self {
            resolves_to,
            requests: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CapabilityCheck for CountingCapability {
    async fn status(&self) -> PermissionStatus {
        NotDetermined
    }

    async fn request(&self) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.resolves_to
    }
}

#[tokio::test]
async fn test_request_all_prompts_both_when_microphone_granted() {
    let microphone = CountingCapability::new(Authorized);
    let transcription = CountingCapability::new(Authorized);
    let gate = PermissionGate::new(microphone.clone(), transcription.clone());

    let combined = gate.request_all().await;

    assert_eq!(combined, Authorized);
    assert_eq!(microphone.requests.load(Ordering::SeqCst), 1);
    assert_eq!(transcription.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_request_all_skips_transcription_prompt_on_microphone_refusal() {
    let microphone = CountingCapability::new(Denied);
    let transcription = CountingCapability::new(Authorized);
    let gate = PermissionGate::new(microphone.clone(), transcription.clone());

    let combined = gate.request_all().await;

    assert_eq!(combined, Denied);
    assert_eq!(microphone.requests.load(Ordering::SeqCst), 1);
    assert_eq!(transcription.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_combined_status_reads_without_prompting() {
    let gate = PermissionGate::new(
        Arc::new(StaticCapability(Authorized)),
        Arc::new(StaticCapability(Restricted)),
    );

    assert_eq!(gate.combined_status().await, Restricted);
    assert_eq!(gate.microphone_status().await, Authorized);
    assert_eq!(gate.transcription_status().await, Restricted);
}

#[test]
fn test_manual_entry_offered_for_everything_but_missing_device() {
    let offered = [
        VoiceInputError::PermissionDenied,
        VoiceInputError::PermissionRestricted,
        VoiceInputError::ServiceUnavailable,
        VoiceInputError::RecordingFailed("x".to_string()),
        VoiceInputError::TranscriptionFailed("x".to_string()),
        VoiceInputError::NetworkError("x".to_string()),
        VoiceInputError::Unknown("x".to_string()),
    ];
    for error in offered {
        assert!(error.offers_manual_entry(), "{error} should offer manual entry");
    }

    assert!(!VoiceInputError::DeviceUnavailable.offers_manual_entry());
}

#[test]
fn test_error_messages_are_user_facing() {
    assert_eq!(
        VoiceInputError::PermissionDenied.to_string(),
        "Microphone access denied. Please enable in Settings."
    );
    assert_eq!(
        VoiceInputError::TranscriptionFailed("No speech detected".to_string()).to_string(),
        "Transcription failed: No speech detected"
    );
    assert_eq!(
        VoiceInputError::NetworkError("timeout".to_string()).to_string(),
        "Network error: timeout"
    );
}

#[test]
fn test_recovery_suggestions_exist_for_actionable_errors() {
    assert!(VoiceInputError::PermissionDenied
        .recovery_suggestion()
        .contains("Settings"));
    assert!(VoiceInputError::PermissionRestricted
        .recovery_suggestion()
        .contains("parental"));
    assert!(!VoiceInputError::Unknown("x".to_string())
        .recovery_suggestion()
        .is_empty());
}

#[test]
fn test_analysis_errors_all_map_to_network_error() {
    let cases = [
        (AnalysisError::NoApiKey, "API key not configured"),
        (
            AnalysisError::InvalidResponse,
            "Invalid response from nutrition service",
        ),
        (
            AnalysisError::ParsingError,
            "Failed to parse nutritional data",
        ),
        (
            AnalysisError::ApiError("HTTP error 500: Server error".to_string()),
            "Nutrition service error: HTTP error 500: Server error",
        ),
    ];

    for (input, expected_detail) in cases {
        match VoiceInputError::from_analysis(&input) {
            VoiceInputError::NetworkError(detail) => assert_eq!(detail, expected_detail),
            other => panic!("expected NetworkError, got {other:?}"),
        }
    }
}

#[test]
fn test_network_errors_carry_their_description() {
    let mapped = VoiceInputError::from_network(&NetworkError::Offline);
    assert_eq!(
        mapped,
        VoiceInputError::NetworkError("network is unavailable".to_string())
    );
}

#[test]
fn test_recording_failures_map_onto_the_taxonomy() {
    assert_eq!(
        VoiceInputError::from_recording(&RecordingFailure::DeviceUnavailable),
        VoiceInputError::DeviceUnavailable
    );
    assert_eq!(
        VoiceInputError::from_recording(&RecordingFailure::NotAvailable),
        VoiceInputError::ServiceUnavailable
    );
    assert_eq!(
        VoiceInputError::from_recording(&RecordingFailure::PermissionDenied),
        VoiceInputError::PermissionDenied
    );
    assert_eq!(
        VoiceInputError::from_recording(&RecordingFailure::EngineError("hw".to_string())),
        VoiceInputError::RecordingFailed("hw".to_string())
    );
}
