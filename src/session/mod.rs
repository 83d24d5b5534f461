pub mod permissions;
pub mod session;
pub mod state;
pub mod transcription;

pub use permissions::{CapabilityCheck, PermissionGate, PermissionStatus, StaticCapability};
pub use session::{RecordingSession, SessionConfig};
pub use state::{RecordingState, SessionSignal};
pub use transcription::{RecordingFailure, TranscriptEvent, TranscriptionProvider};
