use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Authorization state of one device capability, and the combined status
/// across both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    NotDetermined,
    Authorized,
    Denied,
    Restricted,
}

impl PermissionStatus {
    pub fn is_authorized(&self) -> bool {
        *self == Self::Authorized
    }

    pub fn is_denied(&self) -> bool {
        *self == Self::Denied
    }

    pub fn is_restricted(&self) -> bool {
        *self == Self::Restricted
    }

    pub fn requires_action(&self) -> bool {
        matches!(self, Self::Denied | Self::Restricted)
    }

    /// Combine two independent capability statuses.
    ///
    /// Authorized only when both are; denied wins over restricted.
    pub fn combine(a: PermissionStatus, b: PermissionStatus) -> PermissionStatus {
        if a.is_authorized() && b.is_authorized() {
            Self::Authorized
        } else if a.is_denied() || b.is_denied() {
            Self::Denied
        } else if a.is_restricted() || b.is_restricted() {
            Self::Restricted
        } else {
            Self::NotDetermined
        }
    }
}

/// One independently-checkable device capability (microphone, transcription
/// service)
#[async_trait]
pub trait CapabilityCheck: Send + Sync {
    /// Current status without prompting the user
    async fn status(&self) -> PermissionStatus;

    /// Prompt the user if the status is not yet determined
    async fn request(&self) -> PermissionStatus;
}

/// Capability with a fixed status, for wiring demos and tests
pub struct StaticCapability(pub PermissionStatus);

#[async_trait]
impl CapabilityCheck for StaticCapability {
    async fn status(&self) -> PermissionStatus {
        self.0
    }

    async fn request(&self) -> PermissionStatus {
        self.0
    }
}

/// Unifies the microphone and transcription-service capability checks into
/// one combined status
pub struct PermissionGate {
    microphone: Arc<dyn CapabilityCheck>,
    transcription: Arc<dyn CapabilityCheck>,
}

impl PermissionGate {
    pub fn new(
        microphone: Arc<dyn CapabilityCheck>,
        transcription: Arc<dyn CapabilityCheck>,
    ) -> Self {
        Self {
            microphone,
            transcription,
        }
    }

    pub async fn microphone_status(&self) -> PermissionStatus {
        self.microphone.status().await
    }

    pub async fn transcription_status(&self) -> PermissionStatus {
        self.transcription.status().await
    }

    /// Combined status across both capabilities
    pub async fn combined_status(&self) -> PermissionStatus {
        let microphone = self.microphone.status().await;
        let transcription = self.transcription.status().await;
        PermissionStatus::combine(microphone, transcription)
    }

    /// Request both capabilities, microphone first.
    ///
    /// The transcription prompt is skipped when the microphone request does
    /// not end up authorized.
    pub async fn request_all(&self) -> PermissionStatus {
        let microphone = self.microphone.request().await;

        let transcription = if microphone.is_authorized() {
            self.transcription.request().await
        } else {
            self.transcription.status().await
        };

        PermissionStatus::combine(microphone, transcription)
    }
}
