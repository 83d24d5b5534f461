use std::sync::Arc;

use crate::analysis::NutritionAnalysisClient;
use crate::config::Config;
use crate::entries::FoodEntryRepository;
use crate::network::{ConnectivityMonitor, HttpTransport, ResilientHttpClient};
use crate::search::{IngredientRepository, IngredientSearchIndex};
use crate::secrets::SecretStore;
use crate::session::{
    CapabilityCheck, PermissionGate, RecordingSession, SessionConfig, TranscriptionProvider,
};

/// External collaborators the core orchestrates but does not implement
pub struct Collaborators {
    pub transport: Arc<dyn HttpTransport>,
    pub secrets: Arc<dyn SecretStore>,
    pub ingredients: Arc<dyn IngredientRepository>,
    pub entries: Arc<dyn FoodEntryRepository>,
    pub microphone: Arc<dyn CapabilityCheck>,
    pub transcription_permission: Arc<dyn CapabilityCheck>,
}

/// Explicit application wiring, constructed once and handed to whatever
/// needs it. No component reaches for process-wide singletons.
pub struct AppContext {
    pub connectivity: ConnectivityMonitor,
    pub http: Arc<ResilientHttpClient>,
    pub analyzer: Arc<NutritionAnalysisClient>,
    pub ingredients: Arc<IngredientSearchIndex>,
    pub entries: Arc<dyn FoodEntryRepository>,
    pub permissions: Arc<PermissionGate>,
    session_config: SessionConfig,
}

impl AppContext {
    pub fn new(config: &Config, collaborators: Collaborators) -> Self {
        let connectivity = ConnectivityMonitor::new(config.network.assume_connected);

        let http = Arc::new(ResilientHttpClient::new(
            collaborators.transport,
            connectivity.clone(),
        ));

        let analyzer = Arc::new(NutritionAnalysisClient::new(
            Arc::clone(&http),
            collaborators.secrets,
            config.analysis_settings(),
        ));

        let ingredients = Arc::new(IngredientSearchIndex::new(
            collaborators.ingredients,
            config.search_settings(),
        ));

        let permissions = Arc::new(PermissionGate::new(
            collaborators.microphone,
            collaborators.transcription_permission,
        ));

        Self {
            connectivity,
            http,
            analyzer,
            ingredients,
            entries: collaborators.entries,
            permissions,
            session_config: config.session_config(),
        }
    }

    /// Build a recording session on top of this context and the given
    /// transcription provider
    pub fn session(&self, provider: Arc<dyn TranscriptionProvider>) -> RecordingSession {
        RecordingSession::new(
            Arc::clone(&self.permissions),
            provider,
            Arc::clone(&self.analyzer),
            Arc::clone(&self.ingredients),
            self.session_config.clone(),
        )
    }
}
