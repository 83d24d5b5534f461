pub mod analysis;
pub mod config;
pub mod context;
pub mod entries;
pub mod error;
pub mod network;
pub mod search;
pub mod secrets;
pub mod session;

pub use analysis::{
    AnalysisError, AnalysisSettings, FoodItem, NutritionAnalysisClient, NutritionData,
    ResponseCache, TotalNutrition,
};
pub use config::Config;
pub use context::{AppContext, Collaborators};
pub use entries::{DailyTotal, FoodEntry, FoodEntryRepository, InMemoryFoodEntryRepository};
pub use error::{RepositoryError, VoiceInputError};
pub use network::{
    ConnectivityMonitor, HttpRequest, HttpResponse, HttpTransport, NetworkError, ReqwestTransport,
    ResilientHttpClient,
};
pub use search::{
    levenshtein, InMemoryIngredientRepository, Ingredient, IngredientRepository,
    IngredientSearchIndex, SearchSettings,
};
pub use secrets::{InMemorySecretStore, SecretStore};
pub use session::{
    CapabilityCheck, PermissionGate, PermissionStatus, RecordingFailure, RecordingSession,
    RecordingState, SessionConfig, SessionSignal, StaticCapability, TranscriptEvent,
    TranscriptionProvider,
};
