pub mod cache;
pub mod client;
pub mod types;

pub use cache::ResponseCache;
pub use client::{AnalysisError, AnalysisSettings, NutritionAnalysisClient};
pub use types::{
    ChatChoice, ChatMessage, ChatRequest, ChatResponse, ChatUsage, FoodItem, NutritionData,
    ResponseFormat, TotalNutrition,
};
