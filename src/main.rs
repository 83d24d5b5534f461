use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use nutrivoice::session::{PermissionStatus, StaticCapability};
use nutrivoice::{
    AppContext, Collaborators, Config, InMemoryFoodEntryRepository, InMemoryIngredientRepository,
    InMemorySecretStore, Ingredient, ReqwestTransport,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "nutrivoice", about = "Voice-driven nutrition logging backend")]
struct Args {
    /// Config file name (without extension), resolved by the config loader
    #[arg(long, default_value = "config/nutrivoice")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            info!("No config file loaded ({}), using defaults", e);
            Config::default()
        }
    };

    info!("{} starting", cfg.service.name);
    info!("Analysis endpoint: {}", cfg.analysis.endpoint);

    let ingredients = Arc::new(InMemoryIngredientRepository::new());
    ingredients
        .seed(vec![
            Ingredient::new("ing-001", "chicken breast")
                .with_macros(165.0, 31.0, 0.0, 3.6)
                .with_aliases(&["chicken fillet", "grilled chicken"])
                .with_category("protein")
                .with_usage_count(12),
            Ingredient::new("ing-002", "brown rice")
                .with_macros(111.0, 2.6, 23.0, 0.9)
                .with_aliases(&["rice"])
                .with_category("grain")
                .with_usage_count(8),
            Ingredient::new("ing-003", "broccoli")
                .with_macros(34.0, 2.8, 7.0, 0.4)
                .with_category("vegetable")
                .with_usage_count(5),
        ])
        .await;

    let context = AppContext::new(
        &cfg,
        Collaborators {
            transport: Arc::new(ReqwestTransport::new(cfg.network.request_timeout_secs)?),
            secrets: Arc::new(InMemorySecretStore::new()),
            ingredients,
            entries: Arc::new(InMemoryFoodEntryRepository::new()),
            microphone: Arc::new(StaticCapability(PermissionStatus::Authorized)),
            transcription_permission: Arc::new(StaticCapability(PermissionStatus::Authorized)),
        },
    );

    info!("Connected: {}", context.connectivity.is_connected());

    let matches = context.ingredients.search("chicken", None).await?;
    for ingredient in &matches {
        info!("Search hit: {}", ingredient.context_line());
    }

    info!("Ready: wire a transcription provider and call AppContext::session");

    Ok(())
}
