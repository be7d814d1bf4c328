//! Hoard - data-driven items, stats and inventories
//!
//! Loads settings and an item catalog, then runs a scripted session against
//! the item engine and logs what happened.

mod demo;
mod settings;

use std::fs;

use anyhow::{Context, Result};
use hoard_items::{ItemWorld, StaticCatalog};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::{Settings, SettingsSource};

fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .context("Invalid log level in settings")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(settings.logging.show_target)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn load_catalog(settings: &Settings) -> Result<StaticCatalog> {
    let Some(path) = &settings.catalog.path else {
        info!("No catalog file configured, using the built-in demo catalog");
        return StaticCatalog::from_json(demo::CATALOG).context("Built-in catalog is invalid");
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let catalog =
        StaticCatalog::from_json(&json).with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    info!("Loaded {} item templates from {:?}", catalog.len(), path);
    Ok(catalog)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (settings, source) = Settings::load();
    init_logging(&settings)?;

    match source {
        SettingsSource::File(path) => info!("Loaded settings from {:?}", path),
        SettingsSource::Missing => info!("No settings file found, using defaults"),
        SettingsSource::NoConfigDir => warn!("Could not determine config directory"),
        SettingsSource::Invalid(path, e) => warn!("Failed to load {:?}: {:#}, using defaults", path, e),
    }

    if std::env::args().any(|arg| arg == "--write-settings") {
        let path = settings.save()?;
        info!("Wrote settings to {:?}", path);
        return Ok(());
    }

    info!("Starting Hoard...");
    let catalog = load_catalog(&settings)?;
    let mut world = ItemWorld::with_tags(settings.items.clone(), demo::tags());

    let summary = demo::run(&mut world, &catalog).await.context("Demo session failed")?;
    info!(
        items = summary.items,
        events = summary.events,
        strength = summary.strength_equipped,
        dexterity = summary.dexterity,
        armor = summary.armor,
        weight = summary.carried_weight,
        "Session complete"
    );

    let diagnostics = world.take_diagnostics();
    if !diagnostics.is_empty() {
        warn!("{} diagnostics reported during the session", diagnostics.len());
    }

    Ok(())
}
