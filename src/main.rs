// main.rs
use anyhow::Context;
use powerd::{
    actions::{ActionDispatcher, ActionRegistry},
    build_router,
    config::{Catalog, Settings},
    devices::DeviceRegistry,
    events::EventBus,
    models::AppState,
    serial::SerialTransport,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Settings::new().context("Failed to load config")?;
    let catalog = Catalog::load(&settings.catalog.path).context("Cannot read config json")?;
    tracing::info!(
        path = %settings.catalog.path.display(),
        devices = catalog.devices.len(),
        actions = catalog.actions.len(),
        "Successfully read catalog"
    );

    let serial = if settings.serial.enabled {
        SerialTransport::open(&settings.serial)
            .with_context(|| format!("Failed to open serial port {}", settings.serial.path))?
    } else {
        tracing::warn!("Serial link disabled, device commands will be dropped");
        SerialTransport::disabled()
    };

    let events = Arc::new(EventBus::new());
    if settings.metrics.enabled {
        powerd::metrics::setup_metrics(settings.metrics.port)
            .context("Failed to setup metrics")?;
        powerd::metrics::count_events(&events);
        tracing::info!(port = settings.metrics.port, "Metrics exporter listening");
    }

    let state = Arc::new(AppState::new(
        DeviceRegistry::from_records(&catalog.devices),
        ActionRegistry::from_records(&catalog.actions),
        serial,
        ActionDispatcher::new(&settings.catalog.scripts_dir, events),
    ));

    if settings.catalog.reset_on_start {
        state
            .devices
            .reset_all(&state.serial, Duration::from_millis(settings.catalog.reset_delay_ms))
            .await;
    }

    let app = build_router(state.clone(), &settings.server);

    let listener = tokio::net::TcpListener::bind(&settings.server.address)
        .await
        .with_context(|| format!("Failed to bind address {}", settings.server.address))?;

    tracing::info!("Server started on {}", settings.server.address);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
