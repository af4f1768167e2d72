//! multiframe-loader binary.
//!
//! Ingests dataset manifests and either serves frames over HTTP or prints one
//! decoded frame for inspection.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde_json::{json, Map, Value};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multiframe_loader::{
    cleanup_multiframe_loader, create_router, format::frame_image_ids, ingest_manifest,
    load_manifest, AppState, Cli, Command, DatasetStore, FrameImageId, InspectConfig,
    LoaderFacade, MetadataResolver, RouterConfig, ServeConfig,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Serve(config) => run_serve(config).await,
        Command::Inspect(config) => run_inspect(config).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "multiframe_loader=debug,tower_http=debug"
    } else {
        "multiframe_loader=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("multiframe-loader v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  Truncated frames: {:?}", config.truncation_policy());
    info!("  Cache max-age: {}s", config.cache_max_age);

    let store = Arc::new(DatasetStore::new());
    if config.datasets.is_empty() {
        warn!("  No datasets given; use --dataset <manifest.json> or MFL_DATASETS");
    }
    for path in &config.datasets {
        match ingest_manifest(&store, path).await {
            Ok(source_id) => info!("  Dataset: {} ({})", source_id, path.display()),
            Err(e) => {
                error!("Failed to ingest {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    let state = AppState::new(Arc::clone(&store), config.truncation_policy());
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    info!("");
    info!("  Server listening on: http://{}", addr);
    info!("    curl http://{}/sources", addr);
    if let Some(source_id) = store.source_ids().first() {
        if let Some(first) = frame_image_ids(source_id, 1).first() {
            info!("    curl http://{}/frames/{}/info", addr, first);
            info!("    curl http://{}/metadata/imagePlaneModule/{}", addr, first);
        }
    }
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cleanup_multiframe_loader(&store);

    if let Err(e) = served {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn build_router_config(config: &ServeConfig) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_cache_max_age(config.cache_max_age);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!config.no_tracing)
}

// =============================================================================
// Inspect Command
// =============================================================================

async fn run_inspect(config: InspectConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let record = match load_manifest(&config.dataset).await {
        Ok(record) => record,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let id = FrameImageId::new(record.source_id.clone(), config.frame);
    let image_id = id.to_string();

    let store = Arc::new(DatasetStore::new());
    store.put(record.source_id.clone(), record);

    let loader = LoaderFacade::with_policy(Arc::clone(&store), config.truncation_policy());
    let frame = match loader.load_frame(&image_id).await {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Error decoding {}: {}", image_id, e);
            return ExitCode::FAILURE;
        }
    };

    let resolver = MetadataResolver::new(store);
    let mut metadata = Map::new();
    for module in config.module_types() {
        let value = match serde_json::to_value(resolver.resolve_module(module, &id)) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Error serializing {}: {}", module, e);
                return ExitCode::FAILURE;
            }
        };
        metadata.insert(module.as_str().to_string(), value);
    }

    let frame = match serde_json::to_value(&frame) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Error serializing frame: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let output = json!({
        "frame": frame,
        "metadata": Value::Object(metadata),
    });

    match serde_json::to_string_pretty(&output) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
