//! PDF OCR Server
//!
//! HTTP front end for selective OCR of PDFs stored in S3-compatible storage.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_ocr_server::config::Config;
use pdf_ocr_server::ocr::{OcrEngine, OcrMyPdf};
use pdf_ocr_server::pdf::MupdfEngine;
use pdf_ocr_server::pipeline::Reassembler;
use pdf_ocr_server::processor::Processor;
use pdf_ocr_server::routes;
use pdf_ocr_server::state::AppState;
use pdf_ocr_server::storage::S3Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the filter reads RUST_LOG
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_ocr_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting PDF OCR Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "S3 endpoint: {}",
        config.storage.endpoint.as_deref().unwrap_or("AWS default")
    );
    if let Some(bucket) = &config.storage.default_bucket {
        tracing::info!("Default bucket: {}", bucket);
    }

    let s3_client = S3Client::new(&config.storage).await;

    let ocr = OcrMyPdf::new(config.ocr.clone()).context("Invalid OCR configuration")?;
    if ocr.is_available().await {
        tracing::info!("OCR engine {} available (language: {})", ocr.name(), config.ocr.language);
    } else {
        tracing::warn!(
            "OCR engine {} not found at {}; scanned pages will fail",
            ocr.name(),
            config.ocr.ocrmypdf_path
        );
    }

    let pipeline = Reassembler::new(
        Arc::new(MupdfEngine::new()),
        Arc::new(ocr),
        config.pipeline.clone(),
    );
    let processor = Processor::new(
        Arc::new(s3_client),
        Arc::new(pipeline),
        config.storage.default_bucket.clone(),
        config.processing.clone(),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.server.host, config.server.port))?;

    let state = AppState::new(config, processor);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("PDF OCR Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
