// This is the entry point of the plandoc service.
//
// **Architecture Overview:**
// - `core/` = Business logic (plan formatting, provisioning pipeline)
// - `infra/` = Implementations of core traits (Google Docs/Drive client)
// - `http/` = HTTP-specific adapters (routes, API-key check, wire shapes)
//
// This file's job is to:
// 1. Load configuration
// 2. Resolve Google credentials (once, before serving)
// 3. Wire services together (dependency injection)
// 4. Start the HTTP server

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a pile of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "http/http_layer.rs"]
mod http;
#[path = "infra/infra_layer.rs"]
mod infra;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::core::credentials::{resolve, Resolution, ResolverConfig};
use crate::core::health::HealthReporter;
use crate::core::provisioning::ProvisioningService;
use crate::http::AppState;
use crate::infra::google::GoogleDocsApiClient;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Shared secret the frontend must present in the X-API-Key header.
    // BUBBLE_API_KEY is the name the original deployment used.
    let api_key = std::env::var("SERVICE_API_KEY")
        .or_else(|_| std::env::var("BUBBLE_API_KEY"))
        .expect("Missing SERVICE_API_KEY environment variable!");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Resolve credentials once; the outcome is immutable for the process
    // lifetime and shared read-only across all requests.

    let resolution = resolve(&ResolverConfig::from_env());
    let (pipeline, initialized) = match resolution {
        Resolution::Configured(credential) => {
            let client = GoogleDocsApiClient::new(credential);
            (Some(Arc::new(ProvisioningService::new(client))), true)
        }
        Resolution::Unconfigured => (None, false),
    };

    let state = AppState {
        pipeline,
        health: HealthReporter::new(initialized),
        api_key,
    };

    // ========================================================================
    // HTTP SERVER SETUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind HTTP listener");
    tracing::info!(%addr, "plandoc is listening");

    axum::serve(listener, http::router(state))
        .await
        .expect("Server error");
}
