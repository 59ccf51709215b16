//! # formwork guide
//!
//! A tutorial application for the formwork toolkit. Each route shows one
//! form pattern end to end — schema, constraint hints in the markup,
//! server-side validation, and reconciliation with an in-memory store:
//!
//! - `/regular-form` — flat fields
//! - `/nested-form` — a nested address object
//! - `/array-form` — a repeating email list
//! - `/nested-array-form` — repeating contact fieldsets
//! - `/todos` — tasks with checkboxes
//! - `/async-valid`, `/send-message`, `/form-fetcher` — async validation
//!   and a JSON action endpoint
//!
//! ## Running
//!
//! ```bash
//! cargo run --package guide-example -- --port 3000 --fail-rate 0.5
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use guide_example::handlers::AppState;
use guide_example::routes;
use guide_example::settings::load_settings;
use guide_example::store::{FailurePolicy, MemoryStore};

#[derive(Parser, Debug)]
#[command(name = "guide", about = "formwork guide application")]
struct Args {
    /// Path to a TOML settings file.
    #[arg(long, default_value = "guide.toml")]
    config: String,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured store failure rate (0.0 to 1.0).
    #[arg(long)]
    fail_rate: Option<f64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(rate) = args.fail_rate {
        settings.fail_rate = rate.clamp(0.0, 1.0);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&settings.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        port = settings.port,
        fail_rate = settings.fail_rate,
        "guide configured"
    );

    // The store handle is owned here and injected into every handler.
    let store = Arc::new(
        MemoryStore::new(FailurePolicy::Random(settings.fail_rate))
            .with_check_delay(Duration::from_millis(settings.check_delay_ms)),
    );
    let state = AppState {
        store,
        refine_timeout: settings.refine_timeout(),
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], settings.port));
    tracing::info!("guide listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, routes::router(state))
        .await
        .expect("server error");
}
