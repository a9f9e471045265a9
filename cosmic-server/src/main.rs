//! Cosmic Astrology backend (cosmic-server) - Main entry point
//!
//! Serves the content API, lead capture, image uploads and the chatbot.
//! Without hosted backend credentials, content lives in memory and uploads
//! are kept on local disk only.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cosmic_common::config::{default_config_path, Settings};
use cosmic_common::store::memory::MemoryStore;
use cosmic_common::supabase::{SupabaseRest, SupabaseStorage};
use cosmic_common::{ContentStore, ObjectStore};
use cosmic_server::chatbot::{ChatCompleter, OpenAiClient};
use cosmic_server::notify::{DisabledMailer, Mailer, SmtpMailer};
use cosmic_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for cosmic-server
#[derive(Parser, Debug)]
#[command(name = "cosmic-server")]
#[command(about = "Backend for the Cosmic Astrology website")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "COSMIC_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides config and HOST)
    #[arg(long)]
    host: Option<String>,

    /// Directory served under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded before the subscriber exists so the configured level can seed the filter
    let mut settings = Settings::load(args.config.as_deref()).context("Failed to load configuration")?;

    let default_filter = format!(
        "cosmic_server={level},cosmic_media={level},cosmic_common={level},tower_http={level}",
        level = settings.logging.level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Cosmic Astrology server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match args.config.clone().or_else(default_config_path) {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => info!("Config file {} not found, using defaults and environment", path.display()),
        None => info!("No config directory, using defaults and environment"),
    }

    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(dir) = args.static_dir {
        settings.static_dir = dir;
    }

    let (content, mirror) = backend(&settings)?;
    let mailer = mailer(&settings);
    let completer = completer(&settings);

    info!("Upload directory: {}", settings.upload_dir().display());
    info!("Static directory: {}", settings.static_dir.display());

    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(settings, content, mirror, mailer, completer)
        .context("Failed to initialize upload pipeline")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("cosmic-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Hosted content store and storage mirror, or in-memory content and no mirror
fn backend(settings: &Settings) -> Result<(Arc<dyn ContentStore>, Option<Arc<dyn ObjectStore>>)> {
    let supabase = &settings.supabase;
    match (&supabase.url, &supabase.key) {
        (Some(url), Some(key)) => {
            let rest: Arc<dyn ContentStore> = Arc::new(SupabaseRest::new(url, key, supabase.timeout())
                .context("Failed to create Supabase REST client")?);
            let storage = SupabaseStorage::new(url, key, &supabase.storage_bucket, supabase.timeout())
                .context("Failed to create Supabase storage client")?;
            info!("✓ Supabase configured (bucket '{}')", supabase.storage_bucket);
            let mirror: Arc<dyn ObjectStore> = Arc::new(storage);
            Ok((rest, Some(mirror)))
        }
        _ => {
            warn!("Supabase not configured: content is kept in memory and uploads stay local");
            let content: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
            Ok((content, None))
        }
    }
}

fn mailer(settings: &Settings) -> Arc<dyn Mailer> {
    if !settings.email.is_configured() {
        info!("Email not configured, notifications disabled");
        return Arc::new(DisabledMailer);
    }

    match SmtpMailer::from_config(&settings.email) {
        Ok(mailer) => {
            info!("✓ Email configured via {}:{}", settings.email.host, settings.email.port);
            Arc::new(mailer)
        }
        Err(e) => {
            warn!("Email setup failed, notifications disabled: {}", e);
            Arc::new(DisabledMailer)
        }
    }
}

fn completer(settings: &Settings) -> Option<Arc<dyn ChatCompleter>> {
    match OpenAiClient::from_config(&settings.openai) {
        Ok(Some(client)) => {
            info!("✓ Chatbot model: {}", settings.openai.model);
            Some(Arc::new(client))
        }
        Ok(None) => {
            info!("OpenAI API key not configured, chatbot uses built-in replies only");
            None
        }
        Err(e) => {
            warn!("Chatbot client setup failed, using built-in replies only: {}", e);
            None
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
