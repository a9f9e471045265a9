//! cosmic-server library interface
//!
//! Exposes the router and application state for the binary and for
//! integration tests.

pub mod api;
pub mod chatbot;
pub mod error;
pub mod extract;
pub mod leads;
pub mod notify;

pub use crate::error::{ApiError, ApiResult};
pub use crate::extract::ApiJson;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue};
use axum::Router;
use chatbot::{ChatCompleter, ChatbotService};
use chrono::{DateTime, Utc};
use cosmic_common::config::Settings;
use cosmic_common::{ContentStore, ObjectStore};
use cosmic_media::{BackgroundRemover, DualSinkWriter, UploadPipeline};
use notify::{LeadNotifier, Mailer};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Multipart framing allowance on top of the file payload
const BODY_OVERHEAD: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Row store for all content tables
    pub content: Arc<dyn ContentStore>,
    pub uploads: Arc<UploadPipeline>,
    pub notifier: Arc<LeadNotifier>,
    pub chatbot: Arc<ChatbotService>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        content: Arc<dyn ContentStore>,
        mirror: Option<Arc<dyn ObjectStore>>,
        mailer: Arc<dyn Mailer>,
        completer: Option<Arc<dyn ChatCompleter>>,
    ) -> cosmic_media::Result<Self> {
        let remover = BackgroundRemover::from_config(&settings.background_removal)?;
        let sink = DualSinkWriter::new(settings.upload_dir(), mirror);
        let uploads = UploadPipeline::new(remover, sink, settings.max_file_size);
        let notifier = LeadNotifier::new(mailer, &settings.email);
        let chatbot = ChatbotService::new(content.clone(), completer);

        Ok(Self {
            settings: Arc::new(settings),
            content,
            uploads: Arc::new(uploads),
            notifier: Arc::new(notifier),
            chatbot: Arc::new(chatbot),
            startup_time: Utc::now(),
        })
    }
}

/// CORS for the configured origin(s); `*` allows any
fn cors_layer(origins: &str) -> CorsLayer {
    if origins.trim() == "*" {
        return CorsLayer::permissive();
    }

    let parsed: Result<Vec<HeaderValue>, _> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(HeaderValue::from_str)
        .collect();

    match parsed {
        Ok(list) if !list.is_empty() => CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any),
        _ => {
            warn!("Invalid CORS origin '{}', allowing any origin", origins);
            CorsLayer::permissive()
        }
    }
}

/// Hardening headers added to every response that does not set its own.
/// CSP and COEP are left to the frontend.
fn security_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("0")),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (HeaderName::from_static("origin-agent-cluster"), HeaderValue::from_static("?1")),
        (
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ),
    ]
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state
        .settings
        .max_file_size
        .saturating_mul(api::upload::MAX_BATCH_FILES)
        .saturating_add(BODY_OVERHEAD);
    let cors = cors_layer(&state.settings.cors_origin);
    let static_files = ServeDir::new(&state.settings.static_dir);

    let mut router = Router::new()
        .merge(api::health_routes())
        .merge(api::content_routes())
        .merge(api::service_routes())
        .merge(api::review_routes())
        .merge(api::lead_routes())
        .merge(api::admin_routes())
        .merge(api::upload_routes())
        .merge(api::chatbot_routes())
        .nest_service("/static", static_files)
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new());

    for (name, value) in security_headers() {
        router = router.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
