pub mod api;
pub mod booking;
pub mod catalog;
pub mod error;
pub mod format;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pricing;
pub mod settings;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::{
    course_slots, create_order, delete_order, get_course, get_order, get_tutor, healthz_live,
    healthz_ready, list_courses, list_orders, list_tutors, quote, refresh_catalog, root,
    update_order,
};
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::BookingApiClient;
use crate::catalog::CatalogStore;
use crate::openapi::ApiDoc;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub api: Arc<BookingApiClient>,
    pub catalog: Arc<CatalogStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let api = BookingApiClient::new(settings.api_base_url.clone(), settings.api_key.clone());
        Self {
            settings,
            api: Arc::new(api),
            catalog: Arc::new(CatalogStore::new()),
        }
    }
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;

    let env_filter = if settings.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .without_time()
        .init();

    let state = AppState::new(settings);
    if !state.api.has_api_key() {
        warn!("APP_API_KEY is not set, booking API calls will be refused");
    } else if let Err(err) = state.catalog.refresh(&state.api).await {
        warn!(error = %err, "initial catalog load failed, will retry on first request");
    }

    let app = build_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], state.settings.port));
    info!("Starting language school booking API on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    let mut router = Router::new()
        .route("/", get(root))
        .route("/healthz/live", get(healthz_live))
        .route("/healthz/ready", get(healthz_ready))
        .route("/courses", get(list_courses))
        .route("/courses/{id}", get(get_course))
        .route("/courses/{id}/slots", get(course_slots))
        .route("/tutors", get(list_tutors))
        .route("/tutors/{id}", get(get_tutor))
        .route("/catalog/refresh", post(refresh_catalog))
        .route("/quote", post(quote))
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .with_state(state.clone());

    if state.settings.enable_swagger {
        let openapi = ApiDoc::openapi();
        let swagger = SwaggerUi::new("/docs").url("/openapi.json", openapi);
        router = router.merge(swagger);
    }

    router.layer(trace_layer).layer(CorsLayer::permissive())
}
