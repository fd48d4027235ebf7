//! Axum router configuration

use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};

use crate::errors::ApiError;
use crate::state::AppState;

use super::analyses::{get_analysis, register_analysis};
use super::caller::USER_ID_HEADER;
use super::config::{analysis_config, health, public_config, system_config};
use super::subtitles::{
    create_batch_job, download_subtitle, generate_subtitles, get_job, list_jobs, list_subtitles,
};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::ORIGIN,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    let api = Router::new()
        // Transcripts
        .route("/video/analyses", post(register_analysis))
        .route("/video/analyses/{video_id}", get(get_analysis))
        // Subtitles
        .route("/video/subtitles/generate", post(generate_subtitles))
        .route("/video/subtitles/batch", post(create_batch_job))
        .route("/video/subtitles/jobs", get(list_jobs))
        .route("/video/subtitles/jobs/{job_id}", get(get_job))
        .route("/video/subtitles/download/{file_id}", get(download_subtitle))
        .route("/video/subtitles/{video_id}", get(list_subtitles))
        // Configuration
        .route("/config/public", get(public_config))
        .route("/config/system", get(system_config))
        .route("/config/analysis", get(analysis_config))
        .route("/config/health", get(health));

    Router::new()
        .nest("/api/v1", api)
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

async fn not_found(method: Method, uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {} {}", method, uri.path()))
}

/// Log method, path, status and latency of every request
async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    if status.is_server_error() || status.is_client_error() {
        warn!("{} {} -> {} ({:?})", method, path, status.as_u16(), start.elapsed());
    } else {
        info!("{} {} -> {} ({:?})", method, path, status.as_u16(), start.elapsed());
    }
    response
}
