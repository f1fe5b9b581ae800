use anyhow::{Context, Result};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use super::{log_requests, state::*, ServerConfig};
use crate::recommend::{MoodRequest, RecommendError, Recommendation};

pub const RECOMMEND_PATH: &str = "/api/recommend";

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub model: Option<String>,
    pub configured: bool,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

impl IntoResponse for RecommendError {
    fn into_response(self) -> Response {
        let classified = self.classified();
        let status = StatusCode::from_u16(classified.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": classified.message }))).into_response()
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let model = match &state.recommender {
        RecommenderSlot::Ready(service) => Some(service.model().to_string()),
        RecommenderSlot::Misconfigured(_) => None,
    };
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        model,
        configured: state.recommender.is_configured(),
    })
}

/// Reads the inbound body leniently: anything that is not a JSON document
/// counts as `{}`, so the mood check produces the answer.
fn parse_body(body: &Bytes) -> Value {
    if body.is_empty() {
        return json!({});
    }
    serde_json::from_slice(body).unwrap_or_else(|err| {
        warn!("Failed to parse request body: {}", err);
        json!({})
    })
}

async fn post_recommend(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<Recommendation>, RecommendError> {
    let payload = parse_body(&body);
    let mood = payload
        .get("mood")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let artist = payload.get("artist").and_then(Value::as_str);

    let request = MoodRequest::new(mood, artist)?;
    let service = state.recommender.service()?;

    let cancel = state.shutdown.child_token();
    match service.recommend(&request, &cancel).await {
        Ok(recommendation) => Ok(Json(recommendation)),
        Err(err) => {
            let classified = err.classified();
            if classified.status_code >= 500 {
                error!(
                    status = classified.status_code,
                    retriable = classified.retriable,
                    "Gemini recommend error: {}",
                    classified.message
                );
            } else {
                warn!(
                    status = classified.status_code,
                    retriable = classified.retriable,
                    "Gemini recommend error: {}",
                    classified.message
                );
            }
            Err(err)
        }
    }
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}

pub fn make_app(
    config: ServerConfig,
    recommender: RecommenderSlot,
    shutdown: CancellationToken,
) -> Router {
    let state = ServerState::new(config.clone(), recommender, shutdown);

    let api_routes: Router = Router::new()
        .route(
            RECOMMEND_PATH,
            post(post_recommend).fallback(method_not_allowed),
        )
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .merge(api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Serves on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    recommender: RecommenderSlot,
    shutdown: CancellationToken,
) -> Result<()> {
    let app = make_app(config, recommender, shutdown.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

pub async fn run_server(
    config: ServerConfig,
    recommender: RecommenderSlot,
    shutdown: CancellationToken,
) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    serve(listener, config, recommender, shutdown).await
}
