use std::net::SocketAddr;

use axum::{
    extract::State,
    middleware::{from_fn_with_state, map_response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::require_auth,
    error::{ApiError, ApiResult},
    middleware::{cors_layer, envelope_bare_errors, request_id},
    response::ApiResponse,
    state::AppState,
    tasks, users,
};

async fn root() -> &'static str {
    "Hello World!"
}

async fn health(State(state): State<AppState>) -> ApiResult<ApiResponse> {
    state.storage.ping().await?;
    Ok(ApiResponse::ok(json!({ "status": "ok" })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".into())
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(users::router())
        .merge(tasks::router())
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let http = &state.config.http;
    let timeout = TimeoutLayer::new(http.timeout());
    let cors = cors_layer(&http.allowed_origins);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(users::public_router())
        .merge(protected)
        .fallback(not_found)
        .with_state(state)
        .layer(timeout)
        .layer(map_response(envelope_bare_errors))
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        request_id = %request_id(req),
                        status = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

pub async fn serve(app: Router, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr.parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
