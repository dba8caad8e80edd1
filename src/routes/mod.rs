use crate::models::AppState;
use axum::body::Body;
use axum::routing::get;
use axum::Router;
use http::{Request, Response, StatusCode};
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

mod api_routes;

/// Запас сверх таймаута клиента поставщика, чтобы его ошибка (502) успела дойти до ответа
const SERVER_TIMEOUT_MARGIN: Duration = Duration::from_secs(2);

/// `upstream_timeout` - таймаут запросов к поставщику, сервер ждёт чуть дольше
pub fn init(state: AppState, upstream_timeout: Duration) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http-request",
                method = %request.method(),
                path = %request.uri().path(),
                status = tracing::field::Empty,
            )
        })
        .on_request(())
        .on_response(|response: &Response<Body>, latency: Duration, span: &Span| {
            span.record("status", response.status().as_u16());
            tracing::debug!("done in {latency:?}")
        })
        .on_failure(|error: ServerErrorsFailureClass, latency: Duration, _span: &Span| {
            tracing::error!("request failed: {error:?} after {latency:?}")
        });
    let timeout = TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        upstream_timeout + SERVER_TIMEOUT_MARGIN,
    );
    Router::new()
        .route("/health", get(|| async { (StatusCode::OK, "ok") }))
        .merge(api_routes::init(state))
        .layer(trace)
        .layer(timeout)
        .layer(CorsLayer::new().allow_methods(Any).allow_origin(Any))
}
