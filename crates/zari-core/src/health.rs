use axum::http::StatusCode;

/// Liveness probe for `GET /healthz`. Services own their readiness checks.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
