use axum::http::StatusCode;

/// `GET /healthz` — liveness. Answers as long as the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz` — readiness. The auth service currently serves requests as
/// soon as it binds, so this mirrors liveness; a service with slow warm-up
/// would mount its own handler instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
