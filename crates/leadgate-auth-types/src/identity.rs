//! Access-cookie identity extractor for protected routes.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::header::COOKIE;
use http::request::Parts;

use crate::cookie::LG_ACCESS_TOKEN;
use crate::token::{TokenInfo, validate_access_token};

/// Implemented by router state so the extractor can reach the signing secret.
pub trait AccessSecretProvider {
    fn access_secret(&self) -> &str;
}

/// The authenticated admin, extracted from the `lg_access_token` cookie.
///
/// Rejects with 401 when the cookie is absent, expired, or fails validation.
/// Permission enforcement (403) is done by handlers after extraction.
#[derive(Debug, Clone)]
pub struct Identity(pub TokenInfo);

/// Value of `name` within the request's Cookie headers, if present.
fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_owned())
}

impl<S> FromRequestParts<S> for Identity
where
    S: AccessSecretProvider + Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let info = cookie_value(parts, LG_ACCESS_TOKEN)
            .and_then(|value| validate_access_token(&value, state.access_secret()).ok());

        async move { info.map(Self).ok_or(StatusCode::UNAUTHORIZED) }
    }
}
