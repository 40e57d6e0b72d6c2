use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use leadgate_auth_types::cookie::{
    LG_REFRESH_TOKEN, clear_cookies, set_access_token_cookie,
};
use leadgate_auth_types::identity::Identity;

use crate::domain::repository::AdminRepository;
use crate::error::AuthServiceError;
use crate::handlers::{AdminProfile, ApiResponse};
use crate::state::AppState;
use crate::usecase::token::RefreshTokenUseCase;

#[derive(Debug, Deserialize, Default)]
pub struct RefreshTokenBody {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenData {
    pub admin: AdminProfile,
    pub access_token: String,
    pub access_token_exp: u64,
}

/// `POST /auth/refresh-token` — the refresh token is read from the cookie
/// when present, falling back to the request body for non-browser clients.
/// Only a new access token is minted; the refresh token stays as-is until
/// its own expiry.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshTokenBody>>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let refresh_value = jar
        .get(LG_REFRESH_TOKEN)
        .map(|c| c.value().to_owned())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token))
        .ok_or(AuthServiceError::InvalidToken)?;

    let usecase = RefreshTokenUseCase {
        admins: state.admin_repo(),
        access_secret: state.access_secret.clone(),
        refresh_secret: state.refresh_secret.clone(),
    };
    let output = usecase.execute(&refresh_value).await?;

    let jar = set_access_token_cookie(
        jar,
        output.access_token.clone(),
        state.cookie_domain.clone(),
    );

    Ok((
        jar,
        Json(ApiResponse::ok(RefreshTokenData {
            admin: AdminProfile::from(&output.admin),
            access_token: output.access_token,
            access_token_exp: output.access_token_exp,
        })),
    ))
}

/// `POST /auth/logout` — clears both token cookies. Stateless on the server
/// side, so it succeeds whether or not the caller was logged in.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = clear_cookies(jar, state.cookie_domain.clone());
    (jar, Json(ApiResponse::message_only("logged out")))
}

/// `GET /auth/me` — identity from the access-token cookie, profile from the
/// database so the response reflects the current account state rather than
/// whatever was baked into the token.
pub async fn me(
    State(state): State<AppState>,
    Identity(info): Identity,
) -> Result<impl IntoResponse, AuthServiceError> {
    let admin = state
        .admin_repo()
        .find_by_id(info.admin_id)
        .await?
        .ok_or(AuthServiceError::AdminNotFound)?;
    if !admin.is_active {
        return Err(AuthServiceError::AccountInactive);
    }

    Ok(Json(ApiResponse::ok(AdminProfile::from(&admin))))
}
