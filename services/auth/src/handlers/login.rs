use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::domain::types::LOGIN_IP_POLICY;
use crate::error::AuthServiceError;
use crate::handlers::{ApiResponse, ClientIp, enforce_rate_limit};
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub email: String,
}

/// `POST /auth/login` — step one of the two-factor login. On success only a
/// verification code is mailed; tokens come from `/auth/verify-otp`.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    enforce_rate_limit(&state.rate_limiter, format!("login_{ip}"), LOGIN_IP_POLICY).await?;

    let usecase = LoginUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer.clone(),
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        "password accepted, check your email for the login code",
        LoginData {
            email: output.email,
        },
    )))
}
