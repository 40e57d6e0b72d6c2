use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::domain::types::{FORGOT_PASSWORD_IP_POLICY, RESET_PASSWORD_IP_POLICY};
use crate::error::AuthServiceError;
use crate::handlers::{ApiResponse, ClientIp, enforce_rate_limit};
use crate::state::AppState;
use crate::usecase::password::{
    ForgotPasswordInput, ForgotPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase,
};

/// The one message `/auth/forgot-password` ever returns on success, whether
/// or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset code has been sent.";

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    #[serde(default)]
    pub email: String,
}

/// `POST /auth/forgot-password`
pub async fn forgot_password(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<ForgotPasswordBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    enforce_rate_limit(
        &state.rate_limiter,
        format!("forgot_password_{ip}"),
        FORGOT_PASSWORD_IP_POLICY,
    )
    .await?;

    let usecase = ForgotPasswordUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer.clone(),
        rate_limiter: state.rate_limiter.clone(),
    };
    usecase
        .execute(ForgotPasswordInput { email: body.email })
        .await?;

    Ok(Json(ApiResponse::message_only(FORGOT_PASSWORD_MESSAGE)))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    #[serde(default)]
    pub reset_token: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// `POST /auth/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<ResetPasswordBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    enforce_rate_limit(
        &state.rate_limiter,
        format!("reset_password_{ip}"),
        RESET_PASSWORD_IP_POLICY,
    )
    .await?;

    let usecase = ResetPasswordUseCase {
        admins: state.admin_repo(),
        mailer: state.mailer.clone(),
        access_secret: state.access_secret.clone(),
    };
    usecase
        .execute(ResetPasswordInput {
            reset_token: body.reset_token,
            new_password: body.new_password,
            confirm_password: body.confirm_password,
        })
        .await?;

    Ok(Json(ApiResponse::message_only(
        "password reset successful, you can now log in with the new password",
    )))
}
