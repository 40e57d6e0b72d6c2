use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use http::StatusCode;
use serde::Deserialize;

use crate::domain::types::REGISTER_IP_POLICY;
use crate::error::AuthServiceError;
use crate::handlers::{AdminProfile, ApiResponse, ClientIp, enforce_rate_limit};
use crate::state::AppState;
use crate::usecase::register::{RegisterInput, RegisterUseCase};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    enforce_rate_limit(
        &state.rate_limiter,
        format!("register_{ip}"),
        REGISTER_IP_POLICY,
    )
    .await?;

    let usecase = RegisterUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer.clone(),
    };
    let output = usecase
        .execute(RegisterInput {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            role: body.role,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            "registration successful, check your email for the verification code",
            AdminProfile::from(&output.admin),
        )),
    ))
}
