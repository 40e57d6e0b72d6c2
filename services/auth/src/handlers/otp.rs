use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use leadgate_auth_types::cookie::{set_access_token_cookie, set_refresh_token_cookie};

use crate::domain::types::{OtpOutcome, VERIFY_OTP_IP_POLICY};
use crate::error::AuthServiceError;
use crate::handlers::{AdminProfile, ApiResponse, ClientIp, enforce_rate_limit};
use crate::state::AppState;
use crate::usecase::verify_otp::{VerifyOtpInput, VerifyOtpUseCase};

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum VerifyOtpData {
    EmailVerified {
        admin: AdminProfile,
    },
    LoggedIn {
        admin: AdminProfile,
        access_token: String,
        access_token_exp: u64,
        refresh_token: String,
    },
    PasswordResetAuthorized {
        reset_token: String,
    },
}

/// `POST /auth/verify-otp` — the second factor for all three flows. A login
/// verification additionally sets the token cookies on the response.
pub async fn verify_otp(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Json(body): Json<VerifyOtpBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    enforce_rate_limit(
        &state.rate_limiter,
        format!("verify_otp_{ip}"),
        VERIFY_OTP_IP_POLICY,
    )
    .await?;

    let usecase = VerifyOtpUseCase {
        admins: state.admin_repo(),
        otps: state.otp_repo(),
        mailer: state.mailer.clone(),
        access_secret: state.access_secret.clone(),
        refresh_secret: state.refresh_secret.clone(),
    };
    let outcome = usecase
        .execute(VerifyOtpInput {
            email: body.email,
            otp: body.otp,
            purpose: body.purpose,
        })
        .await?;

    let (jar, message, data) = match outcome {
        OtpOutcome::EmailVerified { admin } => (
            jar,
            "email verified, you can now log in",
            VerifyOtpData::EmailVerified {
                admin: AdminProfile::from(&admin),
            },
        ),
        OtpOutcome::LoggedIn {
            admin,
            access_token,
            access_token_exp,
            refresh_token,
        } => {
            let jar = set_access_token_cookie(
                jar,
                access_token.clone(),
                state.cookie_domain.clone(),
            );
            let jar =
                set_refresh_token_cookie(jar, refresh_token.clone(), state.cookie_domain.clone());
            (
                jar,
                "login successful",
                VerifyOtpData::LoggedIn {
                    admin: AdminProfile::from(&admin),
                    access_token,
                    access_token_exp,
                    refresh_token,
                },
            )
        }
        OtpOutcome::PasswordResetAuthorized { reset_token } => (
            jar,
            "code accepted, use the reset token to set a new password",
            VerifyOtpData::PasswordResetAuthorized { reset_token },
        ),
    };

    Ok((jar, Json(ApiResponse::ok_with_message(message, data))))
}
