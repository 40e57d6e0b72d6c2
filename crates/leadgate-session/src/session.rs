use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Interval between background access-token refreshes. Well inside the
/// 15-minute access-token TTL.
const REFRESH_INTERVAL: Duration = Duration::from_secs(600);

/// The authenticated admin as the dashboard sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminIdentity {
    pub admin_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AdminIdentity {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The auth service said no; carries its message verbatim.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("not authenticated")]
    Unauthenticated,
}

/// Response envelope mirrored from the auth service.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoggedInData {
    admin: AdminIdentity,
}

struct SessionInner {
    client: reqwest::Client,
    base_url: String,
    identity: Mutex<Option<AdminIdentity>>,
    refresher: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

/// Handle to the dashboard's auth session. Cheap to clone; all clones share
/// the cookie jar, the identity, and the background refresh task.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl AuthSession {
    /// `base_url` is the auth service origin, e.g. `https://api.example.com`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                base_url: base_url.into(),
                identity: Mutex::new(None),
                refresher: Mutex::new(None),
            }),
        })
    }

    /// Establish the session state at startup: ask the service who we are,
    /// and fall back to one silent refresh before concluding we are logged
    /// out. Always resolves; a dead session is `Ok(None)`.
    pub async fn initialize(&self) -> Result<Option<AdminIdentity>, SessionError> {
        match self.fetch_me().await {
            Ok(identity) => {
                self.set_identity(identity.clone());
                self.start_refresher();
                return Ok(Some(identity));
            }
            Err(SessionError::Transport(e)) => return Err(SessionError::Transport(e)),
            Err(_) => {}
        }

        // Access cookie missing or expired; the refresh cookie may still be
        // good for another 7 days.
        match self.refresh().await {
            Ok(identity) => {
                self.start_refresher();
                Ok(Some(identity))
            }
            Err(SessionError::Transport(e)) => Err(SessionError::Transport(e)),
            Err(_) => {
                tracing::debug!("no resumable session");
                Ok(None)
            }
        }
    }

    /// Step one of login. Success means a code was mailed — the session is
    /// not authenticated until [`verify_login_otp`](Self::verify_login_otp).
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Step two of login: submit the mailed code. On success the service has
    /// set the token cookies on our jar and we hold the identity.
    pub async fn verify_login_otp(
        &self,
        email: &str,
        otp: &str,
    ) -> Result<AdminIdentity, SessionError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/verify-otp"))
            .json(&json!({
                "email": email,
                "otp": otp,
                "purpose": "login_verification",
            }))
            .send()
            .await?;
        let data: LoggedInData = read_envelope(response).await?;

        self.set_identity(data.admin.clone());
        self.start_refresher();
        Ok(data.admin)
    }

    /// Mint a fresh access token from the refresh cookie. Updates the held
    /// identity from the response profile.
    pub async fn refresh(&self) -> Result<AdminIdentity, SessionError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/refresh-token"))
            .send()
            .await?;
        let data: LoggedInData = read_envelope(response).await?;

        self.set_identity(data.admin.clone());
        Ok(data.admin)
    }

    /// Log out: clears the server-set cookies, the held identity, and the
    /// refresh task. Safe to call on an already-dead session.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let result = self
            .inner
            .client
            .post(self.url("/auth/logout"))
            .send()
            .await;

        self.clear();
        result?;
        Ok(())
    }

    /// The identity held in memory, if any. Does not touch the network.
    pub fn current_identity(&self) -> Option<AdminIdentity> {
        self.inner.identity.lock().ok().and_then(|i| i.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }

    async fn fetch_me(&self) -> Result<AdminIdentity, SessionError> {
        let response = self
            .inner
            .client
            .get(self.url("/auth/me"))
            .send()
            .await?;
        read_envelope(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn set_identity(&self, identity: AdminIdentity) {
        if let Ok(mut slot) = self.inner.identity.lock() {
            *slot = Some(identity);
        }
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.inner.identity.lock() {
            *slot = None;
        }
        if let Ok(mut task) = self.inner.refresher.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }

    /// Spawn the 10-minute refresh loop, replacing any previous one. The task
    /// holds only a weak handle so a dropped session tears it down.
    fn start_refresher(&self) {
        let weak: Weak<SessionInner> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(REFRESH_INTERVAL).await;
                let Some(inner) = weak.upgrade() else { break };
                let session = AuthSession { inner };
                match session.refresh().await {
                    Ok(_) => tracing::debug!("session refreshed"),
                    Err(e) => {
                        tracing::warn!(error = %e, "session refresh failed, ending session");
                        if let Ok(mut slot) = session.inner.identity.lock() {
                            *slot = None;
                        }
                        break;
                    }
                }
            }
        });

        if let Ok(mut task) = self.inner.refresher.lock() {
            if let Some(previous) = task.replace(handle) {
                previous.abort();
            }
        }
    }
}

async fn read_envelope<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, SessionError> {
    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(SessionError::Unauthenticated);
    }

    let envelope: Envelope<T> = response.json().await?;
    if !status.is_success() || !envelope.success {
        return Err(SessionError::Rejected {
            status: status.as_u16(),
            message: envelope
                .message
                .unwrap_or_else(|| "request rejected".to_owned()),
        });
    }
    envelope.data.ok_or(SessionError::Rejected {
        status: status.as_u16(),
        message: "response missing data".to_owned(),
    })
}
