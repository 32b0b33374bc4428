use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AuthError;

/// AuthIdentity
///
/// The opaque signed-in user reference handed out by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthIdentity {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

/// AuthSession
///
/// Tokens of one signed-in browser session. Restored sessions (a bearer token seen
/// for the first time by this process) carry no refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) after which the access token is rejected.
    pub expires_at: Option<i64>,
    pub user: AuthIdentity,
}

// 1. AuthProvider Contract
/// AuthProvider
///
/// The external auth service. Swappable between the real GoTrue client and
/// `MockAuthProvider` in tests, exactly like the repository.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Registers an account. Returns a session only when the project auto-confirms
    /// sign-ups; otherwise the visitor must follow the e-mailed link to
    /// `confirmation_redirect` first.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirmation_redirect: &str,
    ) -> Result<Option<AuthSession>, AuthError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError>;
}

/// AuthProviderState
///
/// The shared handle stored in the application state.
pub type AuthProviderState = Arc<dyn AuthProvider>;

// 2. The Real Implementation (Supabase GoTrue)
/// SupabaseAuthClient
///
/// Talks to `{SUPABASE_URL}/auth/v1` with the project's anon key.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    user: AuthIdentity,
}

impl From<TokenResponse> for AuthSession {
    fn from(token: TokenResponse) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token.expires_at,
            user: token.user,
        }
    }
}

/// `/signup` answers with a session when auto-confirm is on and with the bare user
/// otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthIdentity),
}

/// GoTrue has used several error envelopes over time; read them all.
#[derive(Deserialize, Default)]
struct GoTrueError {
    error_code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
}

impl GoTrueError {
    fn text(&self) -> String {
        self.msg
            .clone()
            .or_else(|| self.error_description.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "authentication request rejected".to_string())
    }

    fn into_auth_error(self, status: StatusCode) -> AuthError {
        let code = self.error_code.clone().unwrap_or_default();
        let text = self.text();
        let lowered = text.to_lowercase();

        if code == "invalid_credentials" || lowered.contains("invalid login credentials") {
            AuthError::InvalidCredentials
        } else if code == "user_already_exists" || lowered.contains("already registered") {
            AuthError::UserAlreadyExists
        } else if code == "refresh_token_not_found"
            || code == "session_not_found"
            || status == StatusCode::UNAUTHORIZED
        {
            AuthError::SessionExpired
        } else {
            AuthError::Rejected(text)
        }
    }
}

impl SupabaseAuthClient {
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("{}/auth/v1", supabase_url.trim_end_matches('/')),
            anon_key: anon_key.to_string(),
        }
    }

    async fn rejection(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.json::<GoTrueError>().await.unwrap_or_default();
        let error = body.into_auth_error(status);
        tracing::debug!(%status, %error, "Auth service rejected request");
        error
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(format!("{}/token", self.base_url))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(token.into())
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "password",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirmation_redirect: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let response = self
            .client
            .post(format!("{}/signup", self.base_url))
            .query(&[("redirect_to", confirmation_redirect)])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        match response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?
        {
            SignUpResponse::Session(token) => Ok(Some(token.into())),
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "Sign-up awaiting e-mail confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(format!("{}/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        // An already-revoked token still means the caller is signed out.
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.token_grant(
            "refresh_token",
            serde_json::json!({ "refresh_token": refresh_token }),
        )
        .await
    }
}

// 3. The Mock Implementation (For Tests and Local Development)
/// MockAuthProvider
///
/// In-memory auth service. Accounts are registered up front with `with_account`;
/// issued tokens are random and tracked so refresh and sign-out behave like the
/// real service.
#[derive(Default)]
pub struct MockAuthProvider {
    /// When set, every call fails as if the auth service were unreachable.
    should_fail: AtomicBool,
    state: Mutex<MockAuthState>,
}

#[derive(Default)]
struct MockAuthState {
    accounts: HashMap<String, (String, AuthIdentity)>,
    refresh_tokens: HashMap<String, AuthIdentity>,
    revoked: Vec<String>,
}

impl MockAuthState {
    fn issue(&mut self, user: AuthIdentity) -> AuthSession {
        let refresh_token = format!("mock-refresh-{}", Uuid::new_v4().simple());
        self.refresh_tokens
            .insert(refresh_token.clone(), user.clone());
        AuthSession {
            access_token: format!("mock-access-{}", Uuid::new_v4().simple()),
            refresh_token: Some(refresh_token),
            expires_at: None,
            user,
        }
    }
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        let provider = Self::default();
        provider.set_failing(true);
        provider
    }

    /// Starts or ends a simulated outage.
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    /// Registers a confirmed account.
    pub fn with_account(mut self, id: Uuid, email: &str, password: &str) -> Self {
        let identity = AuthIdentity {
            id,
            email: email.to_string(),
        };
        self.state
            .get_mut()
            .accounts
            .insert(email.to_string(), (password.to_string(), identity));
        self
    }

    /// Access tokens passed to `sign_out` so far.
    pub async fn revoked_tokens(&self) -> Vec<String> {
        self.state.lock().await.revoked.clone()
    }

    fn outage(&self) -> Result<(), AuthError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(AuthError::Transport(
                "Mock Auth Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.outage()?;
        let mut state = self.state.lock().await;
        let user = match state.accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(AuthError::InvalidCredentials),
        };
        Ok(state.issue(user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _confirmation_redirect: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        self.outage()?;
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(email) {
            return Err(AuthError::UserAlreadyExists);
        }
        let identity = AuthIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        state
            .accounts
            .insert(email.to_string(), (password.to_string(), identity));
        // Mirrors a project with e-mail confirmation enabled.
        Ok(None)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        self.outage()?;
        self.state
            .lock()
            .await
            .revoked
            .push(access_token.to_string());
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        self.outage()?;
        let mut state = self.state.lock().await;
        let user = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(AuthError::SessionExpired)?;
        Ok(state.issue(user))
    }
}
