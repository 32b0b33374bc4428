//! Per-browser-session auth state.
//!
//! A `SessionContext` tracks who is signed in and what role they hold. Every auth
//! transition replaces the whole snapshot in one step, so readers never observe a
//! half-cleared session. The role lookup runs in the background after sign-in; until
//! it lands the context reports that it is still resolving.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AuthError;
use crate::models::Role;
use crate::repository::{Repository, RepositoryState};
use crate::supabase::{AuthIdentity, AuthProviderState, AuthSession};

/// Where a context is in the sign-in lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    #[default]
    Anonymous,
    /// A credential exchange with the auth service is in flight.
    Authenticating,
    /// Signed in; the role lookup has not answered yet.
    RoleUnknown,
    RoleKnown,
}

/// Auth state changes, as reported by the auth service.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// The session found at start-up (or `None`).
    InitialSession(Option<AuthSession>),
    SignedIn(AuthSession),
    SignedOut,
    TokenRefreshed(AuthSession),
}

/// A consistent view of one context. `is_admin` and friends are derived from the
/// role on every call and are never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthSnapshot {
    pub phase: AuthPhase,
    pub session: Option<AuthSession>,
    pub user: Option<AuthIdentity>,
    pub role: Option<Role>,
    epoch: u64,
}

impl AuthSnapshot {
    /// True while either the credential exchange or the role lookup is pending.
    pub fn is_resolving(&self) -> bool {
        matches!(self.phase, AuthPhase::Authenticating | AuthPhase::RoleUnknown)
    }

    pub fn is_loading(&self) -> bool {
        self.phase == AuthPhase::Authenticating
    }

    pub fn is_role_loading(&self) -> bool {
        self.user.is_some() && self.role.is_none()
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_super_admin)
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            user: self.user.clone(),
            role: self.role.as_ref().map(|r| r.as_str().to_string()),
            loading: self.is_loading(),
            role_loading: self.is_role_loading(),
            is_admin: self.is_admin(),
            is_super_admin: self.is_super_admin(),
        }
    }

    /// Phase implied by what is known, for leaving `Authenticating`.
    fn settle(&mut self) {
        self.phase = match (&self.user, &self.role) {
            (None, _) => AuthPhase::Anonymous,
            (Some(_), None) => AuthPhase::RoleUnknown,
            (Some(_), Some(_)) => AuthPhase::RoleKnown,
        };
    }
}

/// Serializable projection of a snapshot. Never carries tokens.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionView {
    pub phase: AuthPhase,
    pub user: Option<AuthIdentity>,
    pub role: Option<String>,
    pub loading: bool,
    pub role_loading: bool,
    pub is_admin: bool,
    pub is_super_admin: bool,
}

/// Looks up a user's role. A missing row means `user`; so does a failed lookup,
/// which is logged and otherwise swallowed.
pub async fn resolve_role(repo: &dyn Repository, user_id: Uuid) -> Role {
    match repo.get_user_role(user_id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            tracing::debug!(%user_id, "No role assigned, defaulting to user");
            Role::User
        }
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "Error fetching user role, defaulting to user");
            Role::User
        }
    }
}

/// SessionContext
///
/// Owns the auth state of one browser session. Built explicitly with the provider
/// and repository it talks to; there is no process-wide instance.
pub struct SessionContext {
    provider: AuthProviderState,
    repo: RepositoryState,
    state: Arc<watch::Sender<AuthSnapshot>>,
}

impl SessionContext {
    pub fn new(provider: AuthProviderState, repo: RepositoryState) -> Arc<Self> {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Arc::new(Self {
            provider,
            repo,
            state: Arc::new(state),
        })
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Receives every snapshot replacement from now on.
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Applies one auth event. The snapshot is replaced before this returns; when
    /// a user is present a role lookup is started and its handle returned.
    pub fn apply_event(&self, event: AuthEvent) -> Option<JoinHandle<()>> {
        match event {
            AuthEvent::InitialSession(Some(session))
            | AuthEvent::SignedIn(session)
            | AuthEvent::TokenRefreshed(session) => {
                let user_id = session.user.id;
                let mut epoch = 0;
                self.state.send_modify(|snap| {
                    let same_user = snap.user.as_ref().is_some_and(|u| u.id == user_id);
                    snap.epoch += 1;
                    snap.user = Some(session.user.clone());
                    snap.session = Some(session);
                    if !same_user {
                        snap.role = None;
                    }
                    // A known role for the same user stays in force while it is re-read.
                    snap.settle();
                    epoch = snap.epoch;
                });
                Some(self.spawn_role_fetch(user_id, epoch))
            }
            AuthEvent::InitialSession(None) | AuthEvent::SignedOut => {
                self.state.send_modify(|snap| {
                    *snap = AuthSnapshot {
                        epoch: snap.epoch + 1,
                        ..AuthSnapshot::default()
                    };
                });
                None
            }
        }
    }

    fn spawn_role_fetch(&self, user_id: Uuid, epoch: u64) -> JoinHandle<()> {
        let repo = self.repo.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let role = resolve_role(repo.as_ref(), user_id).await;
            let applied = state.send_if_modified(|snap| {
                let current = snap.epoch == epoch
                    && snap.user.as_ref().is_some_and(|u| u.id == user_id);
                if !current {
                    return false;
                }
                snap.role = Some(role.clone());
                if snap.phase != AuthPhase::Authenticating {
                    snap.settle();
                }
                true
            });
            if applied {
                tracing::debug!(%user_id, role = role.as_str(), "Role resolved");
            } else {
                tracing::debug!(%user_id, "Discarding role lookup for a superseded session");
            }
        })
    }

    fn begin_authenticating(&self) {
        self.state
            .send_modify(|snap| snap.phase = AuthPhase::Authenticating);
    }

    fn abort_authenticating(&self) {
        self.state.send_modify(AuthSnapshot::settle);
    }

    /// Restores a session obtained elsewhere (the getSession equivalent).
    pub fn restore(&self, session: Option<AuthSession>) -> Option<JoinHandle<()>> {
        self.apply_event(AuthEvent::InitialSession(session))
    }

    /// Exchanges credentials. Failures come back as values and leave the previous
    /// state in place.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        self.begin_authenticating();
        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "User signed in");
                self.apply_event(AuthEvent::SignedIn(session.clone()));
                Ok(session)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Sign-in rejected");
                self.abort_authenticating();
                Err(e)
            }
        }
    }

    /// Registers an account. The state only changes when the auth service signs the
    /// new user in straight away.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        confirmation_redirect: &str,
    ) -> Result<Option<AuthSession>, AuthError> {
        let session = self
            .provider
            .sign_up(email, password, confirmation_redirect)
            .await?;
        if let Some(session) = &session {
            self.apply_event(AuthEvent::SignedIn(session.clone()));
        }
        Ok(session)
    }

    /// Signs out. On success session, user and role are cleared together.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .snapshot()
            .session
            .map(|s| s.access_token);
        if let Some(token) = token {
            self.provider.sign_out(&token).await?;
        }
        self.apply_event(AuthEvent::SignedOut);
        tracing::info!("User signed out");
        Ok(())
    }

    /// Rotates the tokens, using `refresh_token` when given and the stored one
    /// otherwise. An expired refresh token signs the context out.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthSession, AuthError> {
        let refresh_token = refresh_token
            .map(str::to_string)
            .or_else(|| self.snapshot().session.and_then(|s| s.refresh_token))
            .ok_or(AuthError::SessionExpired)?;

        match self.provider.refresh_session(&refresh_token).await {
            Ok(session) => {
                self.apply_event(AuthEvent::TokenRefreshed(session.clone()));
                Ok(session)
            }
            Err(AuthError::SessionExpired) => {
                self.apply_event(AuthEvent::SignedOut);
                Err(AuthError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    /// Waits up to `timeout` for pending work to finish and returns whatever
    /// snapshot is current at that point.
    pub async fn wait_until_resolved(&self, timeout: Duration) -> AuthSnapshot {
        let mut rx = self.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|snap| !snap.is_resolving())).await {
            Ok(Ok(snap)) => snap.clone(),
            _ => self.snapshot(),
        }
    }
}

/// How long a revocation is remembered when the token's own expiry is unknown.
/// Matches the default lifetime of a Supabase access token.
const REVOCATION_FALLBACK_SECS: i64 = 3600;

struct RegisteredSession {
    context: Arc<SessionContext>,
    /// `exp` of the access token the entry is keyed by.
    expires_at: Option<i64>,
}

#[derive(Default)]
struct RegistryTables {
    live: HashMap<String, RegisteredSession>,
    /// Signed-out access tokens, held until they would have expired anyway.
    revoked: HashMap<String, i64>,
}

impl RegistryTables {
    fn prune_expired(&mut self, now: i64) {
        self.live
            .retain(|_, entry| !entry.expires_at.is_some_and(|exp| exp < now));
        self.revoked.retain(|_, exp| *exp >= now);
    }
}

/// SessionRegistry
///
/// Live contexts keyed by their current access token. An entry is only handed out
/// while its token is unexpired, and a signed-out token is refused until its
/// expiry so it cannot be restored into a fresh session.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    tables: Arc<RwLock<RegistryTables>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The context for `token`. An expired entry is dropped and reported as absent.
    pub async fn get(&self, token: &str) -> Option<Arc<SessionContext>> {
        let now = Utc::now().timestamp();
        {
            let tables = self.tables.read().await;
            match tables.live.get(token) {
                None => return None,
                Some(entry) if !entry.expires_at.is_some_and(|exp| exp < now) => {
                    return Some(entry.context.clone());
                }
                Some(_) => {}
            }
        }
        tracing::debug!("Dropping session for an expired access token");
        self.tables.write().await.live.remove(token);
        None
    }

    /// Registers `context` under `token`, taking the expiry from the context's
    /// current session.
    pub async fn insert(&self, token: impl Into<String>, context: Arc<SessionContext>) {
        let expires_at = context.snapshot().session.and_then(|s| s.expires_at);
        let mut tables = self.tables.write().await;
        tables.prune_expired(Utc::now().timestamp());
        tables.live.insert(
            token.into(),
            RegisteredSession {
                context,
                expires_at,
            },
        );
    }

    /// Forgets `token` without refusing it later; used when a token is rotated.
    pub async fn remove(&self, token: &str) -> Option<Arc<SessionContext>> {
        self.tables
            .write()
            .await
            .live
            .remove(token)
            .map(|entry| entry.context)
    }

    /// Forgets `token` and refuses it until it expires.
    pub async fn revoke(&self, token: &str) -> Option<Arc<SessionContext>> {
        let now = Utc::now().timestamp();
        let mut tables = self.tables.write().await;
        tables.prune_expired(now);
        let entry = tables.live.remove(token);
        let expires_at = entry
            .as_ref()
            .and_then(|entry| entry.expires_at)
            .unwrap_or(now + REVOCATION_FALLBACK_SECS);
        tables.revoked.insert(token.to_string(), expires_at);
        entry.map(|entry| entry.context)
    }

    pub async fn is_revoked(&self, token: &str) -> bool {
        let now = Utc::now().timestamp();
        self.tables
            .read()
            .await
            .revoked
            .get(token)
            .is_some_and(|exp| *exp >= now)
    }

    pub async fn len(&self) -> usize {
        self.tables.read().await.live.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.live.is_empty()
    }
}
