use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::CurrentSession,
    error::{AppResult, AuthError},
    models::{RefreshRequest, SignInRequest, SignUpRequest},
    session::{SessionContext, SessionView},
    supabase::AuthSession,
};

/// SessionTokens
///
/// What the browser keeps after signing in: the bearer token for later requests
/// and the state of its session at the time of the response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    pub session: SessionView,
}

impl SessionTokens {
    fn new(tokens: &AuthSession, context: &SessionContext) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at: tokens.expires_at,
            session: context.snapshot().view(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SignUpOutcome {
    /// True when the account exists but the e-mailed link must be followed first.
    pub confirmation_required: bool,
    pub session: Option<SessionTokens>,
}

/// sign_in
///
/// [Public Route] Exchanges e-mail and password for a session. The role is resolved
/// in the background; poll `GET /auth/session` to see it land.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionTokens),
        (status = 401, description = "Invalid login credentials")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> AppResult<Json<SessionTokens>> {
    let context = SessionContext::new(state.auth.clone(), state.repo.clone());
    let tokens = context.sign_in(&payload.email, &payload.password).await?;
    state
        .sessions
        .insert(tokens.access_token.clone(), context.clone())
        .await;
    Ok(Json(SessionTokens::new(&tokens, &context)))
}

/// sign_up
///
/// [Public Route] Registers an account. The confirmation e-mail links back to
/// `SITE_URL`.
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Signed up and signed in", body = SignUpOutcome),
        (status = 202, description = "Confirmation e-mail sent", body = SignUpOutcome),
        (status = 409, description = "User already registered")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<SignUpOutcome>)> {
    let context = SessionContext::new(state.auth.clone(), state.repo.clone());
    let redirect = state.config.confirmation_redirect();

    match context
        .sign_up(&payload.email, &payload.password, &redirect)
        .await?
    {
        Some(tokens) => {
            state
                .sessions
                .insert(tokens.access_token.clone(), context.clone())
                .await;
            Ok((
                StatusCode::OK,
                Json(SignUpOutcome {
                    confirmation_required: false,
                    session: Some(SessionTokens::new(&tokens, &context)),
                }),
            ))
        }
        None => Ok((
            StatusCode::ACCEPTED,
            Json(SignUpOutcome {
                confirmation_required: true,
                session: None,
            }),
        )),
    }
}

/// get_session
///
/// [Session Route] The caller's current auth state. Anonymous callers get the
/// anonymous view, never an error.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(session: CurrentSession) -> Json<SessionView> {
    Json(session.snapshot().view())
}

/// refresh_session
///
/// [Session Route] Rotates the tokens. The context moves to the new access token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = SessionTokens),
        (status = 401, description = "Session expired")
    )
)]
pub async fn refresh_session(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<SessionTokens>> {
    let context = session
        .context
        .clone()
        .unwrap_or_else(|| SessionContext::new(state.auth.clone(), state.repo.clone()));

    match context.refresh(Some(&payload.refresh_token)).await {
        Ok(tokens) => {
            if let Some(old_token) = &session.token {
                state.sessions.remove(old_token).await;
            }
            state
                .sessions
                .insert(tokens.access_token.clone(), context.clone())
                .await;
            Ok(Json(SessionTokens::new(&tokens, &context)))
        }
        Err(e) => {
            // The context signed itself out; stop resolving the old token to it.
            if e == AuthError::SessionExpired {
                if let Some(old_token) = &session.token {
                    state.sessions.revoke(old_token).await;
                }
            }
            Err(e.into())
        }
    }
}

/// sign_out
///
/// [Session Route] Signs the caller out and refuses the access token from then on.
/// A failed sign-out leaves the session in place.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 204, description = "Signed out"),
        (status = 502, description = "Auth service unreachable")
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    session: CurrentSession,
) -> AppResult<StatusCode> {
    if let (Some(token), Some(context)) = (&session.token, &session.context) {
        context.sign_out().await?;
        state.sessions.revoke(token).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
