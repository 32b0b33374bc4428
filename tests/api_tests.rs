use jsonwebtoken::{EncodingKey, Header, encode};
use passportify_cms::{
    AppConfig, AppState, InMemoryRepository, MockAuthProvider,
    auth::Claims,
    config::Env,
    create_router,
    models::Role,
    repository::RepositoryState,
    supabase::AuthProviderState,
};
use reqwest::{StatusCode, header, redirect::Policy};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Debug)]
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app_with(
    repo: InMemoryRepository,
    provider: MockAuthProvider,
    config: AppConfig,
) -> TestApp {
    let state = AppState::new(
        Arc::new(repo) as RepositoryState,
        Arc::new(provider) as AuthProviderState,
        config,
    );
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Redirects are asserted on, not followed.
    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .unwrap();

    TestApp { address, client }
}

async fn spawn_app(repo: InMemoryRepository) -> TestApp {
    spawn_app_with(repo, MockAuthProvider::new(), AppConfig::default()).await
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app(InMemoryRepository::new()).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

// --- Route Guard ---

#[tokio::test]
async fn test_anonymous_admin_request_redirects_to_sign_in() {
    let app = spawn_app(InMemoryRepository::new()).await;

    let response = app
        .client
        .get(format!("{}/admin/pages", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth");
}

#[tokio::test]
async fn test_non_admin_is_denied_with_public_root() {
    let user_id = Uuid::new_v4();
    let app = spawn_app(InMemoryRepository::new().with_role(user_id, Role::User)).await;

    let response = app
        .client
        .get(format!("{}/admin/pages", app.address))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()[header::LOCATION], "/");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "access_denied");
    assert_eq!(body["redirect"], "/");
}

#[tokio::test]
async fn test_admin_is_allowed_through() {
    let admin_id = Uuid::new_v4();
    let app = spawn_app(InMemoryRepository::new().with_role(admin_id, Role::Admin)).await;

    let response = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .header("x-user-id", admin_id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn test_guard_waits_for_a_slow_role_lookup() {
    let admin_id = Uuid::new_v4();
    let repo = InMemoryRepository::new()
        .with_role(admin_id, Role::Admin)
        .with_role_lookup_delay(Duration::from_millis(100));
    let config = AppConfig {
        role_resolution_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    };
    let app = spawn_app_with(repo, MockAuthProvider::new(), config).await;

    let response = app
        .client
        .get(format!("{}/admin/pages", app.address))
        .header("x-user-id", admin_id.to_string())
        .send()
        .await
        .unwrap();

    // Never bounced while the role is in flight.
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_guard_answers_503_when_role_is_still_unknown() {
    let admin_id = Uuid::new_v4();
    let repo = InMemoryRepository::new()
        .with_role(admin_id, Role::Admin)
        .with_role_lookup_delay(Duration::from_millis(600));
    let config = AppConfig {
        role_resolution_timeout: Duration::from_millis(30),
        ..AppConfig::default()
    };
    let app = spawn_app_with(repo, MockAuthProvider::new(), config).await;
    let url = format!("{}/admin/pages", app.address);

    let response = app
        .client
        .get(&url)
        .header("x-user-id", admin_id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.headers()[header::RETRY_AFTER], "1");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "loading");

    // The lookup keeps running in the background; a retry gets through.
    tokio::time::sleep(Duration::from_millis(800)).await;
    let retry = app
        .client
        .get(&url)
        .header("x-user-id", admin_id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(retry.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_role_assignment_requires_super_admin() {
    let admin_id = Uuid::new_v4();
    let super_id = Uuid::new_v4();
    let target = Uuid::new_v4();
    let repo = InMemoryRepository::new()
        .with_role(admin_id, Role::Admin)
        .with_role(super_id, Role::SuperAdmin);
    let app = spawn_app(repo).await;
    let url = format!("{}/admin/users/{}/role", app.address, target);

    let denied = app
        .client
        .put(&url)
        .header("x-user-id", admin_id.to_string())
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .client
        .put(&url)
        .header("x-user-id", super_id.to_string())
        .json(&json!({ "role": "admin" }))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::NO_CONTENT);

    // The promoted user is an admin from their first session on.
    let response = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .header("x-user-id", target.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_admin_path_is_404_not_a_redirect() {
    let app = spawn_app(InMemoryRepository::new()).await;

    let response = app
        .client
        .get(format!("{}/admin/nothing-here", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_id_bypass_is_ignored_in_production() {
    let admin_id = Uuid::new_v4();
    let config = AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    };
    let app = spawn_app_with(
        InMemoryRepository::new().with_role(admin_id, Role::Admin),
        MockAuthProvider::new(),
        config,
    )
    .await;

    let response = app
        .client
        .get(format!("{}/admin/pages", app.address))
        .header("x-user-id", admin_id.to_string())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// --- Public Surface ---

#[tokio::test]
async fn test_public_content_routes() {
    let app = spawn_app(InMemoryRepository::new()).await;

    let blog = app
        .client
        .get(format!("{}/blog", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(blog.status(), StatusCode::OK);
    let posts: Vec<Value> = blog.json().await.unwrap();
    assert!(posts.is_empty());

    let page = app
        .client
        .get(format!("{}/pages/does-not-exist", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::NOT_FOUND);

    let contact = app
        .client
        .post(format!("{}/contact", app.address))
        .json(&json!({
            "name": "Grace",
            "email": "grace@acme.test",
            "message": "Please get in touch."
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(contact.status(), StatusCode::CREATED);
    let body: Value = contact.json().await.unwrap();
    assert_eq!(body["status"], "new");
}

#[tokio::test]
async fn test_admin_page_flow_over_http() {
    let admin_id = Uuid::new_v4();
    let app = spawn_app(InMemoryRepository::new().with_role(admin_id, Role::Admin)).await;

    let created: Value = app
        .client
        .post(format!("{}/admin/pages", app.address))
        .header("x-user-id", admin_id.to_string())
        .json(&json!({ "slug": "home", "title": "Home", "status": "published" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let page_id = created["id"].as_str().unwrap().to_string();

    let with_section: Value = app
        .client
        .post(format!("{}/admin/pages/{}/sections", app.address, page_id))
        .header("x-user-id", admin_id.to_string())
        .json(&json!({ "type": "hero" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(with_section["content"]["sections"][0]["type"], "hero");

    let public: Value = app
        .client
        .get(format!("{}/pages/home", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(public["content"]["sections"][0]["content"]["buttonText"], "Get Started");
}

// --- Session Lifecycle ---

#[tokio::test]
async fn test_sign_in_session_and_sign_out_over_http() {
    let user_id = Uuid::new_v4();
    let provider = MockAuthProvider::new().with_account(user_id, "ops@passportify.test", "pw");
    let repo = InMemoryRepository::new().with_role(user_id, Role::Admin);
    let app = spawn_app_with(repo, provider, AppConfig::default()).await;

    let bad = app
        .client
        .post(format!("{}/auth/sign-in", app.address))
        .json(&json!({ "email": "ops@passportify.test", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

    let tokens: Value = app
        .client
        .post(format!("{}/auth/sign-in", app.address))
        .json(&json!({ "email": "ops@passportify.test", "password": "pw" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let access_token = tokens["access_token"].as_str().unwrap().to_string();

    // The registered context answers admin routes for this bearer token.
    let stats = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);

    let view: Value = app
        .client
        .get(format!("{}/auth/session", app.address))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["phase"], "role_known");
    assert_eq!(view["is_admin"], true);

    let signed_out = app
        .client
        .post(format!("{}/auth/sign-out", app.address))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);

    let after: Value = app
        .client
        .get(format!("{}/auth/session", app.address))
        .bearer_auth(&access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["phase"], "anonymous");
    assert_eq!(after["is_admin"], false);
}

#[tokio::test]
async fn test_signed_out_jwt_no_longer_passes_the_guard() {
    let user_id = Uuid::new_v4();
    let config = AppConfig::default();
    let claims = Claims {
        sub: user_id,
        email: Some("ops@passportify.test".to_string()),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        iat: None,
        aud: Some("authenticated".to_string()),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap();
    let app = spawn_app_with(
        InMemoryRepository::new().with_role(user_id, Role::Admin),
        MockAuthProvider::new(),
        config,
    )
    .await;

    let before = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(before.status(), StatusCode::OK);

    let signed_out = app
        .client
        .post(format!("{}/auth/sign-out", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);

    let after = app
        .client
        .get(format!("{}/admin/stats", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert_eq!(after.headers()[header::LOCATION], "/auth");
}
