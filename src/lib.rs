use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Configuration and the error taxonomy.
pub mod config;
pub mod error;

// Domain: rows, the section content model and the editors built on it.
pub mod content;
pub mod editor;
pub mod json_input;
pub mod models;

// Persistence.
pub mod memory;
pub mod repository;

// Identity: the external auth service, per-session state, token extraction, guard.
pub mod auth;
pub mod guard;
pub mod session;
pub mod supabase;

// HTTP surface.
pub mod handlers;
pub mod routes;
use routes::{admin, public, session as session_routes};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use memory::InMemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};
pub use session::SessionRegistry;
pub use supabase::{AuthProviderState, MockAuthProvider, SupabaseAuthClient};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and browsable
/// at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::public::get_published_page, handlers::public::list_published_blog_posts,
        handlers::public::get_published_blog_post, handlers::public::list_published_case_studies,
        handlers::public::get_published_case_study, handlers::public::submit_contact,
        handlers::auth::sign_in, handlers::auth::sign_up, handlers::auth::get_session,
        handlers::auth::refresh_session, handlers::auth::sign_out,
        handlers::admin::get_admin_stats, handlers::admin::assign_role,
        handlers::pages::list_pages, handlers::pages::get_page, handlers::pages::create_page,
        handlers::pages::update_page, handlers::pages::delete_page,
        handlers::sections::add_section, handlers::sections::update_section,
        handlers::sections::replace_section_json, handlers::sections::move_section,
        handlers::sections::delete_section, handlers::sections::get_section_form,
        handlers::blog::list_blog_posts, handlers::blog::get_blog_post,
        handlers::blog::create_blog_post, handlers::blog::update_blog_post,
        handlers::blog::delete_blog_post,
        handlers::case_studies::list_case_studies, handlers::case_studies::get_case_study,
        handlers::case_studies::create_case_study, handlers::case_studies::update_case_study,
        handlers::case_studies::delete_case_study,
        handlers::components::list_components, handlers::components::get_component,
        handlers::components::create_component, handlers::components::update_component,
        handlers::components::delete_component,
        handlers::settings::list_settings, handlers::settings::create_setting,
        handlers::settings::save_setting, handlers::settings::delete_setting,
        handlers::contacts::list_contacts, handlers::contacts::triage_contact,
    ),
    components(
        schemas(
            models::Page, models::BlogPost, models::CaseStudy, models::Component,
            models::SiteSetting, models::ContactSubmission, models::PublishStatus,
            models::ContactStatus, models::PageInput, models::NewSectionRequest,
            models::MoveSectionRequest, models::RawSectionJson, models::BlogPostInput,
            models::CaseStudyInput, models::ComponentInput, models::SiteSettingInput,
            models::ContactSubmissionInput, models::ContactTriageUpdate, models::RoleAssignment,
            models::SignInRequest, models::SignUpRequest, models::RefreshRequest,
            models::DashboardStats, content::SectionPatch, editor::SectionForm,
            editor::FormField, editor::FieldInput, session::SessionView, session::AuthPhase,
            supabase::AuthIdentity, handlers::auth::SessionTokens, handlers::auth::SignUpOutcome,
        )
    ),
    tags(
        (name = "passportify-cms", description = "Passportify CMS API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of every shared service. Handlers pull what they
/// need through `State<AppState>` or the `FromRef` impls below.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, `InMemoryRepository` in tests.
    pub repo: RepositoryState,
    /// External auth service (Supabase GoTrue or the mock).
    pub auth: AuthProviderState,
    /// Live per-browser session contexts, keyed by access token.
    pub sessions: SessionRegistry,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Assembles a state with an empty session registry.
    pub fn new(repo: RepositoryState, auth: AuthProviderState, config: AppConfig) -> Self {
        Self {
            repo,
            auth,
            sessions: SessionRegistry::new(),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AuthProviderState {
    fn from_ref(app_state: &AppState) -> AuthProviderState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(app_state: &AppState) -> SessionRegistry {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the three access tiers, puts each behind its guard and wraps the whole
/// app in the request-id / tracing / CORS stack.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Guarded Admin Tier
    // `route_layer` so unmatched paths still 404 instead of hitting the guard.
    let admin_tier = admin::admin_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_admin,
        ))
        .merge(
            admin::super_admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                guard::require_super_admin,
            )),
        );

    // 3. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(session_routes::session_routes())
        .nest("/admin", admin_tier)
        .with_state(state);

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, carrying the `x-request-id` so every log line of the request
/// can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
