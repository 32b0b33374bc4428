use passportify_cms::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    memory::InMemoryRepository,
    repository::{PostgresRepository, RepositoryState},
    supabase::{AuthProviderState, SupabaseAuthClient},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, the auth client and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise verbose for this crate, request summaries for tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "passportify_cms=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    let connected = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await;

    let repo: RepositoryState = match (connected, &config.env) {
        (Ok(pool), Env::Local) => {
            // LOCAL-ONLY: bring the schema up to date. Production schema is owned by Supabase.
            if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                tracing::warn!(error = %e, "Migrations failed; continuing with existing schema");
            }
            Arc::new(PostgresRepository::new(pool))
        }
        (Ok(pool), Env::Production) => Arc::new(PostgresRepository::new(pool)),
        (Err(e), Env::Local) => {
            tracing::warn!(
                error = %e,
                "Postgres unreachable; falling back to the in-memory repository"
            );
            Arc::new(InMemoryRepository::new())
        }
        (Err(e), Env::Production) => {
            panic!("FATAL: Failed to connect to Postgres. Check DATABASE_URL. ({e})")
        }
    };

    // 5. Auth Provider (Supabase GoTrue)
    let auth = Arc::new(SupabaseAuthClient::new(
        &config.supabase_url,
        &config.supabase_anon_key,
    )) as AuthProviderState;

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(repo, auth, config);

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
