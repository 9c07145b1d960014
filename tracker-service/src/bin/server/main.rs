use std::sync::Arc;

use auth::AccessTokenIssuer;
use sqlx::postgres::PgPoolOptions;
use tracker_service::config::Config;
use tracker_service::domain::auth::service::AuthService;
use tracker_service::inbound::http::router::create_router;
use tracker_service::outbound::email::SmtpMailer;
use tracker_service::outbound::repositories::PostgresConfirmationTokenStore;
use tracker_service::outbound::repositories::PostgresRefreshTokenStore;
use tracker_service::outbound::repositories::PostgresUserRepository;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "tracker-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        database_url = %config.database.url,
        http_port = config.server.http_port,
        email_from = %config.email.from_address,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let access_tokens = Arc::new(AccessTokenIssuer::new(
        config.jwt.secret.as_bytes(),
        config.jwt.access_token_minutes,
    ));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let confirmation_token_store = Arc::new(PostgresConfirmationTokenStore::new(pg_pool.clone()));
    let refresh_token_store = Arc::new(PostgresRefreshTokenStore::new(pg_pool));
    let mailer = Arc::new(SmtpMailer::new(&config.email)?);

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        confirmation_token_store,
        refresh_token_store,
        mailer,
        Arc::clone(&access_tokens),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, access_tokens);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
