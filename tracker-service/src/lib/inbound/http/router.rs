use std::sync::Arc;
use std::time::Duration;

use auth::AccessTokenIssuer;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::confirm_email::confirm_email;
use super::handlers::forgot_password::forgot_password;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::middleware::authenticate as auth_middleware;
use crate::auth_domain::service::AuthService;
use crate::outbound::email::SmtpMailer;
use crate::outbound::repositories::PostgresConfirmationTokenStore;
use crate::outbound::repositories::PostgresRefreshTokenStore;
use crate::outbound::repositories::PostgresUserRepository;

pub type SharedAuthService = Arc<
    AuthService<
        PostgresUserRepository,
        PostgresConfirmationTokenStore,
        PostgresRefreshTokenStore,
        SmtpMailer,
    >,
>;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: SharedAuthService,
    pub access_tokens: Arc<AccessTokenIssuer>,
}

pub fn create_router(
    auth_service: SharedAuthService,
    access_tokens: Arc<AccessTokenIssuer>,
) -> Router {
    let state = AppState {
        auth_service,
        access_tokens,
    };

    let public_routes = Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/confirm", get(confirm_email))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/forgot-password", post(forgot_password))
        .route("/api/auth/reset-password", post(reset_password))
        .route("/api/auth/logout", post(logout));

    let protected_routes = Router::new()
        .route("/api/users/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
