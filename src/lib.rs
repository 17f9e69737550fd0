use std::{sync::Arc, time::Duration};

use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod jobs;
pub mod models;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod upstream;

use auth::TokenIssuer;
use config::Config;
use upstream::UpstreamApi;

/// Handles shared by every request. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub upstream: Arc<dyn UpstreamApi>,
    pub tokens: Arc<TokenIssuer>,
}

impl AppState {
    pub fn new(config: Config, db: DatabaseConnection, upstream: Arc<dyn UpstreamApi>) -> Self {
        let tokens = Arc::new(TokenIssuer::new(&config.jwt_secret, config.jwt_ttl));
        Self {
            config: Arc::new(config),
            db,
            upstream,
            tokens,
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JEB Incubator API",
        version = "0.1.0",
        description = "Startup catalogue mirrored from the JEB API, with accounts for members, startups and investors"
    ),
    paths(
        routes::system::root,
        routes::system::health,
        routes::startups::list_startups,
        routes::startups::get_startup,
        routes::startups::delete_startup,
        routes::startups::get_sectors,
        routes::startups::get_stats,
        routes::startups::sync_startups,
        routes::startups::sync_status,
        routes::auth::register_user,
        routes::auth::register_startup,
        routes::auth::register_investor,
        routes::auth::login,
        routes::auth::me,
        routes::auth::update_profile,
        routes::auth::list_users,
        routes::auth::update_user_role,
        routes::profiles::startup_profiles,
        routes::profiles::investor_profiles
    ),
    components(schemas(
        response::ErrorEnvelope,
        models::StartupResponse,
        models::FounderResponse,
        models::StartupPage,
        models::SectorCount,
        models::StartupStats,
        models::SyncReport,
        models::ConnectionStatus,
        models::Profile,
        models::UserRole,
        models::UserView,
        models::UserPage,
        models::AuthPayload
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "system", description = "Service information"),
        (name = "startups", description = "Startups mirrored from the JEB API"),
        (name = "auth", description = "Registration, login and account administration"),
        (name = "profiles", description = "Directory of startup and investor accounts")
    )
)]
pub struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let mut api_routes = Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .route("/startups", get(routes::startups::list_startups))
        .route("/startups/sectors", get(routes::startups::get_sectors))
        .route("/startups/stats", get(routes::startups::get_stats))
        .route("/startups/sync", post(routes::startups::sync_startups))
        .route("/startups/sync/status", get(routes::startups::sync_status))
        .route(
            "/startups/{id}",
            get(routes::startups::get_startup).delete(routes::startups::delete_startup),
        )
        .route("/auth/register/user", post(routes::auth::register_user))
        .route("/auth/register/startup", post(routes::auth::register_startup))
        .route("/auth/register/investor", post(routes::auth::register_investor))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route("/auth/profile", put(routes::auth::update_profile))
        .route("/auth/users", get(routes::auth::list_users))
        .route("/auth/users/{id}/role", put(routes::auth::update_user_role))
        .route("/auth/users/startups", get(routes::profiles::startup_profiles))
        .route("/auth/users/investors", get(routes::profiles::investor_profiles))
        .route("/profiles/startups", get(routes::profiles::startup_profiles))
        .route("/profiles/investors", get(routes::profiles::investor_profiles))
        // Aliases of the account routes above, kept for existing clients.
        .route(
            "/profiles/me",
            get(routes::auth::me).put(routes::auth::update_profile),
        )
        .route("/profiles/users", get(routes::auth::list_users));

    let per_minute = state.config.rate_limit_per_minute;
    if per_minute > 0 {
        // One token back every 60s / n, bursts up to n.
        let period = Duration::from_millis((60_000 / u64::from(per_minute)).max(1));
        match GovernorConfigBuilder::default()
            .key_extractor(SmartIpKeyExtractor)
            .period(period)
            .burst_size(per_minute)
            .finish()
        {
            Some(config) => {
                info!("Rate limiting enabled: {} requests per minute per client", per_minute);
                api_routes = api_routes.layer(GovernorLayer {
                    config: Arc::new(config),
                });
            }
            None => warn!("Invalid rate limit settings, rate limiting disabled"),
        }
    }

    let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    Router::new()
        .merge(api_routes.with_state(state))
        .merge(docs_router)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
