use axum::{middleware as axum_middleware, routing::get, Router, ServiceExt};
use serde_json::{json, Value};
use tower::Layer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = crate::config::config();
    tracing::info!(
        "Starting Clonchat API in {:?} mode, root domain {}",
        config.environment,
        config.platform.root_domain
    );

    // Schema setup is best-effort at boot: without a reachable database the
    // server still comes up and /health reports degraded.
    if let Err(e) = database::manager::DatabaseManager::run_migrations().await {
        tracing::warn!("Migrations not applied at startup: {}", e);
    }

    // The subdomain rewrite must wrap the router itself: it changes the
    // request URI, so it has to run before route matching happens.
    let app = axum_middleware::from_fn(middleware::subdomain_rewrite).layer(app());

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3001);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Clonchat API listening on http://{}", bind_addr);

    axum::serve(listener, ServiceExt::<axum::extract::Request>::into_make_service(app))
        .await
        .expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes())
        .merge(page_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::{appointment, auth, business, chat};

    Router::new()
        // Account lifecycle
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-verification", post(auth::resend_verification))
        // Business directory, anonymous side
        .route("/businesses/check-subdomain/:subdomain", get(business::check_subdomain))
        .route("/businesses/subdomain/:subdomain", get(business::get_by_subdomain))
        // Chatbot widget surface
        .route("/chatbot", get(business::chatbot_view))
        .route("/chat/:business_id/message", post(chat::process_message))
        .route("/appointments", post(appointment::create))
        // Login page, target of gate redirects
        .route("/login", get(handlers::pages::login))
}

fn protected_routes() -> Router {
    use axum::routing::{post, put};
    use handlers::protected::{appointment, auth, business, user};

    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/user/status", get(user::status))
        // Business management
        .route("/businesses", get(business::list).post(business::create))
        .route(
            "/businesses/:id",
            put(business::update).delete(business::delete),
        )
        // Appointment management
        .route("/appointments/:business_id", get(appointment::list))
        .route(
            "/appointments/:business_id/confirm",
            post(appointment::confirm),
        )
        .route(
            "/appointments/:business_id/cancel",
            post(appointment::cancel),
        )
        .layer(axum_middleware::from_fn(middleware::auth_middleware))
}

fn page_routes() -> Router {
    use handlers::pages;

    Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route("/onboarding", get(pages::onboarding))
        .route("/verify-email", get(pages::verify_email))
        .layer(axum_middleware::from_fn(middleware::onboarding_gate))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Clonchat API",
            "version": version,
            "description": "Multi-tenant chatbot platform API",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/* (public - registration, login, verification)",
                "me": "/auth/me (protected)",
                "businesses": "/businesses (protected CRUD, public subdomain lookups)",
                "appointments": "/appointments (public booking, protected lifecycle)",
                "chat": "/chat/:business_id/message (public)",
                "chatbot": "/chatbot?subdomain=slug (public, target of tenant rewrite)",
                "status": "/user/status (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
