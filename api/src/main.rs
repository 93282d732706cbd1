//! Commerce API Server
//!
//! Multi-tenant storefront and back-office backend: catalog, cart and
//! checkout, orders, point-of-sale billing, staff attendance and payroll.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, patch, post, put},
    Json, Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresAttendanceRepository, PostgresBillRepository, PostgresCartRepository,
    PostgresOrderRepository, PostgresOrganizationRepository, PostgresProductRepository,
    PostgresUserRepository,
};
use app::{
    AttendanceService, AuthService, BillingService, CartService, CatalogService, OrderService,
    OrganizationService, PayrollService, UserService,
};
use auth::JwtKeys;
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<PostgresUserRepository, PostgresOrganizationRepository>>,
    pub organization_service: Arc<OrganizationService<PostgresOrganizationRepository>>,
    pub user_service: Arc<UserService<PostgresUserRepository>>,
    pub catalog_service: Arc<CatalogService<PostgresProductRepository>>,
    pub cart_service: Arc<
        CartService<
            PostgresCartRepository,
            PostgresProductRepository,
            PostgresOrderRepository,
            PostgresOrganizationRepository,
        >,
    >,
    pub order_service: Arc<OrderService<PostgresOrderRepository>>,
    pub attendance_service:
        Arc<AttendanceService<PostgresAttendanceRepository, PostgresUserRepository>>,
    pub payroll_service: Arc<PayrollService<PostgresUserRepository, PostgresAttendanceRepository>>,
    pub billing_service: Arc<BillingService<PostgresBillRepository, PostgresOrganizationRepository>>,
    pub jwt: Arc<JwtKeys>,
    pub config: Config,
}

impl AppState {
    /// Wire adapters and services over one connection pool
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let org_repo = Arc::new(PostgresOrganizationRepository::new(db.clone()));
        let user_repo = Arc::new(PostgresUserRepository::new(db.clone()));
        let product_repo = Arc::new(PostgresProductRepository::new(db.clone()));
        let cart_repo = Arc::new(PostgresCartRepository::new(db.clone()));
        let order_repo = Arc::new(PostgresOrderRepository::new(db.clone()));
        let attendance_repo = Arc::new(PostgresAttendanceRepository::new(db.clone()));
        let bill_repo = Arc::new(PostgresBillRepository::new(db));

        let jwt = Arc::new(JwtKeys::new(&config.jwt_secret, config.jwt_expiry_hours));

        Self {
            auth_service: Arc::new(AuthService::new(
                user_repo.clone(),
                org_repo.clone(),
                jwt.clone(),
            )),
            organization_service: Arc::new(OrganizationService::new(org_repo.clone())),
            user_service: Arc::new(UserService::new(user_repo.clone())),
            catalog_service: Arc::new(CatalogService::new(product_repo.clone())),
            cart_service: Arc::new(CartService::new(
                cart_repo,
                product_repo,
                order_repo.clone(),
                org_repo.clone(),
            )),
            order_service: Arc::new(OrderService::new(order_repo)),
            attendance_service: Arc::new(AttendanceService::new(
                attendance_repo.clone(),
                user_repo.clone(),
            )),
            payroll_service: Arc::new(PayrollService::new(
                user_repo,
                attendance_repo,
                config.deduction_policy,
            )),
            billing_service: Arc::new(BillingService::new(bill_repo, org_repo)),
            jwt,
            config,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Keyed on the socket peer address; needs connect info from `serve`
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(state.config.login_rate_per_second)
            .burst_size(state.config.login_rate_burst)
            .finish()
            .context("Invalid login rate limit configuration")?,
    );

    // Rate-limited routes (credentials)
    let rate_limited_routes = Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .layer(GovernorLayer {
            config: governor_config,
        });

    let protected_routes = Router::new()
        // Session
        .route("/auth/me", get(handlers::me))
        .route("/auth/change-password", post(handlers::change_password))
        // Organizations
        .route(
            "/organizations",
            get(handlers::list_organizations).post(handlers::create_organization),
        )
        .route(
            "/organizations/:id",
            get(handlers::get_organization).patch(handlers::update_organization),
        )
        // Users
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/:id",
            get(handlers::get_user)
                .patch(handlers::update_user)
                .delete(handlers::deactivate_user),
        )
        // Catalog
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/:id",
            get(handlers::get_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/products/:id/stock", post(handlers::adjust_stock))
        // Cart
        .route(
            "/cart",
            get(handlers::get_cart).delete(handlers::clear_cart),
        )
        .route("/cart/items", post(handlers::add_to_cart))
        .route(
            "/cart/items/:product_id",
            put(handlers::set_cart_quantity).delete(handlers::remove_from_cart),
        )
        .route("/cart/checkout", post(handlers::checkout))
        // Orders
        .route("/orders", get(handlers::list_my_orders))
        .route("/orders/organization", get(handlers::list_org_orders))
        .route("/orders/:id", get(handlers::get_order))
        .route("/orders/:id/cancel", post(handlers::cancel_order))
        .route("/orders/:id/status", patch(handlers::update_order_status))
        // Attendance
        .route(
            "/attendance",
            get(handlers::list_attendance).post(handlers::mark_attendance),
        )
        .route("/attendance/bulk", post(handlers::bulk_mark_attendance))
        .route(
            "/attendance/:id",
            patch(handlers::update_attendance).delete(handlers::delete_attendance),
        )
        // Payroll
        .route("/salary/report", get(handlers::salary_report))
        .route("/salary/:user_id", get(handlers::get_salary))
        // Billing
        .route(
            "/bills",
            get(handlers::list_bills).post(handlers::create_bill),
        )
        .route("/bills/summary", get(handlers::bill_summary))
        .route("/bills/:id", get(handlers::get_bill))
        .route("/bills/:id/payments", post(handlers::record_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let app = Router::new()
        // Health check (no auth)
        .route("/health", get(health))
        // Public storefront
        .route(
            "/storefront/:org_id/products",
            get(handlers::storefront_products),
        )
        .merge(rate_limited_routes)
        .merge(protected_routes)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state);

    Ok(app)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,commerce_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Commerce API...");

    // Load configuration
    let config = Config::from_env()?;

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    tracing::info!(policy = %config.deduction_policy, "Salary deduction policy");
    let port = config.port;
    let app = build_router(AppState::new(db, config))?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
