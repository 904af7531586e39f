mod availability;
mod config;
mod db;
mod error;
mod fulfillment;
mod models;
mod notifications;
mod orders;
mod payments;

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use availability::{AvailabilityEvaluator, RuleStore};
use config::AppConfig;
use error::ApiError;
use fulfillment::{RoutingTable, SystemUploader};
use models::{Branch, Product};
use notifications::EmailClient;
use orders::{BranchRepository, OrderService, OrdersRepository, ProductRepository};
use payments::PaymentClient;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_branches,
        get_branch_by_id,
        get_products,
    ),
    components(
        schemas(Branch, Product)
    ),
    tags(
        (name = "reference", description = "Branch and catalog reference data")
    ),
    info(
        title = "Bakery Storefront API",
        version = "1.0.0",
        description = "Order availability, checkout, and fulfillment routing for the bakery chain"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub rule_store: RuleStore,
    pub availability: AvailabilityEvaluator,
    pub order_service: OrderService,
}

/// Handler for GET /api/branches
/// Lists all branches for the storefront's branch picker
#[utoipa::path(
    get,
    path = "/api/branches",
    responses(
        (status = 200, description = "List of all branches", body = Vec<Branch>),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "reference"
)]
async fn get_all_branches(State(state): State<AppState>) -> Result<Json<Vec<Branch>>, ApiError> {
    tracing::debug!("Fetching all branches");

    let branches = sqlx::query_as::<_, Branch>(
        "SELECT id, name, address, connected_stripe_account FROM branches ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(branches))
}

/// Handler for GET /api/branches/:id
#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    params(
        ("id" = String, Path, description = "Branch ID")
    ),
    responses(
        (status = 200, description = "Branch found", body = Branch),
        (status = 404, description = "Branch not found", body = String, example = json!({"error": "Branch with id 44 not found"})),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "reference"
)]
async fn get_branch_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Branch>, ApiError> {
    tracing::debug!("Fetching branch with id: {}", id);

    let branch = sqlx::query_as::<_, Branch>(
        "SELECT id, name, address, connected_stripe_account FROM branches WHERE id = $1",
    )
    .bind(&id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::NotFound {
        resource: "Branch".to_string(),
        id,
    })?;

    Ok(Json(branch))
}

/// Handler for GET /api/products
/// Lists the active catalog for the storefront
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List of active products", body = Vec<Product>),
        (status = 500, description = "Internal server error", body = String, example = json!({"error": "Database error"}))
    ),
    tag = "reference"
)]
async fn get_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    tracing::debug!("Fetching product catalog");

    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, description, category, bakery_system_id, special_system_ids, \
         stripe_price_id, archived FROM products WHERE NOT archived ORDER BY name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(products))
}

/// Build the application state from configuration and a connected pool
fn build_state(db: PgPool, config: AppConfig) -> AppState {
    let routing = Arc::new(match config.routing_table_path.as_deref() {
        Some(path) => RoutingTable::from_file(path).expect("Failed to load routing table"),
        None => RoutingTable::default(),
    });

    let rule_store = RuleStore::new(db.clone());
    let availability = AvailabilityEvaluator::new(rule_store.clone());

    let payments = PaymentClient::new(config.stripe_secret_key.clone(), config.http_timeout);
    let uploader = SystemUploader::new(config.pos_endpoint.clone(), config.http_timeout);
    let email = EmailClient::new(
        config.email_api_key.clone(),
        config.email_from.clone(),
        config.http_timeout,
    );

    let order_service = OrderService::new(
        OrdersRepository::new(db.clone()),
        BranchRepository::new(db.clone()),
        ProductRepository::new(db.clone()),
        availability.clone(),
        routing,
        payments,
        uploader,
        email,
        config.checkout_success_url.clone(),
        config.checkout_cancel_url.clone(),
        config.local_offset(),
    );

    AppState {
        db,
        config: Arc::new(config),
        rule_store,
        availability,
        order_service,
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Reference data
        .route("/api/branches", get(get_all_branches))
        .route("/api/branches/:id", get(get_branch_by_id))
        .route("/api/products", get(get_products))
        // Checkout and payment confirmation
        .route("/api/orders/checkout", post(orders::handlers::checkout_handler))
        .route("/api/orders", get(orders::handlers::list_orders_handler))
        .route("/api/webhook", post(orders::handlers::webhook_handler))
        // Availability rule administration and pre-checks
        .route(
            "/api/availability/rules",
            post(availability::handlers::create_rule_handler)
                .get(availability::handlers::list_rules_handler),
        )
        .route(
            "/api/availability/rules/:rule_id",
            delete(availability::handlers::delete_rule_handler),
        )
        .route(
            "/api/availability/check",
            get(availability::handlers::check_item_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Bakery API - Starting...");

    let app_config = AppConfig::from_env().expect("Invalid configuration");

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&app_config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let addr = format!("{}:{}", app_config.host, app_config.port);
    let state = build_state(db_pool, app_config);
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Bakery API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
