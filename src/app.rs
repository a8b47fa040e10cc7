use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::entity::MonotonicClock;
use crate::models::{Customer, Product};
use crate::rest::resource_router;
use crate::store::{EntityStore, InMemoryStore};

/// Builds the application router: service root, health probe and one CRUD
/// resource per entity type. Each call wires fresh stores, which is what
/// black-box tests rely on for isolation.
pub fn app() -> Router {
    let config = config::config();
    let clock = Arc::new(MonotonicClock::new());

    let customers: Arc<dyn EntityStore<Customer>> = Arc::new(InMemoryStore::new());
    let products: Arc<dyn EntityStore<Product>> = Arc::new(InMemoryStore::new());

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/customers", resource_router("/customers", customers, Arc::clone(&clock)))
        .nest("/products", resource_router("/products", products, clock));

    if config.api.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "storefront-api",
        "version": env!("CARGO_PKG_VERSION"),
        "resources": {
            "customers": "/customers",
            "products": "/products",
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
