use crate::{
    handlers::{benefits, card, dependants, health, provider, wallet},
    server::CarelinkServer,
};
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Create health check routes
pub fn health_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/version", get(health::version_info))
}

/// Create benefit routes (eligibility, orders, requests)
pub fn benefit_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/benefits/eligibility", get(benefits::get_eligibility))
        .route("/benefits/orders", get(benefits::list_monthly_orders))
        .route("/benefits/requests", post(benefits::create_benefit_request))
        .route("/benefits/requests", get(benefits::list_my_requests))
        .route("/benefits/sponsored", get(benefits::list_sponsored_requests))
}

/// Create dependant management routes
pub fn dependant_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/dependants", get(dependants::list_dependants))
        .route("/dependants", post(dependants::add_dependant))
        .route("/dependants/status", get(dependants::dependant_status))
        .route("/dependants/:dependant_id", delete(dependants::remove_dependant))
}

/// Create wallet routes
pub fn wallet_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/wallet/balance", get(wallet::get_balance))
        .route("/wallet/transactions", get(wallet::list_transactions))
        .route("/wallet/top-up", post(wallet::top_up))
}

/// Create loyalty card routes
pub fn card_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/card", get(card::get_card))
        .route("/card", post(card::request_card))
}

/// Create healthcare-provider routes
pub fn provider_routes() -> Router<CarelinkServer> {
    Router::new()
        .route("/provider/requests", get(provider::list_requests))
        .route("/provider/requests/:request_id", get(provider::get_request))
        .route(
            "/provider/requests/:request_id/complete",
            put(provider::complete_request),
        )
        .route(
            "/provider/customers/:id_or_email",
            get(provider::lookup_customer),
        )
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<CarelinkServer> {
    Router::new()
        .merge(benefit_routes())
        .merge(dependant_routes())
        .merge(wallet_routes())
        .merge(card_routes())
        .merge(provider_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<CarelinkServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API v1 routes (authentication required)
        .nest("/api/v1", api_v1_routes())
}
