use axum::{
    routing::{get, post},
    Router,
};

pub mod classification;
pub mod demand;
pub mod forecast;
pub mod system;

/// Router for every endpoint (services are injected as an `Extension` by `build_app`).
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::home))
        .route("/health", get(system::health))
        .route("/classify_abc", post(classification::classify_abc))
        .route("/monthly_top_demands", get(demand::monthly_top_demands))
        .route("/items/:id/monthly", get(demand::item_monthly))
        .route("/forecast_demand", get(forecast::forecast_demand))
        .route("/forecast", post(forecast::forecast))
}
