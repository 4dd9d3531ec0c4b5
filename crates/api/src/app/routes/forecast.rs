use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockpulse_core::ItemId;
use stockpulse_infra::ItemRef;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Forecast every item that has stock observations.
pub async fn forecast_demand(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.pipeline.forecast_all().await {
        Ok(results) => Json(dto::forecast_map(results)).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

/// Forecast one item, by id or title, from its observations or an explicit history.
///
/// `item_id` takes precedence when both identifiers are given.
pub async fn forecast(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ForecastRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    let target = match (body.item_id, body.item_name) {
        (Some(raw), _) => match raw.parse::<ItemId>() {
            Ok(id) => ItemRef::Id(id),
            Err(e) => return errors::domain_error_to_response(e),
        },
        (None, Some(name)) => ItemRef::Title(name),
        (None, None) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "either item_id or item_name is required",
            );
        }
    };

    let result = match body.history {
        Some(history) => {
            let item = match services.pipeline.resolve(target).await {
                Ok(item) => item,
                Err(e) => return errors::pipeline_error_to_response(e),
            };
            let aggregates = match dto::history_to_aggregates(item.id, history) {
                Ok(a) => a,
                Err(e) => return errors::domain_error_to_response(e),
            };
            services.pipeline.forecast_with_history(&item, aggregates).await
        }
        None => services.pipeline.forecast_item(target).await,
    };

    match result {
        Ok(result) => {
            tracing::info!(
                item = %result.item_name,
                history_months = result.previous_demand.len(),
                horizon = result.forecast.len(),
                "demand forecast served"
            );
            Json(dto::ForecastResponse::from(result)).into_response()
        }
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
