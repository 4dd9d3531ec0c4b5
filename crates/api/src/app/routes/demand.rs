use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockpulse_core::ItemId;
use stockpulse_infra::{ItemRef, PipelineError};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Latest-month demand of the top `k` items, highest first.
pub async fn monthly_top_demands(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::TopDemandsQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::query_rejection(e),
    };
    let k = query.k.unwrap_or(services.top_demands_default);

    match services.pipeline.top_demands(k).await {
        Ok(ranked) => Json(dto::RankedDemands(ranked)).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}

pub async fn item_monthly(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let item_id: ItemId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let item = match services.pipeline.resolve(ItemRef::Id(item_id)).await {
        Ok(item) => item,
        Err(PipelineError::NotFound(msg)) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", msg),
        Err(e) => return errors::pipeline_error_to_response(e),
    };

    match services.pipeline.monthly_history(&item).await {
        Ok(history) => Json(dto::ItemMonthlyResponse::new(item, history)).into_response(),
        Err(e) => errors::pipeline_error_to_response(e),
    }
}
