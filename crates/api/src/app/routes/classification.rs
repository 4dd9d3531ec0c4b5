use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn classify_abc(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::ClassifyRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection(e),
    };

    match services.classification.classify(
        &body.item_name,
        &body.category,
        body.annual_usage_rate,
        body.stock_turnover_rate,
    ) {
        Ok(classification) => {
            tracing::info!(
                item = %classification.item_name,
                abc_category = classification.abc_category.as_str(),
                "item classified"
            );
            Json(dto::ClassifyResponse::from(classification)).into_response()
        }
        Err(e) => {
            tracing::debug!(item = %body.item_name, error = %e, "classification rejected");
            errors::ai_error_to_response(e)
        }
    }
}
