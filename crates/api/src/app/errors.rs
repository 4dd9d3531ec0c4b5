use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockpulse_ai::AiError;
use stockpulse_core::DomainError;
use stockpulse_infra::PipelineError;

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn ai_error_to_response(err: AiError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        AiError::ItemNotFound(_) => json_error(StatusCode::BAD_REQUEST, "item_not_found", message),
        AiError::ModelNotFound(_) => json_error(StatusCode::BAD_REQUEST, "model_not_found", message),
        AiError::InsufficientData(_) => json_error(StatusCode::BAD_REQUEST, "insufficient_data", message),
        AiError::InvalidInput(_) => json_error(StatusCode::BAD_REQUEST, "invalid_input", message),
        AiError::InferenceFailed(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "inference_failed", message),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::Validation(_) | DomainError::Parse(_) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", message)
        }
    }
}

pub fn pipeline_error_to_response(err: PipelineError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        PipelineError::NotFound(_) => json_error(StatusCode::BAD_REQUEST, "item_not_found", message),
        PipelineError::InsufficientData(_) => json_error(StatusCode::BAD_REQUEST, "insufficient_data", message),
        PipelineError::Ai { error, .. } => {
            let (status, code) = match error {
                AiError::InferenceFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "inference_failed"),
                AiError::ItemNotFound(_) => (StatusCode::BAD_REQUEST, "item_not_found"),
                AiError::ModelNotFound(_) => (StatusCode::BAD_REQUEST, "model_not_found"),
                AiError::InsufficientData(_) => (StatusCode::BAD_REQUEST, "insufficient_data"),
                AiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            };
            json_error(status, code, message)
        }
        PipelineError::Upstream { .. } => json_error(StatusCode::BAD_GATEWAY, "upstream_error", message),
        PipelineError::InvalidData { .. } => json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid_data", message),
        PipelineError::Timeout { .. } => json_error(StatusCode::GATEWAY_TIMEOUT, "timeout", message),
        PipelineError::Join(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "worker_error", message),
    }
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn query_rejection(rejection: QueryRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_query", rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockpulse_infra::SourceError;

    fn code_of(response: axum::response::Response) -> StatusCode {
        response.status()
    }

    #[test]
    fn domain_errors_are_client_errors() {
        for err in [
            DomainError::invalid_id("ItemId: bad"),
            DomainError::validation("negative quantity"),
            DomainError::parse("month"),
        ] {
            assert_eq!(code_of(domain_error_to_response(err)), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn pipeline_errors_map_by_origin() {
        let upstream = PipelineError::Upstream {
            context: "catalog".to_string(),
            error: SourceError::Unavailable("offline".to_string()),
        };
        assert_eq!(code_of(pipeline_error_to_response(upstream)), StatusCode::BAD_GATEWAY);
        assert_eq!(
            code_of(pipeline_error_to_response(PipelineError::NotFound("item \"X\"".to_string()))),
            StatusCode::BAD_REQUEST
        );
        let timeout = PipelineError::Timeout { item: "Gloves".to_string(), timeout_ms: 100 };
        assert_eq!(code_of(pipeline_error_to_response(timeout)), StatusCode::GATEWAY_TIMEOUT);
    }
}
