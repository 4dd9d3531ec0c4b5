use axum::{http::StatusCode, response::IntoResponse, Json};

pub async fn home() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Hospital Inventory API is running",
    }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
