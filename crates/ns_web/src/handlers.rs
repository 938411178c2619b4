use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use ns_core::ComparativeReport;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::AppState;

pub const REPORT_FILENAME: &str = "final_summary.json";
pub const AUDIO_FILENAME: &str = "hindi_summary.mp3";

#[derive(Debug, Deserialize)]
pub struct CompanyQuery {
    pub company_name: String,
}

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Company Sentiment API" }))
}

pub async fn generate_summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<ComparativeReport>, ApiError> {
    let _running = state.generate_lock.lock().await;
    let report = state.manager.generate_report(&query.company_name).await?;
    Ok(Json(report))
}

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}

pub async fn download_json(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let document = state
        .manager
        .document()
        .await?
        .ok_or_else(|| ApiError::NotFound("no report has been generated yet".to_string()))?;
    Ok(attachment("application/json", REPORT_FILENAME, document))
}

pub async fn download_audio(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let audio = state
        .manager
        .audio()
        .await?
        .ok_or_else(|| ApiError::NotFound("no audio is available for the last report".to_string()))?;
    Ok(attachment("audio/mp3", AUDIO_FILENAME, audio))
}
