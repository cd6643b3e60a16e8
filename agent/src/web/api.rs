//! REST API handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::state::{AppState, SERVICE_NAME};
use crate::db::Row;
use crate::error::AgentError;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

impl From<AgentError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: AgentError) -> Self {
        if e.is_client_error() {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(format!(
                    "Error processing question: {}",
                    e
                ))),
            )
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

/// Ask question request
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    pub question: String,
}

/// Ask question response
#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub sql_query: String,
    pub rows: Vec<Row>,
    pub row_count: usize,
}

/// Generate SQL for a question, run it, and return the rows
pub async fn ask_question(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let answer = state.agent.execute_question(&req.question).await?;

    Ok(Json(QuestionResponse {
        question: req.question,
        sql_query: answer.sql_query,
        row_count: answer.result.row_count,
        rows: answer.result.rows,
    }))
}
