use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::db;
use crate::error::CaixaError;
use crate::importer;
use crate::models::StoredRecord;
use crate::reports::{self, CashFlow, ExpenseDistribution, ExpenseTypeShare, Indicators, MonthlyTrends};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub mensagem: String,
    pub registros_importados: usize,
}

/// `POST /api/upload-csv-vectorstore/` with a multipart field named `file`.
pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        upload = Some((filename, bytes));
        break;
    }

    let Some((filename, bytes)) = upload else {
        return Err(ApiError::BadRequest("Nenhum arquivo enviado no campo 'file'.".to_string()));
    };
    tracing::info!(filename = %filename, bytes = bytes.len(), "upload received");

    let result = state
        .with_conn(move |conn| importer::import_bytes(conn, &filename, &bytes))
        .await?;

    Ok(Json(UploadResponse {
        mensagem: "Arquivo importado com sucesso.".to_string(),
        registros_importados: result.imported,
    }))
}

/// `GET /api/financial-records/`, newest upload first.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<StoredRecord>>, ApiError> {
    let records = state.with_conn(db::all_records).await?;
    Ok(Json(records))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub removidos: usize,
}

/// `DELETE /api/financial-records/`
pub async fn delete_records(State(state): State<AppState>) -> Result<Json<DeleteResponse>, ApiError> {
    let removidos = state.with_conn(db::delete_all_records).await?;
    tracing::info!(records = removidos, "records deleted");
    Ok(Json(DeleteResponse { removidos }))
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

pub async fn indicators(State(state): State<AppState>) -> Result<Json<Indicators>, ApiError> {
    let records = state.with_conn(db::load_records).await?;
    Ok(Json(reports::indicators(&records)))
}

pub async fn trends(State(state): State<AppState>) -> Result<Json<MonthlyTrends>, ApiError> {
    let records = state.with_conn(db::load_records).await?;
    Ok(Json(reports::monthly_trends(&records)))
}

pub async fn expense_distribution(State(state): State<AppState>) -> Result<Json<ExpenseDistribution>, ApiError> {
    let records = state.with_conn(db::load_records).await?;
    Ok(Json(reports::expense_distribution(&records)))
}

pub async fn expense_type_percentage(State(state): State<AppState>) -> Result<Json<ExpenseTypeShare>, ApiError> {
    let records = state.with_conn(db::load_records).await?;
    Ok(Json(reports::expense_type_percentage(&records)))
}

pub async fn cash_flow(State(state): State<AppState>) -> Result<Json<CashFlow>, ApiError> {
    let records = state.with_conn(db::load_records).await?;
    Ok(Json(reports::cash_flow(&records)))
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub resposta: String,
    pub conversation_id: String,
}

/// `POST /api/financial-agent/`
pub async fn financial_agent(
    State(state): State<AppState>,
    Json(req): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let question = req.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(CaixaError::EmptyQuestion.into());
    }

    let assistant = state.assistant.clone();
    let answer = state
        .with_conn(move |conn| {
            assistant.ask(
                conn,
                &question,
                req.conversation_id.as_deref(),
                req.user_id.as_deref(),
            )
        })
        .await?;

    Ok(Json(AgentResponse {
        resposta: answer.text,
        conversation_id: answer.conversation_id,
    }))
}
