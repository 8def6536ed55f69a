//! Axum route handler for the Generate API.

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::errors::AppError;
use crate::extraction::{aggregate, extract_all, AggregateMetrics, ExtractedDataset, UploadedFile};
use crate::generation::number_format::format_deck_numbers;
use crate::generation::prompts::{compose_prompt, PromptInput};
use crate::generation::sanitizer::parse_deck_json;
use crate::generation::summary::build_data_summary;
use crate::llm_client::{retrieve_content, EMPTY_JSON};
use crate::routes::form::read_form;
use crate::state::AppState;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct GenerateRequest {
    pub client_name: String,
    pub client_website: String,
    pub industry: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub qbr_content: String,
    #[serde(flatten)]
    pub metrics: AggregateMetrics,
}

/// Every Generate result carries the aggregate metrics, including failures.
#[derive(Debug)]
pub enum GenerateOutcome {
    Success {
        qbr_content: String,
        metrics: AggregateMetrics,
    },
    /// The model output could not be decoded as a JSON object.
    DecodeFailed { metrics: AggregateMetrics },
    Failed { metrics: AggregateMetrics },
}

impl IntoResponse for GenerateOutcome {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GenerateOutcome::Success {
                qbr_content,
                metrics,
            } => (
                StatusCode::OK,
                GenerateResponse {
                    error: None,
                    qbr_content,
                    metrics,
                },
            ),
            GenerateOutcome::DecodeFailed { metrics } => (
                StatusCode::BAD_GATEWAY,
                GenerateResponse {
                    error: Some("JSONDecodeError"),
                    qbr_content: EMPTY_JSON.to_string(),
                    metrics,
                },
            ),
            GenerateOutcome::Failed { metrics } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                GenerateResponse {
                    error: Some("Internal Server Error"),
                    qbr_content: EMPTY_JSON.to_string(),
                    metrics,
                },
            ),
        };

        (status, [(header::CACHE_CONTROL, NO_CACHE)], Json(body)).into_response()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate
///
/// Multipart fields: `client_name`, `client_website`, `industry`, and zero or more
/// `customer_data_files` parts (CSV or PDF).
pub async fn handle_generate(State(state): State<AppState>, multipart: Multipart) -> Response {
    match read_generate_request(multipart).await {
        Ok(request) => generate_deck(&state, request).await.into_response(),
        Err(e) => ([(header::CACHE_CONTROL, NO_CACHE)], e).into_response(),
    }
}

async fn read_generate_request(multipart: Multipart) -> Result<GenerateRequest, AppError> {
    let mut form = read_form(multipart).await?;
    Ok(GenerateRequest {
        client_name: form.require("client_name")?,
        client_website: form.require("client_website")?,
        industry: form.require("industry")?,
        files: std::mem::take(&mut form.files),
    })
}

/// Runs extraction, aggregation, prompting, sanitizing and number formatting for one request.
pub async fn generate_deck(state: &AppState, request: GenerateRequest) -> GenerateOutcome {
    info!(
        "Generating QBR for {} ({}), industry: {}, {} files",
        request.client_name,
        request.client_website,
        request.industry,
        request.files.len()
    );

    let files = request.files;
    let datasets = match tokio::task::spawn_blocking(move || extract_all(&files)).await {
        Ok(datasets) => datasets,
        Err(e) => {
            error!("File extraction task failed: {e}");
            return GenerateOutcome::Failed {
                metrics: AggregateMetrics::default(),
            };
        }
    };

    let metrics = aggregate(datasets.iter().flat_map(ExtractedDataset::rows));
    info!(
        "Aggregated metrics: revenue={:.2}, purchases={}, aov={:.2}",
        metrics.total_revenue, metrics.total_purchases, metrics.average_order_value
    );

    let data_summary = build_data_summary(&datasets, &metrics);
    let prompt = compose_prompt(&PromptInput {
        client_name: &request.client_name,
        client_website: &request.client_website,
        industry: &request.industry,
        data_summary: &data_summary,
    });

    info!("Requesting deck from model {}", state.config.gemini_model);
    let raw = retrieve_content(state.generator.as_ref(), &prompt).await;

    let deck = match parse_deck_json(&raw) {
        Ok(deck) => deck,
        Err(e) => {
            error!("Failed to decode model output: {e}. Raw output: {raw}");
            return GenerateOutcome::DecodeFailed { metrics };
        }
    };

    GenerateOutcome::Success {
        qbr_content: format_deck_numbers(&Value::Object(deck).to_string()),
        metrics,
    }
}
