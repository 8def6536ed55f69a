//! Axum route handler for the PDF export API.

use anyhow::Context;
use axum::{
    extract::Multipart,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::render::{render_deck, RenderContext, RenderError, SlideDeck};
use crate::routes::form::read_form;

/// POST /api/export-pdf
///
/// Multipart fields: `client_name`, `client_website`, `industry`, `qbr_content` (deck JSON).
/// Responds with the rendered PDF as an attachment.
pub async fn handle_export_pdf(multipart: Multipart) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    let client_name = form.require("client_name")?;
    let client_website = form.require("client_website")?;
    let industry = form.require("industry")?;
    let qbr_content = form.require("qbr_content")?;

    info!("Exporting PDF for client: {client_name}");

    let value: Value = serde_json::from_str(&qbr_content)
        .map_err(|e| AppError::InvalidDeck(format!("qbr_content is not valid JSON: {e}")))?;
    let deck = SlideDeck::from_value(&value).map_err(|e| match e {
        RenderError::NotAnObject => AppError::InvalidDeck(e.to_string()),
        other => AppError::Render(other),
    })?;

    let filename = export_filename(&client_name);
    let ctx = RenderContext::new(client_name, client_website, industry);

    let bytes = tokio::task::spawn_blocking(move || render_deck(&deck, &ctx))
        .await
        .context("PDF render task failed")??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Builds `QBR_<name>.pdf`, keeping only alphanumerics, spaces, `-` and `_` from the client
/// name and turning spaces into underscores.
pub fn export_filename(client_name: &str) -> String {
    let kept: String = client_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = kept.trim().replace(' ', "_");

    if safe.is_empty() {
        "QBR_Presentation.pdf".to_string()
    } else {
        format!("QBR_{safe}.pdf")
    }
}
