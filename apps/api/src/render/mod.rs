//! PDF renderer for slide decks.
//!
//! `deck` reads the loosely typed model JSON, `story` lays the deck out as an ordered list of
//! blocks, and `document` flows those blocks onto branded Letter pages with printpdf.
//! Rendering is synchronous and CPU-bound; handlers call [`render_deck`] via `spawn_blocking`.

pub mod deck;
pub mod document;
pub mod font_metrics;
pub mod handlers;
pub mod story;
pub mod styles;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::info;

pub use deck::SlideDeck;
pub use document::BrandedPageTemplate;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("slide deck must be a JSON object")]
    NotAnObject,

    #[error("slide '{key}' is invalid: {reason}")]
    InvalidSlide { key: String, reason: String },

    #[error("PDF backend error: {0}")]
    Pdf(String),
}

/// Request-level values printed in the title block and page header.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub client_name: String,
    pub client_website: String,
    pub industry: String,
    pub generated_on: NaiveDate,
}

impl RenderContext {
    /// Context dated today in local time.
    pub fn new(
        client_name: impl Into<String>,
        client_website: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            client_name: client_name.into(),
            client_website: client_website.into(),
            industry: industry.into(),
            generated_on: Local::now().date_naive(),
        }
    }
}

/// Renders `deck` into an in-memory PDF.
pub fn render_deck(deck: &SlideDeck, ctx: &RenderContext) -> Result<Vec<u8>, RenderError> {
    info!("Generating PDF for client: {}", ctx.client_name);

    let story = story::build_story(deck, ctx);
    let template = BrandedPageTemplate::new(ctx);
    let (bytes, pages) = document::compose(&story, &template)?;

    info!(
        "PDF generated: {} slides, {} pages, {} bytes",
        story.slide_count,
        pages,
        bytes.len()
    );
    Ok(bytes)
}
