//! Story builder: turns a [`SlideDeck`] into an ordered list of layout blocks.
//!
//! Nothing here measures text or knows about pages beyond explicit page breaks; the composer
//! in `document.rs` flows the blocks onto pages.

use super::deck::{DataTable, Metric, Slide, SlideContent, SlideDeck, SummaryItem};
use super::styles::{data_table_style, summary_table_style, StyleKind, TableStyle};
use super::RenderContext;

const INCH: f32 = 72.0;

/// Width shared equally by the columns of a custom table.
pub const CUSTOM_TABLE_WIDTH: f32 = 6.5 * INCH;

const METRIC_COLUMN_WIDTHS: [f32; 4] = [2.2 * INCH, 1.5 * INCH, 1.5 * INCH, 1.2 * INCH];
const SUMMARY_COLUMN_WIDTHS: [f32; 2] = [3.0 * INCH, 3.5 * INCH];

const METRIC_HEADERS: [&str; 4] = ["Metric", "Current Period", "Previous Period", "Change"];

pub const DOCUMENT_TITLE: &str = "Quarterly Business Review";
pub const METRICS_HEADING: &str = "Key Performance Indicators";
pub const SUMMARY_HEADING: &str = "Summary";
pub const NO_CONTENT_NOTICE: &str = "No slide content available";

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub text: String,
    pub style: StyleKind,
    pub bold: bool,
}

impl TableCell {
    fn new(text: impl Into<String>, style: StyleKind) -> Self {
        Self {
            text: text.into(),
            style,
            bold: false,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableBlock {
    pub column_widths: Vec<f32>,
    pub rows: Vec<Vec<TableCell>>,
    /// Leading rows drawn with the header background.
    pub header_rows: usize,
    pub style: TableStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        text: String,
        style: StyleKind,
        bullet: bool,
    },
    Spacer(f32),
    /// Kept on one page when it fits on a fresh page.
    Table(TableBlock),
    PageBreak,
}

impl Block {
    fn paragraph(text: impl Into<String>, style: StyleKind) -> Self {
        Block::Paragraph {
            text: text.into(),
            style,
            bullet: false,
        }
    }

    fn bullet(text: impl Into<String>) -> Self {
        Block::Paragraph {
            text: text.into(),
            style: StyleKind::Bullet,
            bullet: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Story {
    pub blocks: Vec<Block>,
    pub slide_count: usize,
}

pub fn build_story(deck: &SlideDeck, ctx: &RenderContext) -> Story {
    let mut blocks = title_block(ctx);

    for (index, (_, slide)) in deck.slides.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::PageBreak);
        }
        push_slide(&mut blocks, index + 1, slide);
    }

    if deck.slides.is_empty() {
        blocks.push(Block::paragraph(NO_CONTENT_NOTICE, StyleKind::Body));
    }

    Story {
        blocks,
        slide_count: deck.slides.len(),
    }
}

fn title_block(ctx: &RenderContext) -> Vec<Block> {
    let mut blocks = vec![
        Block::paragraph(DOCUMENT_TITLE, StyleKind::Title),
        Block::Spacer(0.3 * INCH),
    ];
    for (label, value) in [
        ("Client", &ctx.client_name),
        ("Website", &ctx.client_website),
        ("Industry", &ctx.industry),
    ] {
        if !value.trim().is_empty() {
            blocks.push(Block::paragraph(format!("{label}: {}", value.trim()), StyleKind::Body));
        }
    }
    blocks.push(Block::Spacer(0.5 * INCH));
    blocks
}

fn push_slide(blocks: &mut Vec<Block>, number: usize, slide: &Slide) {
    let title = slide
        .title
        .clone()
        .unwrap_or_else(|| format!("Slide {number}"));
    blocks.push(Block::paragraph(title, StyleKind::SlideTitle));
    blocks.push(Block::Spacer(0.2 * INCH));

    if !slide.metrics.is_empty() {
        push_section(blocks, METRICS_HEADING, metrics_table(&slide.metrics));
    }

    if !slide.summary.is_empty() {
        push_section(blocks, SUMMARY_HEADING, summary_table(&slide.summary));
    }

    for table in &slide.tables {
        let Some(block) = custom_table(table) else {
            continue;
        };
        if table.title.trim().is_empty() {
            blocks.push(Block::Table(block));
            blocks.push(Block::Spacer(0.2 * INCH));
        } else {
            push_section(blocks, &table.title, block);
        }
    }

    match &slide.content {
        SlideContent::Bullets(lines) => {
            blocks.extend(
                lines
                    .iter()
                    .map(|line| line.trim())
                    .filter(|line| !line.is_empty() && !line.contains('|'))
                    .map(Block::bullet),
            );
        }
        SlideContent::Paragraph(text) if !text.trim().is_empty() => {
            blocks.push(Block::paragraph(text.trim(), StyleKind::Body));
        }
        SlideContent::Paragraph(_) => {}
    }

    blocks.push(Block::Spacer(0.3 * INCH));
}

fn push_section(blocks: &mut Vec<Block>, heading: &str, table: TableBlock) {
    blocks.push(Block::paragraph(heading, StyleKind::Subtitle));
    blocks.push(Block::Spacer(0.1 * INCH));
    blocks.push(Block::Table(table));
    blocks.push(Block::Spacer(0.2 * INCH));
}

fn metrics_table(metrics: &[Metric]) -> TableBlock {
    let header = METRIC_HEADERS
        .iter()
        .map(|h| TableCell::new(*h, StyleKind::TableHeader))
        .collect();

    let body = metrics.iter().map(|m| {
        let (change, change_style) = classify_change(&m.change);
        vec![
            TableCell::new(m.name.as_str(), StyleKind::TableCell),
            TableCell::new(m.current.as_str(), StyleKind::TableCell),
            TableCell::new(m.previous.as_str(), StyleKind::TableCell),
            TableCell::new(change, change_style),
        ]
    });

    TableBlock {
        column_widths: METRIC_COLUMN_WIDTHS.to_vec(),
        rows: std::iter::once(header).chain(body).collect(),
        header_rows: 1,
        style: data_table_style(),
    }
}

fn summary_table(items: &[SummaryItem]) -> TableBlock {
    TableBlock {
        column_widths: SUMMARY_COLUMN_WIDTHS.to_vec(),
        rows: items
            .iter()
            .map(|item| {
                vec![
                    TableCell::new(item.label.as_str(), StyleKind::Body).bold(),
                    TableCell::new(item.value.as_str(), StyleKind::Body),
                ]
            })
            .collect(),
        header_rows: 0,
        style: summary_table_style(),
    }
}

/// Returns `None` for a table without rows. Ragged rows are padded with empty cells.
fn custom_table(table: &DataTable) -> Option<TableBlock> {
    if table.rows.is_empty() {
        return None;
    }

    let columns = table
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(table.headers.len()))
        .max()
        .unwrap_or(0)
        .max(1);

    let pad = |cells: &[String], style: StyleKind| -> Vec<TableCell> {
        (0..columns)
            .map(|i| TableCell::new(cells.get(i).map_or("", String::as_str), style))
            .collect()
    };

    let mut rows = Vec::with_capacity(table.rows.len() + 1);
    let header_rows = if table.headers.is_empty() {
        0
    } else {
        rows.push(pad(&table.headers, StyleKind::TableHeader));
        1
    };
    rows.extend(table.rows.iter().map(|r| pad(r, StyleKind::TableCell)));

    Some(TableBlock {
        column_widths: vec![CUSTOM_TABLE_WIDTH / columns as f32; columns],
        rows,
        header_rows,
        style: data_table_style(),
    })
}

/// Display text and style for a metric change value.
///
/// `%`, `+` and `Target:` are stripped before parsing the remainder as a number. Positive
/// values get a leading `+` unless one is present or the value is a target; negative values
/// use the warning style. Zero and unparsable values stay neutral.
pub fn classify_change(change: &str) -> (String, StyleKind) {
    let numeric = change
        .replace('%', "")
        .replace('+', "")
        .replace("Target:", "");

    match numeric.trim().parse::<f64>() {
        Ok(value) if value > 0.0 => {
            let text = if change.starts_with('+') || change.starts_with("Target:") {
                change.to_string()
            } else {
                format!("+{change}")
            };
            (text, StyleKind::PositiveMetric)
        }
        Ok(value) if value < 0.0 => (change.to_string(), StyleKind::WarningMetric),
        _ => (change.to_string(), StyleKind::TableCell),
    }
}
