//! Page composer: flows story blocks onto US Letter pages with printpdf.
//!
//! # Page geometry (points, origin bottom-left)
//! - Header band: the top 54pt, full width, drawn by the page decorator.
//! - Content frame: x 54..558, y 72..702.
//! - Footer: blue rule at y 50.4, page label centered at y 36.
//!
//! The decorator runs when a page is opened, before any block is drawn on it, so page
//! furniture never depends on slide content. Tables move to a fresh page when they do not fit
//! in the remaining space but would fit on an empty page; taller tables break between rows.

use std::io::BufWriter;

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point, Pt, Rect,
};
use tracing::debug;

use super::font_metrics::{get_metrics, pdf_safe_text};
use super::story::{Block, Story, TableBlock, DOCUMENT_TITLE};
use super::styles::{palette, text_style, Align, BrandColor, StyleKind, TextStyle};
use super::{RenderContext, RenderError};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 54.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const HEADER_HEIGHT: f32 = 54.0;
pub const CONTENT_TOP: f32 = PAGE_HEIGHT - HEADER_HEIGHT - 36.0;
pub const CONTENT_BOTTOM: f32 = 72.0;

const FOOTER_RULE_Y: f32 = 50.4;
const FOOTER_TEXT_Y: f32 = 36.0;
const BULLET_SIZE: f32 = 4.0;
const LAYER_NAME: &str = "Layer 1";

fn mm(pt: f32) -> Mm {
    Mm::from(Pt(pt))
}

fn pdf_err<E: std::fmt::Debug>(err: E) -> RenderError {
    RenderError::Pdf(format!("{err:?}"))
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.regular
        }
    }
}

/// Drawing surface for one page. Coordinates are points from the bottom-left corner.
pub struct Canvas<'a> {
    layer: &'a PdfLayerReference,
    fonts: &'a Fonts,
}

impl Canvas<'_> {
    pub fn fill_rect(&self, x: f32, y: f32, width: f32, height: f32, color: BrandColor) {
        self.layer.set_fill_color(color.to_pdf());
        self.layer.add_rect(
            Rect::new(mm(x), mm(y), mm(x + width), mm(y + height)).with_mode(PaintMode::Fill),
        );
    }

    pub fn stroke_rect(
        &self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: BrandColor,
        line_width: f32,
    ) {
        self.layer.set_outline_color(color.to_pdf());
        self.layer.set_outline_thickness(line_width);
        self.layer.add_rect(
            Rect::new(mm(x), mm(y), mm(x + width), mm(y + height)).with_mode(PaintMode::Stroke),
        );
    }

    pub fn hline(&self, x1: f32, x2: f32, y: f32, color: BrandColor, line_width: f32) {
        self.layer.set_outline_color(color.to_pdf());
        self.layer.set_outline_thickness(line_width);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(mm(x1), mm(y)), false),
                (Point::new(mm(x2), mm(y)), false),
            ],
            is_closed: false,
        });
    }

    /// Draws one pre-wrapped line aligned inside `left..left + width`.
    pub fn text_line(
        &self,
        text: &str,
        left: f32,
        width: f32,
        baseline: f32,
        style: &TextStyle,
        bold: bool,
    ) {
        let text_width = get_metrics(bold).width_pt(text, style.font_size);
        let x = match style.align {
            Align::Left => left,
            Align::Center => left + (width - text_width) / 2.0,
            Align::Right => left + width - text_width,
        };
        self.layer.set_fill_color(style.color.to_pdf());
        self.layer
            .use_text(text, style.font_size, mm(x), mm(baseline), self.fonts.get(bold));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page decoration
// ────────────────────────────────────────────────────────────────────────────

/// Hook invoked once per page, before that page's content is drawn.
pub trait PageDecorator {
    fn decorate(&self, canvas: &Canvas<'_>, page_number: usize);
}

/// Blue header band with product name, client and date; footer rule with page label.
pub struct BrandedPageTemplate {
    client_name: String,
    date_label: String,
}

impl BrandedPageTemplate {
    pub fn new(ctx: &RenderContext) -> Self {
        Self {
            client_name: pdf_safe_text(ctx.client_name.trim()),
            date_label: ctx.generated_on.format("%B %d, %Y").to_string(),
        }
    }

    pub fn footer_text(page_number: usize) -> String {
        format!("Generated by Blueshift | Page {page_number}")
    }
}

impl PageDecorator for BrandedPageTemplate {
    fn decorate(&self, canvas: &Canvas<'_>, page_number: usize) {
        let band_bottom = PAGE_HEIGHT - HEADER_HEIGHT;
        canvas.fill_rect(0.0, band_bottom, PAGE_WIDTH, HEADER_HEIGHT, palette::BRAND_BLUE);

        let header = text_style(StyleKind::Header);
        canvas.text_line(DOCUMENT_TITLE, MARGIN, CONTENT_WIDTH, band_bottom + 22.0, &header, true);

        let right = |font_size: f32, color: BrandColor| TextStyle {
            font_size,
            color,
            bold: false,
            align: Align::Right,
            ..header
        };
        if !self.client_name.is_empty() {
            canvas.text_line(
                &format!("Client: {}", self.client_name),
                MARGIN,
                CONTENT_WIDTH,
                band_bottom + 28.0,
                &right(12.0, palette::WHITE),
                false,
            );
        }
        canvas.text_line(
            &self.date_label,
            MARGIN,
            CONTENT_WIDTH,
            band_bottom + 12.0,
            &right(10.0, palette::LIGHT_BLUE),
            false,
        );

        canvas.hline(
            MARGIN,
            PAGE_WIDTH - MARGIN,
            FOOTER_RULE_Y,
            palette::BRAND_BLUE,
            2.0,
        );
        canvas.text_line(
            &Self::footer_text(page_number),
            MARGIN,
            CONTENT_WIDTH,
            FOOTER_TEXT_Y,
            &text_style(StyleKind::Footer),
            false,
        );
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Composer
// ────────────────────────────────────────────────────────────────────────────

struct CellLayout {
    lines: Vec<String>,
    style: TextStyle,
    bold: bool,
}

struct RowLayout {
    /// Source row, shared by every fragment of a split row.
    index: usize,
    height: f32,
    cells: Vec<CellLayout>,
}

impl RowLayout {
    fn new(index: usize, cells: Vec<CellLayout>, padding_y: f32) -> Self {
        let text_height = cells
            .iter()
            .map(|c| c.lines.len().max(1) as f32 * c.style.leading())
            .fold(0.0_f32, f32::max);
        Self {
            index,
            height: text_height + 2.0 * padding_y,
            cells,
        }
    }

    /// Splits a row taller than the content frame into fragments that each fit on a page.
    fn split_to_frame(self, padding_y: f32) -> Vec<RowLayout> {
        let frame = CONTENT_TOP - CONTENT_BOTTOM - 2.0 * padding_y;
        if self.height <= frame + 2.0 * padding_y {
            return vec![self];
        }

        let capacities: Vec<usize> = self
            .cells
            .iter()
            .map(|c| ((frame / c.style.leading()).floor() as usize).max(1))
            .collect();
        let fragments = self
            .cells
            .iter()
            .zip(&capacities)
            .map(|(c, cap)| c.lines.len().div_ceil(*cap))
            .max()
            .unwrap_or(1);

        (0..fragments)
            .map(|k| {
                let cells = self
                    .cells
                    .iter()
                    .zip(&capacities)
                    .map(|(c, cap)| CellLayout {
                        lines: c.lines.iter().skip(k * cap).take(*cap).cloned().collect(),
                        style: c.style,
                        bold: c.bold,
                    })
                    .collect();
                RowLayout::new(self.index, cells, padding_y)
            })
            .collect()
    }
}

fn layout_table(table: &TableBlock) -> Vec<RowLayout> {
    let style = &table.style;
    table
        .rows
        .iter()
        .enumerate()
        .flat_map(|(index, row)| {
            let cells: Vec<CellLayout> = row
                .iter()
                .zip(&table.column_widths)
                .map(|(cell, width)| {
                    let cell_style = text_style(cell.style);
                    let bold = cell_style.bold || cell.bold;
                    let lines = get_metrics(bold).wrap(
                        &pdf_safe_text(&cell.text),
                        cell_style.font_size,
                        width - 2.0 * style.padding_x,
                    );
                    CellLayout {
                        lines,
                        style: cell_style,
                        bold,
                    }
                })
                .collect();
            RowLayout::new(index, cells, style.padding_y).split_to_frame(style.padding_y)
        })
        .collect()
}

struct Composer<'a> {
    doc: PdfDocumentReference,
    fonts: Fonts,
    decorator: &'a dyn PageDecorator,
    layer: PdfLayerReference,
    page_number: usize,
    cursor: f32,
    page_has_content: bool,
}

impl<'a> Composer<'a> {
    fn new(decorator: &'a dyn PageDecorator) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(DOCUMENT_TITLE, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_err)?,
        };
        let layer = doc.get_page(page).get_layer(layer);

        let composer = Self {
            doc,
            fonts,
            decorator,
            layer,
            page_number: 1,
            cursor: CONTENT_TOP,
            page_has_content: false,
        };
        composer.decorate();
        Ok(composer)
    }

    fn canvas(&self) -> Canvas<'_> {
        Canvas {
            layer: &self.layer,
            fonts: &self.fonts,
        }
    }

    fn decorate(&self) {
        self.decorator.decorate(&self.canvas(), self.page_number);
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.cursor = CONTENT_TOP;
        self.page_has_content = false;
        self.decorate();
    }

    /// Starts a new page unless `height` fits below the cursor. An empty page always accepts.
    fn ensure_room(&mut self, height: f32) {
        if self.page_has_content && self.cursor - height < CONTENT_BOTTOM {
            self.new_page();
        }
    }

    fn place(&mut self, block: &Block) {
        match block {
            Block::Paragraph {
                text,
                style,
                bullet,
            } => self.paragraph(text, *style, *bullet),
            Block::Spacer(height) => {
                if self.page_has_content {
                    self.cursor -= height;
                }
            }
            Block::Table(table) => self.table(table),
            Block::PageBreak => {
                if self.page_has_content {
                    self.new_page();
                }
            }
        }
    }

    fn paragraph(&mut self, text: &str, kind: StyleKind, bullet: bool) {
        let style = text_style(kind);
        if self.page_has_content {
            self.cursor -= style.space_before;
        }

        let left = MARGIN + style.left_indent;
        let width = CONTENT_WIDTH - style.left_indent;
        let lines = get_metrics(style.bold).wrap(&pdf_safe_text(text), style.font_size, width);

        for (i, line) in lines.iter().enumerate() {
            self.ensure_room(style.leading());
            let baseline = self.cursor - style.font_size;
            let canvas = self.canvas();
            if bullet && i == 0 {
                canvas.fill_rect(
                    left - 10.0 - BULLET_SIZE,
                    baseline + style.font_size * 0.3,
                    BULLET_SIZE,
                    BULLET_SIZE,
                    style.color,
                );
            }
            canvas.text_line(line, left, width, baseline, &style, style.bold);
            self.cursor -= style.leading();
            self.page_has_content = true;
        }

        self.cursor -= style.space_after;
    }

    fn table(&mut self, table: &TableBlock) {
        let rows = layout_table(table);
        let total: f32 = rows.iter().map(|r| r.height).sum();
        let table_width: f32 = table.column_widths.iter().sum();
        let left = MARGIN + (CONTENT_WIDTH - table_width).max(0.0) / 2.0;

        if total <= CONTENT_TOP - CONTENT_BOTTOM {
            self.ensure_room(total);
        }

        for row in &rows {
            self.ensure_room(row.height);
            self.draw_row(table, row, left);
            self.cursor -= row.height;
            self.page_has_content = true;
        }
    }

    fn draw_row(&self, table: &TableBlock, row: &RowLayout, left: f32) {
        let style = &table.style;
        let index = row.index;
        let canvas = self.canvas();
        let top = self.cursor;
        let bottom = top - row.height;
        let mut x = left;

        for (column, (cell, width)) in row.cells.iter().zip(&table.column_widths).enumerate() {
            let background = if index < table.header_rows {
                style.header_background
            } else {
                match style.label_column_background {
                    Some(color) if column == 0 => color,
                    _ => style.row_backgrounds[(index - table.header_rows) % 2],
                }
            };
            canvas.fill_rect(x, bottom, *width, row.height, background);
            canvas.stroke_rect(x, bottom, *width, row.height, style.grid_color, style.grid_width);

            let leading = cell.style.leading();
            let block_height = cell.lines.len() as f32 * leading;
            let mut baseline = top - (row.height - block_height) / 2.0 - cell.style.font_size;
            for line in &cell.lines {
                canvas.text_line(
                    line,
                    x + style.padding_x,
                    width - 2.0 * style.padding_x,
                    baseline,
                    &cell.style,
                    cell.bold,
                );
                baseline -= leading;
            }
            x += width;
        }
    }

    fn finish(self) -> Result<(Vec<u8>, usize), RenderError> {
        let Composer {
            doc, page_number, ..
        } = self;
        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer).map_err(pdf_err)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok((bytes, page_number))
    }
}

/// Lays out `story` and serialises the document. Returns the bytes and the page count.
pub fn compose(
    story: &Story,
    decorator: &dyn PageDecorator,
) -> Result<(Vec<u8>, usize), RenderError> {
    let mut composer = Composer::new(decorator)?;
    for block in &story.blocks {
        composer.place(block);
    }
    debug!("Composed {} blocks onto {} pages", story.blocks.len(), composer.page_number);
    composer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::deck::SlideDeck;
    use crate::render::story::build_story;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingDecorator {
        pages: RefCell<Vec<usize>>,
    }

    impl PageDecorator for RecordingDecorator {
        fn decorate(&self, _canvas: &Canvas<'_>, page_number: usize) {
            self.pages.borrow_mut().push(page_number);
        }
    }

    fn ctx() -> RenderContext {
        RenderContext {
            generated_on: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            ..RenderContext::new("Acme", "", "Media")
        }
    }

    fn compose_value(value: serde_json::Value, decorator: &dyn PageDecorator) -> usize {
        let story = build_story(&SlideDeck::from_value(&value).unwrap(), &ctx());
        compose(&story, decorator).unwrap().1
    }

    #[test]
    fn test_one_page_per_slide_for_short_slides() {
        let decorator = RecordingDecorator::default();
        let pages = compose_value(
            json!({
                "slide1": {"title": "A", "content": ["one"]},
                "slide2": {"title": "B", "content": ["two"]},
                "slide3": {"title": "C", "content": ["three"]}
            }),
            &decorator,
        );
        assert_eq!(pages, 3);
        assert_eq!(*decorator.pages.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_long_content_overflows_onto_new_pages() {
        let decorator = RecordingDecorator::default();
        let bullets: Vec<String> = (0..80)
            .map(|i| format!("Insight number {i} about campaign performance this quarter"))
            .collect();
        let pages = compose_value(json!({"slide1": {"title": "Long", "content": bullets}}), &decorator);
        assert!(pages > 1);
        assert_eq!(decorator.pages.borrow().len(), pages);
    }

    #[test]
    fn test_empty_deck_is_a_single_page() {
        let decorator = RecordingDecorator::default();
        assert_eq!(compose_value(json!({}), &decorator), 1);
    }

    #[test]
    fn test_table_row_heights_include_padding_and_wrapping() {
        let story = build_story(
            &SlideDeck::from_value(&json!({
                "slide1": {"tables": [{"headers": ["A"], "rows": [["short"], ["a much longer cell value that has to wrap onto several lines inside one column of the table"]]}]}
            }))
            .unwrap(),
            &ctx(),
        );
        let table = story
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();
        let mut narrow = table.clone();
        narrow.column_widths = vec![120.0];
        let rows = layout_table(&narrow);
        assert_eq!(rows.len(), 3);
        assert!((rows[1].height - (10.0 * 1.2 + 12.0)).abs() < 1e-3);
        assert!(rows[2].height > rows[1].height * 2.0);
    }

    #[test]
    fn test_oversized_cell_is_split_across_pages() {
        let huge = "word ".repeat(4000);
        let story = build_story(
            &SlideDeck::from_value(&json!({
                "slide1": {"tables": [{"headers": ["Notes", "Owner"], "rows": [[huge, "Ops"], ["tail", "Ops"]]}]}
            }))
            .unwrap(),
            &ctx(),
        );
        let table = story
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .unwrap();

        let rows = layout_table(table);
        assert!(rows.len() > 3);
        assert!(rows
            .iter()
            .all(|r| r.height <= CONTENT_TOP - CONTENT_BOTTOM + 1e-3));
        assert_eq!(rows.first().map(|r| r.index), Some(0));
        assert_eq!(rows.last().map(|r| r.index), Some(2));
        assert_eq!(rows[1].cells[1].lines, vec!["Ops".to_string()]);
        assert!(rows[2].cells[1].lines.is_empty());

        let recorder = RecordingDecorator::default();
        let pages = compose_value(
            json!({"slide1": {"tables": [{"headers": ["Notes"], "rows": [[huge]]}]}}),
            &recorder,
        );
        assert!(pages > 1);
    }

    #[test]
    fn test_branded_template_labels() {
        let template = BrandedPageTemplate::new(&ctx());
        assert_eq!(template.date_label, "July 01, 2024");
        assert_eq!(BrandedPageTemplate::footer_text(3), "Generated by Blueshift | Page 3");
    }

    #[test]
    fn test_branded_template_renders() {
        let story = build_story(&SlideDeck::default(), &ctx());
        let (bytes, pages) = compose(&story, &BrandedPageTemplate::new(&ctx())).unwrap();
        assert_eq!(pages, 1);
        assert!(bytes.starts_with(b"%PDF"));
    }
}
