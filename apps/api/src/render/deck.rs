//! Slide deck model read from the sanitized model JSON.
//!
//! Model output is loosely typed: cell values may be numbers or strings, `content` may be a
//! list or a single string, table rows may be under `rows` or `data`. Everything is coerced
//! to strings here so layout never sees a JSON value.

use serde_json::{Map, Value};

use super::RenderError;

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub current: String,
    pub previous: String,
    pub change: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryItem {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    Bullets(Vec<String>),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub title: Option<String>,
    pub content: SlideContent,
    pub metrics: Vec<Metric>,
    pub summary: Vec<SummaryItem>,
    pub tables: Vec<DataTable>,
}

/// Slides in key order. Keys other than `slide<digits>` are ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideDeck {
    pub slides: Vec<(String, Slide)>,
}

pub fn is_slide_key(key: &str) -> bool {
    key.strip_prefix("slide")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

impl SlideDeck {
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, RenderError> {
        let mut keys: Vec<&String> = map.keys().filter(|k| is_slide_key(k)).collect();
        keys.sort();

        let slides = keys
            .into_iter()
            .map(|key| -> Result<_, RenderError> {
                Ok((key.clone(), Slide::from_value(key, &map[key])?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SlideDeck { slides })
    }

    pub fn from_value(value: &Value) -> Result<Self, RenderError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(RenderError::NotAnObject),
        }
    }
}

impl Slide {
    pub fn from_value(key: &str, value: &Value) -> Result<Self, RenderError> {
        let obj = value.as_object().ok_or_else(|| RenderError::InvalidSlide {
            key: key.to_string(),
            reason: "expected an object".to_string(),
        })?;

        let title = obj
            .get("title")
            .filter(|v| !v.is_null())
            .map(cell_text)
            .filter(|t| !t.trim().is_empty());

        let content = match obj.get("content") {
            Some(Value::String(s)) => SlideContent::Paragraph(s.clone()),
            Some(Value::Array(items)) => SlideContent::Bullets(items.iter().map(cell_text).collect()),
            _ => SlideContent::Bullets(Vec::new()),
        };

        let metrics = array_field(obj, "metrics")
            .iter()
            .map(|m| Metric {
                name: field_text(m, "name", ""),
                current: field_text(m, "current", "N/A"),
                previous: field_text(m, "previous", "N/A"),
                change: field_text(m, "change", "N/A"),
            })
            .collect();

        let summary = array_field(obj, "summary")
            .iter()
            .map(|s| SummaryItem {
                label: field_text(s, "label", ""),
                value: field_text(s, "value", ""),
            })
            .collect();

        let tables = array_field(obj, "tables")
            .iter()
            .filter(|t| t.is_object())
            .map(|t| DataTable {
                title: field_text(t, "title", ""),
                headers: t
                    .get("headers")
                    .and_then(Value::as_array)
                    .map(|h| h.iter().map(cell_text).collect())
                    .unwrap_or_default(),
                rows: t
                    .get("rows")
                    .or_else(|| t.get("data"))
                    .and_then(Value::as_array)
                    .map(|rows| rows.iter().map(row_cells).collect())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(Slide {
            title,
            content,
            metrics,
            summary,
            tables,
        })
    }
}

fn array_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn field_text(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(v) => cell_text(v),
    }
}

fn row_cells(row: &Value) -> Vec<String> {
    match row {
        Value::Array(cells) => cells.iter().map(cell_text).collect(),
        Value::Object(map) => map.values().map(cell_text).collect(),
        other => vec![cell_text(other)],
    }
}

/// Coerces any JSON value to display text.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
