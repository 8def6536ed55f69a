//! Thousands separators for numbers in the performance slide's narrative.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

use crate::generation::summary::group_thousands;

/// The slide whose content is rewritten.
pub const FORMATTED_SLIDE_KEY: &str = "slide2";

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(\d+(?:,\d{3})*)(\.\d+)?\b").expect("number pattern is valid")
    })
}

/// Rewrites bare integers and decimals in `text` with separators; already separated
/// numbers are left as they are. Idempotent.
pub fn format_numbers_in_text(text: &str) -> String {
    number_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let int_part = &caps[1];
            let frac = caps.get(2).map_or("", |m| m.as_str());
            if int_part.contains(',') {
                format!("{int_part}{frac}")
            } else {
                format!("{}{frac}", group_thousands(int_part))
            }
        })
        .into_owned()
}

/// Formats every string in the designated slide's `content` list. Returns whether the
/// slide was present.
pub fn format_deck(deck: &mut Map<String, Value>) -> bool {
    let Some(content) = deck
        .get_mut(FORMATTED_SLIDE_KEY)
        .and_then(|slide| slide.get_mut("content"))
        .and_then(Value::as_array_mut)
    else {
        return false;
    };

    for item in content.iter_mut() {
        if let Value::String(text) = item {
            *text = format_numbers_in_text(text);
        }
    }
    true
}

/// Text-level entry point: returns `raw` unchanged unless it is a JSON object whose
/// designated slide has a content list.
pub fn format_deck_numbers(raw: &str) -> String {
    let Ok(Value::Object(mut deck)) = serde_json::from_str::<Value>(raw) else {
        return raw.to_string();
    };
    if !format_deck(&mut deck) {
        return raw.to_string();
    }
    Value::Object(deck).to_string()
}
