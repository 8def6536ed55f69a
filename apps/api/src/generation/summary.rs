//! Data summary text handed to the prompt composer.

use crate::extraction::{AggregateMetrics, ExtractedDataset};

pub const NO_FILES_SUMMARY: &str = "No customer data files provided";

/// Campaign export columns the analysis should consider when present.
const ANALYSIS_COLUMNS: &[&str] = &[
    "Campaign",
    "Campaign Segment",
    "Campaign Type",
    "Unique Impressions (user only)",
    "Revenue per Purchase",
    "Revenue",
    "Purchases",
    "Unique Open Rate",
    "Unique Clicks (user only)",
    "Unique Click %",
    "CTOR",
    "Add to Cart",
    "Impressions (user only)",
    "Revenue per Delivered",
    "Revenue per Impression",
    "Revenue per Order",
    "Revenue per Unique Click",
];

pub fn build_data_summary(datasets: &[ExtractedDataset], metrics: &AggregateMetrics) -> String {
    if datasets.is_empty() {
        return NO_FILES_SUMMARY.to_string();
    }

    let mut out = format!(
        "Total Revenue: ${}. Total Purchases: {}. Average Order Value: ${}.\n",
        format_currency(metrics.total_revenue),
        group_thousands(&metrics.total_purchases.to_string()),
        format_currency(metrics.average_order_value),
    );
    out.push_str("Columns to analyze where present: ");
    out.push_str(&ANALYSIS_COLUMNS.join(", "));
    out.push('\n');

    for dataset in datasets {
        match dataset {
            ExtractedDataset::Text { source, text } => {
                out.push_str(&format!("\nDocument {source}:\n"));
                out.push_str(text.trim());
                out.push('\n');
            }
            ExtractedDataset::Rows {
                source,
                headers,
                rows,
            } => {
                out.push_str(&format!(
                    "\nSpreadsheet {source} ({} rows; columns: {}):\n",
                    rows.len(),
                    headers.join(", ")
                ));
                for row in rows {
                    let line = row
                        .fields()
                        .iter()
                        .map(|(k, v)| format!("{k}: {v}"))
                        .collect::<Vec<_>>()
                        .join("; ");
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// `1234.5` → `1,234.50`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (int_part, frac) = fixed.split_once('.').unwrap_or((&fixed, "00"));
    format!("{}.{frac}", group_thousands(int_part))
}

/// Inserts a comma every three digits from the right of an optionally signed digit string.
pub fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Row;

    #[test]
    fn test_no_files_uses_fixed_summary() {
        assert_eq!(
            build_data_summary(&[], &AggregateMetrics::default()),
            NO_FILES_SUMMARY
        );
    }

    #[test]
    fn test_summary_includes_totals_text_and_rows_in_order() {
        let datasets = vec![
            ExtractedDataset::Text {
                source: "deck.pdf".into(),
                text: "  Q2 was strong.  ".into(),
            },
            ExtractedDataset::Rows {
                source: "c.csv".into(),
                headers: vec!["Campaign".into(), "Revenue".into()],
                rows: vec![Row::new(vec![
                    ("Campaign".into(), "Spring".into()),
                    ("Revenue".into(), "1200".into()),
                ])],
            },
        ];
        let metrics = AggregateMetrics {
            total_revenue: 12500.0,
            total_purchases: 1250,
            average_order_value: 10.0,
        };
        let summary = build_data_summary(&datasets, &metrics);
        assert!(summary.starts_with(
            "Total Revenue: $12,500.00. Total Purchases: 1,250. Average Order Value: $10.00."
        ));
        assert!(summary.contains("Unique Click %"));
        let doc = summary.find("Q2 was strong.").unwrap();
        let row = summary.find("Campaign: Spring; Revenue: 1200").unwrap();
        assert!(doc < row);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("1234567"), "1,234,567");
        assert_eq!(group_thousands("-12345"), "-12,345");
    }

    #[test]
    fn test_format_currency_rounds_to_cents() {
        assert_eq!(format_currency(1234.5), "1,234.50");
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(999999.999), "1,000,000.00");
    }
}
