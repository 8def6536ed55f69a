//! Revenue and purchase aggregation over CSV rows.

use serde::Serialize;
use tracing::warn;

use super::Row;

pub const REVENUE_COLUMN: &str = "Revenue";
pub const PURCHASES_COLUMN: &str = "Purchases";

/// Totals derived once per request from the uploaded CSV rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AggregateMetrics {
    pub total_revenue: f64,
    pub total_purchases: i64,
    /// `total_revenue / total_purchases`, or 0 when there are no purchases.
    pub average_order_value: f64,
}

/// Sums revenue and purchases. Rows with a missing or non-numeric value are skipped.
pub fn aggregate<'a, I>(rows: I) -> AggregateMetrics
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut total_revenue = 0.0_f64;
    let mut total_purchases = 0_i64;

    for row in rows {
        let added = parse_row(row).and_then(|(revenue, purchases)| {
            let revenue_sum = total_revenue + revenue;
            match total_purchases.checked_add(purchases) {
                Some(purchase_sum) if revenue_sum.is_finite() => Ok((revenue_sum, purchase_sum)),
                _ => Err("total would overflow".to_string()),
            }
        });
        match added {
            Ok((revenue_sum, purchase_sum)) => {
                total_revenue = revenue_sum;
                total_purchases = purchase_sum;
            }
            Err(reason) => {
                warn!("Skipping row ({reason}): {:?}", row.fields());
            }
        }
    }

    let average_order_value = if total_purchases > 0 {
        total_revenue / total_purchases as f64
    } else {
        0.0
    };

    AggregateMetrics {
        total_revenue,
        total_purchases,
        average_order_value,
    }
}

fn parse_row(row: &Row) -> Result<(f64, i64), String> {
    let revenue_raw = row
        .get(REVENUE_COLUMN)
        .ok_or_else(|| format!("missing {REVENUE_COLUMN}"))?;
    let purchases_raw = row
        .get(PURCHASES_COLUMN)
        .ok_or_else(|| format!("missing {PURCHASES_COLUMN}"))?;

    let revenue = parse_decimal(revenue_raw)
        .ok_or_else(|| format!("non-numeric {REVENUE_COLUMN} {revenue_raw:?}"))?;
    let purchases = parse_count(purchases_raw)
        .ok_or_else(|| format!("non-integer {PURCHASES_COLUMN} {purchases_raw:?}"))?;

    if revenue < 0.0 || purchases < 0 {
        return Err("negative value".to_string());
    }
    Ok((revenue, purchases))
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['$', '€', '£'])
        .replace(',', "")
}

/// Parses a finite decimal after stripping a currency symbol and thousands separators.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    normalize(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses a whole count. `12.0` is accepted, `12.5` is not.
pub fn parse_count(raw: &str) -> Option<i64> {
    let cleaned = normalize(raw);
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64)
        .then_some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_sum_and_average() {
        let rows = vec![
            row(&[("Revenue", "100.0"), ("Purchases", "2")]),
            row(&[("Revenue", "50.5"), ("Purchases", "3")]),
        ];
        let m = aggregate(&rows);
        assert!((m.total_revenue - 150.5).abs() < 1e-9);
        assert_eq!(m.total_purchases, 5);
        assert!((m.average_order_value - 30.1).abs() < 1e-9);
    }

    #[test]
    fn test_zero_purchases_average_is_zero() {
        let rows = vec![row(&[("Revenue", "120"), ("Purchases", "0")])];
        let m = aggregate(&rows);
        assert_eq!(m.total_revenue, 120.0);
        assert_eq!(m.total_purchases, 0);
        assert_eq!(m.average_order_value, 0.0);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let m = aggregate(std::iter::empty::<&Row>());
        assert_eq!(m, AggregateMetrics::default());
    }

    #[test]
    fn test_bad_rows_skipped_individually() {
        let rows = vec![
            row(&[("Revenue", "abc"), ("Purchases", "2")]),
            row(&[("Purchases", "4")]),
            row(&[("Revenue", "10"), ("Purchases", "1.5")]),
            row(&[("Revenue", "-10"), ("Purchases", "1")]),
            row(&[("Revenue", "40"), ("Purchases", "4")]),
        ];
        let m = aggregate(&rows);
        assert_eq!(m.total_revenue, 40.0);
        assert_eq!(m.total_purchases, 4);
        assert_eq!(m.average_order_value, 10.0);
    }

    #[test]
    fn test_overflowing_row_is_skipped() {
        let rows = vec![
            row(&[("Revenue", "10"), ("Purchases", "9000000000000000000")]),
            row(&[("Revenue", "10"), ("Purchases", "9000000000000000000")]),
            row(&[("Revenue", "1e308"), ("Purchases", "1")]),
            row(&[("Revenue", "1e308"), ("Purchases", "1")]),
        ];
        let m = aggregate(&rows);
        assert_eq!(m.total_purchases, 9_000_000_000_000_000_001);
        assert!(m.total_revenue.is_finite());
        assert!(m.total_revenue > 0.0);
    }

    #[test]
    fn test_currency_and_separators_coerced() {
        let rows = vec![row(&[("Revenue", " $1,250.50 "), ("Purchases", "1,000")])];
        let m = aggregate(&rows);
        assert!((m.total_revenue - 1250.5).abs() < 1e-9);
        assert_eq!(m.total_purchases, 1000);
    }

    #[test]
    fn test_parse_count_accepts_whole_decimals() {
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_parse_decimal_rejects_non_finite() {
        assert_eq!(parse_decimal("NaN"), None);
        assert_eq!(parse_decimal("inf"), None);
        assert_eq!(parse_decimal("3.25"), Some(3.25));
    }
}
