//! Data extraction from uploaded customer files.
//!
//! PDF uploads become page-concatenated text, CSV uploads become ordered row mappings.
//! A failure on one file is logged and contributes nothing; the remaining files are still read.
//! PDF parsing is CPU-bound, so callers run [`extract_all`] inside `spawn_blocking`.

pub mod metrics;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub use metrics::{aggregate, AggregateMetrics};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
}

/// A file received in an upload. Discarded after extraction.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Csv,
    Unsupported,
}

impl UploadedFile {
    /// Decides the file kind from the extension, falling back to the declared content type.
    pub fn kind(&self) -> FileKind {
        let name = self.name.to_ascii_lowercase();
        if name.ends_with(".pdf") {
            return FileKind::Pdf;
        }
        if name.ends_with(".csv") {
            return FileKind::Csv;
        }
        match self.content_type.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("application/pdf") => FileKind::Pdf,
            Some("text/csv") | Some("application/csv") => FileKind::Csv,
            _ => FileKind::Unsupported,
        }
    }
}

/// One CSV record as ordered `(header, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// What a single file yielded.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedDataset {
    Text { source: String, text: String },
    Rows { source: String, headers: Vec<String>, rows: Vec<Row> },
}

impl ExtractedDataset {
    pub fn rows(&self) -> &[Row] {
        match self {
            ExtractedDataset::Rows { rows, .. } => rows,
            ExtractedDataset::Text { .. } => &[],
        }
    }
}

/// Extracts every supported file in upload order. Unsupported kinds are skipped,
/// failed files are logged and contribute an empty dataset.
pub fn extract_all(files: &[UploadedFile]) -> Vec<ExtractedDataset> {
    let mut datasets = Vec::with_capacity(files.len());

    for file in files {
        info!(
            "Processing file: {} ({:?}, {} bytes)",
            file.name,
            file.content_type,
            file.data.len()
        );
        let kind = file.kind();
        if kind == FileKind::Unsupported {
            warn!("Unsupported file type: {}", file.name);
            continue;
        }

        match extract_file(file, kind) {
            Ok(dataset) => datasets.push(dataset),
            Err(e) => {
                error!("Error processing file {}: {e}", file.name);
                datasets.push(empty_dataset(file, kind));
            }
        }
    }

    datasets
}

fn empty_dataset(file: &UploadedFile, kind: FileKind) -> ExtractedDataset {
    match kind {
        FileKind::Csv => ExtractedDataset::Rows {
            source: file.name.clone(),
            headers: Vec::new(),
            rows: Vec::new(),
        },
        _ => ExtractedDataset::Text {
            source: file.name.clone(),
            text: String::new(),
        },
    }
}

pub fn extract_file(
    file: &UploadedFile,
    kind: FileKind,
) -> Result<ExtractedDataset, ExtractionError> {
    match kind {
        FileKind::Pdf => Ok(ExtractedDataset::Text {
            source: file.name.clone(),
            text: extract_pdf_text(&file.data)?,
        }),
        FileKind::Csv => {
            let (headers, rows) = extract_csv_rows(&file.data)?;
            Ok(ExtractedDataset::Rows {
                source: file.name.clone(),
                headers,
                rows,
            })
        }
        FileKind::Unsupported => Ok(empty_dataset(file, kind)),
    }
}

/// Extracts the text of every page, concatenated in page order.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(data))
        .map_err(|_| ExtractionError::Pdf("parser panicked on malformed input".to_string()))?;
    let text = result.map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    debug!("Extracted {} chars of PDF text", text.len());
    Ok(text)
}

/// Parses a UTF-8 CSV with a header row into ordered row mappings.
pub fn extract_csv_rows(data: &[u8]) -> Result<(Vec<String>, Vec<Row>), ExtractionError> {
    let text = std::str::from_utf8(data)?;
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(Row::new(fields));
    }

    debug!("Extracted {} CSV rows", rows.len());
    Ok((headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, content_type: Option<&str>, data: &[u8]) -> UploadedFile {
        UploadedFile {
            name: name.to_string(),
            content_type: content_type.map(str::to_string),
            data: Bytes::copy_from_slice(data),
        }
    }

    #[test]
    fn test_kind_from_extension_is_case_insensitive() {
        assert_eq!(upload("Report.PDF", None, b"").kind(), FileKind::Pdf);
        assert_eq!(upload("campaigns.Csv", None, b"").kind(), FileKind::Csv);
    }

    #[test]
    fn test_kind_falls_back_to_content_type() {
        assert_eq!(upload("blob", Some("text/csv"), b"").kind(), FileKind::Csv);
        assert_eq!(upload("blob", Some("application/pdf"), b"").kind(), FileKind::Pdf);
        assert_eq!(
            upload("notes.txt", Some("text/plain"), b"").kind(),
            FileKind::Unsupported
        );
    }

    #[test]
    fn test_csv_rows_keep_header_order() {
        let (headers, rows) =
            extract_csv_rows(b"Campaign,Revenue,Purchases\nSpring,100.5,3\nSummer,200,4\n").unwrap();
        assert_eq!(headers, vec!["Campaign", "Revenue", "Purchases"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Campaign"), Some("Spring"));
        assert_eq!(rows[1].get("Revenue"), Some("200"));
        assert_eq!(rows[0].fields()[0].0, "Campaign");
    }

    #[test]
    fn test_csv_bom_and_short_rows_tolerated() {
        let (headers, rows) = extract_csv_rows("\u{feff}Revenue,Purchases\n10\n".as_bytes()).unwrap();
        assert_eq!(headers, vec!["Revenue", "Purchases"]);
        assert_eq!(rows[0].get("Revenue"), Some("10"));
        assert_eq!(rows[0].get("Purchases"), None);
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let err = extract_csv_rows(&[0x52, 0xff, 0xfe, 0x0a]).unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_an_error_not_a_panic() {
        assert!(extract_pdf_text(b"%PDF-1.4 definitely not a pdf").is_err());
    }

    #[test]
    fn test_extract_all_skips_unsupported_and_survives_failures() {
        let files = vec![
            upload("a.csv", None, b"Revenue,Purchases\n10,1\n"),
            upload("notes.docx", None, b"ignored"),
            upload("broken.pdf", None, b"garbage"),
            upload("b.csv", None, b"Revenue,Purchases\n5,1\n"),
        ];
        let datasets = extract_all(&files);
        assert_eq!(datasets.len(), 3);
        assert_eq!(datasets[0].rows().len(), 1);
        assert_eq!(
            datasets[1],
            ExtractedDataset::Text {
                source: "broken.pdf".into(),
                text: String::new()
            }
        );
        assert_eq!(datasets[2].rows()[0].get("Revenue"), Some("5"));
    }
}
