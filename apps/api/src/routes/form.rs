//! Multipart form reading shared by the generate and export handlers.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::UploadedFile;

/// Form field carrying uploaded customer data files.
pub const FILES_FIELD: &str = "customer_data_files";

/// A fully buffered multipart form.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    /// Returns a text field that must be present. An empty value counts as present.
    pub fn require(&self, name: &str) -> Result<String, AppError> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Missing required form field '{name}'")))
    }
}

/// Reads every part of the form into memory. Parts named [`FILES_FIELD`] are collected as
/// files in upload order; empty file parts (no file chosen) are dropped.
pub async fn read_form(mut multipart: Multipart) -> Result<FormData, AppError> {
    let mut form = FormData::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == FILES_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            if file_name.is_empty() && data.is_empty() {
                continue;
            }
            debug!("Received file part {file_name} ({} bytes)", data.len());
            form.files.push(UploadedFile {
                name: file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}
