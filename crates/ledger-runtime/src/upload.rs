//! Multipart upload form handling.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use ledger_core::models::NetAmountStrategy;
use ledger_core::Result;

/// Form field carrying the transaction file.
pub const FILE_FIELD: &str = "file";
/// Optional form field selecting the net-amount strategy.
pub const STRATEGY_FIELD: &str = "strategy";

/// The file part of an upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content: Bytes,
}

/// Parsed upload form. `file` is `None` when the form was sent without a
/// file chosen.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub strategy: Option<String>,
}

impl UploadForm {
    /// Drain a multipart body. Unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> std::result::Result<Self, MultipartError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                FILE_FIELD => {
                    let file_name = field
                        .file_name()
                        .filter(|n| !n.is_empty())
                        .map(str::to_string);
                    let content = field.bytes().await?;
                    // Browsers send an unnamed empty part when no file is chosen.
                    if file_name.is_some() || !content.is_empty() {
                        form.file = Some(UploadedFile { file_name, content });
                    }
                }
                STRATEGY_FIELD => {
                    let value = field.text().await?;
                    if !value.trim().is_empty() {
                        form.strategy = Some(value);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// The requested strategy, or `default` when none was sent.
    pub fn strategy_or(&self, default: NetAmountStrategy) -> Result<NetAmountStrategy> {
        match &self.strategy {
            Some(s) => s.parse(),
            None => Ok(default),
        }
    }
}
