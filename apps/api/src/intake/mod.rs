// Résumé intake: turns an uploaded PDF into normalized plain text.
// Uploaded files are processed in memory and never stored.

pub mod handlers;
pub mod normalize;

use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::intake::normalize::normalize_pdf_text;

/// Text recovered from one PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub page_count: usize,
}

/// Extracts and normalizes the text of a PDF. Parsing is CPU-bound, so it runs
/// on the blocking pool.
pub async fn extract_pdf_text(data: Bytes, max_chars: usize) -> Result<PdfText, AppError> {
    let byte_size = data.len();

    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&data)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
    .map_err(|e| AppError::Pdf(e.to_string()))?;

    let text = normalize_pdf_text(&pages.join("\n"), max_chars);
    if text.is_empty() {
        return Err(AppError::Pdf(
            "PDF contains no extractable text".to_string(),
        ));
    }

    info!(
        "Extracted PDF text: bytes={}, pages={}, chars={}",
        byte_size,
        pages.len(),
        text.chars().count()
    );

    Ok(PdfText {
        text,
        page_count: pages.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_non_pdf_bytes_are_a_pdf_error() {
        let result = extract_pdf_text(Bytes::from_static(b"plain text, not a pdf"), 100).await;
        assert!(matches!(result, Err(AppError::Pdf(_))));
    }
}
