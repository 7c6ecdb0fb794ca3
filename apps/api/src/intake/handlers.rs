//! Axum route handlers for the Intake API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::intake::extract_pdf_text;
use crate::state::AppState;

/// Largest accepted upload.
pub const MAX_PDF_BYTES: usize = 1024 * 1024;

const FILE_FIELD: &str = "file";
const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResumeResponse {
    pub text: String,
    pub page_count: usize,
    pub byte_size: usize,
}

/// An uploaded file as received, before any parsing.
#[derive(Debug)]
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/v1/resumes/parse
///
/// Accepts a multipart `file` field holding a PDF résumé and returns its text.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParseResumeResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        upload = Some(Upload {
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            data: field.bytes().await.map_err(multipart_error)?,
        });
        break;
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    validate_upload(&upload)?;

    let byte_size = upload.data.len();
    let pdf = extract_pdf_text(upload.data, state.config.max_resume_chars).await?;

    Ok(Json(ParseResumeResponse {
        text: pdf.text,
        page_count: pdf.page_count,
        byte_size,
    }))
}

fn validate_upload(upload: &Upload) -> Result<(), AppError> {
    if upload.data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if upload.data.len() > MAX_PDF_BYTES {
        return Err(AppError::PayloadTooLarge(
            "File size exceeds 1MB limit".to_string(),
        ));
    }

    let is_pdf_type = upload
        .content_type
        .as_deref()
        .is_some_and(|t| t.eq_ignore_ascii_case(PDF_CONTENT_TYPE));
    let has_pdf_extension = upload
        .file_name
        .as_deref()
        .is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf"));
    if !is_pdf_type || !has_pdf_extension {
        return Err(AppError::Validation(
            "Only PDF files are supported".to_string(),
        ));
    }

    Ok(())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File size exceeds 1MB limit".to_string())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str, content_type: &str, data: Vec<u8>) -> Upload {
        Upload {
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            data: Bytes::from(data),
        }
    }

    #[test]
    fn test_accepts_pdf() {
        assert!(validate_upload(&upload("resume.PDF", "application/pdf", vec![1; 10])).is_ok());
    }

    #[test]
    fn test_rejects_wrong_type_or_extension() {
        let wrong_type = upload("resume.pdf", "text/plain", vec![1; 10]);
        assert!(matches!(validate_upload(&wrong_type), Err(AppError::Validation(_))));

        let wrong_extension = upload("resume.docx", "application/pdf", vec![1; 10]);
        assert!(matches!(validate_upload(&wrong_extension), Err(AppError::Validation(_))));

        let unnamed = Upload {
            file_name: None,
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(b"%PDF"),
        };
        assert!(matches!(validate_upload(&unnamed), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let value = serde_json::to_value(ParseResumeResponse {
            text: "Jane Doe".to_string(),
            page_count: 2,
            byte_size: 2048,
        })
        .unwrap();
        assert_eq!(value["pageCount"], 2);
        assert_eq!(value["byteSize"], 2048);
        assert!(value.get("page_count").is_none());
    }

    #[test]
    fn test_rejects_oversized_and_empty() {
        let big = upload("resume.pdf", "application/pdf", vec![0; MAX_PDF_BYTES + 1]);
        assert!(matches!(validate_upload(&big), Err(AppError::PayloadTooLarge(_))));

        let empty = upload("resume.pdf", "application/pdf", Vec::new());
        assert!(matches!(validate_upload(&empty), Err(AppError::Validation(_))));
    }
}
