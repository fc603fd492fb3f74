use crate::domain::{Document, DomainError};

pub fn is_pdf(filename: &str, content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || filename.to_ascii_lowercase().ends_with(".pdf")
}

/// Turns an uploaded file into a `Document`. PDFs go through text
/// extraction; anything else must already be UTF-8 text.
///
/// PDF parsing is CPU-bound, so async callers should run this on the
/// blocking pool.
pub fn document_from_upload(
    filename: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<Document, DomainError> {
    let text = if is_pdf(filename, content_type) {
        pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| DomainError::validation(format!("could not read PDF: {e}")))?
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DomainError::validation("uploaded file must be a PDF or UTF-8 text"))?
    };

    tracing::debug!(filename, chars = text.chars().count(), "upload decoded");
    Ok(Document::new(filename, text))
}
