use nvr_extract::{ExtractOptions, RunResult, extract_nvr_tables_from_bytes};
use url::Url;
use worker::Fetch;

use crate::error::ApiError;
use crate::models::{EXTRACTION_METHOD, ExtractResponse, ExtractionStatus, ResponseMetadata};

const GCS_PUBLIC_HOST: &str = "https://storage.googleapis.com";

/// Turn the request's `fileUrl` into a fetchable URL. `gs://bucket/object`
/// references resolve through the public storage host; plain `http(s)` URLs
/// pass through.
pub fn resolve_file_url(file_url: &str) -> Result<Url, ApiError> {
    if let Some(rest) = file_url.strip_prefix("gs://") {
        let (bucket, object) = rest
            .split_once('/')
            .filter(|(bucket, object)| !bucket.is_empty() && !object.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest(format!(
                    "invalid GCS URL '{file_url}', expected gs://bucket/object"
                ))
            })?;

        let encoded = object
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        return Ok(Url::parse(&format!("{GCS_PUBLIC_HOST}/{bucket}/{encoded}"))?);
    }

    if file_url.starts_with("http://") || file_url.starts_with("https://") {
        return Ok(Url::parse(file_url)?);
    }

    Err(ApiError::BadRequest(format!(
        "unsupported file URL format: '{file_url}'"
    )))
}

pub async fn fetch_pdf_bytes(url: Url) -> Result<Vec<u8>, ApiError> {
    let mut response = Fetch::Url(url).send().await?;
    let status = response.status_code();
    if status >= 400 {
        return Err(ApiError::Upstream(format!(
            "failed to fetch PDF source: status {status}"
        )));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ApiError::Upstream("fetched PDF is empty".to_string()));
    }
    Ok(bytes)
}

pub fn extract_tables(pdf_bytes: &[u8], document_type: &str) -> Result<RunResult, ApiError> {
    let result =
        extract_nvr_tables_from_bytes(pdf_bytes, document_type, &ExtractOptions::default())?;
    Ok(result)
}

/// Shape the library result into the HTTP response body. A clean run that
/// found nothing reports `completed_no_tables`, not an error.
pub fn shape_response(result: RunResult, extraction_id: &str) -> ExtractResponse {
    let status = if result.table_count == 0 {
        ExtractionStatus::CompletedNoTables
    } else {
        ExtractionStatus::Completed
    };
    let message = (status == ExtractionStatus::CompletedNoTables)
        .then(|| "No NVR species tables found in document".to_string());

    ExtractResponse {
        extraction_id: extraction_id.to_string(),
        status,
        message,
        metadata: ResponseMetadata {
            extractor_version: result.metadata.extractor_version.clone(),
            document_type: result.document_type.clone(),
            extraction_method: EXTRACTION_METHOD.to_string(),
            table_count: result.table_count,
        },
        tables: result.tables,
    }
}
