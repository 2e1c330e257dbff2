use nvr_extract::OutputTable;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOCUMENT_TYPE: &str = "NVR";
pub const DEFAULT_EXTRACTION_ID: &str = "default";
pub const EXTRACTION_METHOD: &str = "ruled_line_nvr_specific";

/// Body accepted by `POST /api/v1/extract`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractRequest {
    pub file_url: Option<String>,
    pub document_type: Option<String>,
    pub extraction_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Completed,
    CompletedNoTables,
    Failed,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub extractor_version: String,
    pub document_type: String,
    pub extraction_method: String,
    pub table_count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractResponse {
    #[serde(rename = "extractionId")]
    pub extraction_id: String,
    pub status: ExtractionStatus,
    pub tables: Vec<OutputTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub metadata: ResponseMetadata,
}

/// Error payload for failed extractions; `tables` stays empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureResponse {
    #[serde(rename = "extractionId")]
    pub extraction_id: String,
    pub status: ExtractionStatus,
    pub error: String,
    pub tables: Vec<OutputTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
