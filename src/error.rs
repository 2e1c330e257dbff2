use std::fmt::{Display, Formatter};

use worker::{Response, Result};

use crate::models::{ExtractionStatus, FailureResponse};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Upstream(String),
    Extraction(String),
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Upstream(_) => "upstream_error",
            Self::Extraction(_) => "extraction_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message)
            | Self::Upstream(message)
            | Self::Extraction(message)
            | Self::Internal(message) => message,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Upstream(_) => 502,
            Self::Extraction(_) | Self::Internal(_) => 500,
        }
    }

    pub fn into_response(self, extraction_id: &str) -> Result<Response> {
        let status_code = self.status_code();
        let mut response = Response::from_json(&FailureResponse {
            extraction_id: extraction_id.to_string(),
            status: ExtractionStatus::Failed,
            error: format!("{}: {}", self.code(), self.message()),
            tables: Vec::new(),
        })?;
        response.headers_mut().set("Cache-Control", "no-store")?;
        Ok(response.with_status(status_code))
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl std::error::Error for ApiError {}

impl From<worker::Error> for ApiError {
    fn from(error: worker::Error) -> Self {
        Self::Internal(error.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl From<nvr_extract::ExtractError> for ApiError {
    fn from(error: nvr_extract::ExtractError) -> Self {
        Self::Extraction(error.to_string())
    }
}
