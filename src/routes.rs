use serde::Serialize;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router, console_log};

use crate::error::ApiError;
use crate::models::{
    DEFAULT_DOCUMENT_TYPE, DEFAULT_EXTRACTION_ID, ExtractRequest, ExtractResponse, HealthResponse,
};
use crate::pipeline;

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    Router::new()
        .get("/api/v1/health", health_route)
        .post_async("/api/v1/extract", extract_route)
        .run(req, env)
        .await
}

fn health_route(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    json_response(&HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn extract_route(mut req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let request = match req.json::<ExtractRequest>().await {
        Ok(request) => request,
        Err(_) => {
            return ApiError::BadRequest("request body must be a JSON object".to_string())
                .into_response(DEFAULT_EXTRACTION_ID);
        }
    };

    let extraction_id = request
        .extraction_id
        .clone()
        .unwrap_or_else(|| DEFAULT_EXTRACTION_ID.to_string());

    match extract_response(&request, &extraction_id).await {
        Ok(response) => json_response(&response),
        Err(error) => {
            worker::console_error!("extraction {extraction_id} failed: {error}");
            error.into_response(&extraction_id)
        }
    }
}

async fn extract_response(
    request: &ExtractRequest,
    extraction_id: &str,
) -> std::result::Result<ExtractResponse, ApiError> {
    let file_url = request
        .file_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("fileUrl is required".to_string()))?;
    let document_type = request
        .document_type
        .as_deref()
        .unwrap_or(DEFAULT_DOCUMENT_TYPE);

    console_log!(
        "processing extraction {extraction_id}: {file_url} (type: {document_type})"
    );

    let url = pipeline::resolve_file_url(file_url)?;
    let pdf_bytes = pipeline::fetch_pdf_bytes(url).await?;
    let result = pipeline::extract_tables(&pdf_bytes, document_type)?;

    console_log!(
        "extraction {extraction_id} completed: tables={}, success={}",
        result.table_count,
        result.success
    );

    Ok(pipeline::shape_response(result, extraction_id))
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}
