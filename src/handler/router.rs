//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for size checks,
//! built-in endpoints, route matching and dispatching to the catalog service.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};

use crate::api::{ApiError, EndpointSchema};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::Resolution;
use crate::validation::RawRequest;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(parts.method.as_str(), parts.uri.path(), parts.uri.query());
        entry.http_version = version_label(parts.version).to_string();
        entry
    });

    let mut response = dispatch(&parts, body, &state).await;
    http::apply_common_headers(&mut response, &state.config.http.server_name);

    if let Some(entry) = entry.as_mut() {
        entry.finish(response.status().as_u16(), started.elapsed());
        logger::log_access(entry);
    }
    Ok(response)
}

async fn dispatch<B>(parts: &Parts, body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // 1. Check declared body size
    if let Some(resp) = check_body_size(&parts.headers, state.config.http.max_body_size) {
        return resp;
    }

    let path = parts.uri.path();

    // 2. Built-in endpoints
    if let Some(resp) = builtin_route(&parts.method, path, state) {
        return resp;
    }

    // 3. Catalog routes
    match state.service.resolve(&parts.method, path) {
        Resolution::Matched { target, params } => {
            serve_endpoint(parts, body, target, &params, state).await
        }
        Resolution::MethodNotAllowed { allowed } => {
            logger::log_warning(&format!("Method not allowed: {} {path}", parts.method));
            http::build_405_response(&allowed)
        }
        Resolution::NotFound => not_found(parts, state),
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Health check and OpenAPI document, answered before the catalog routes
fn builtin_route(method: &Method, path: &str, state: &AppState) -> Option<Response<Full<Bytes>>> {
    let routes = &state.config.routes;
    let health = routes.health.enabled && path == routes.health.path;
    let openapi = path == routes.openapi_path;
    if !health && !openapi {
        return None;
    }
    if method != Method::GET {
        return Some(http::build_405_response(&[Method::GET]));
    }

    if health {
        Some(http::json_response(
            StatusCode::OK,
            &serde_json::json!({ "status": "ok" }),
        ))
    } else {
        Some(http::build_json_bytes(
            StatusCode::OK,
            state.service.openapi_document(),
        ))
    }
}

/// 404, or a 307 to the trailing-slash variant when that one is routable
fn not_found(parts: &Parts, state: &AppState) -> Response<Full<Bytes>> {
    if state.config.http.redirect_slashes {
        if let Some(target) = state.service.redirect_target(parts.uri.path()) {
            let location = match parts.uri.query() {
                Some(query) => format!("{target}?{query}"),
                None => target,
            };
            return http::build_redirect_response(&location);
        }
    }
    http::build_404_response()
}

async fn serve_endpoint<B>(
    parts: &Parts,
    body: B,
    endpoint: &EndpointSchema,
    params: &std::collections::HashMap<String, String>,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let body = if endpoint.request.expects_body() {
        match read_body(body, state.config.http.max_body_size).await {
            Ok(bytes) => Some(bytes),
            Err(resp) => return resp,
        }
    } else {
        None
    };

    let query = http::parse_query(parts.uri.query());
    let raw = RawRequest {
        path: Some(params),
        query: Some(&query),
        body: body.as_deref(),
    };

    match state.service.serve(endpoint, &raw) {
        Ok(response) => response,
        Err(error) => {
            if let ApiError::Validation(validation) = &error {
                logger::log_validation_failure(
                    parts.method.as_str(),
                    parts.uri.path(),
                    validation,
                );
            }
            error.into_response()
        }
    }
}

/// Collect the request body, enforcing the size limit on the actual bytes
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("Failed to read request body"))
        }
    }
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
