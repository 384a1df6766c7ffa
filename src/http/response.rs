//! HTTP response building module
//!
//! Builders for the JSON responses the service emits. Every error body uses
//! the `{"detail": ...}` shape.

use chrono::Utc;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE, DATE, LOCATION, SERVER};
use hyper::{Method, Response, StatusCode};
use serde::Serialize;

use crate::validation::ValidationError;

const JSON: &str = "application/json";

/// Build JSON response
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json_bytes(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_500_response()
        }
    }
}

/// Build a JSON response from pre-serialized bytes
pub fn build_json_bytes(status: StatusCode, json: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, JSON)
        .body(Full::new(json))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn detail(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &serde_json::json!({ "detail": message }))
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    detail(StatusCode::BAD_REQUEST, message)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    detail(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allowed: &[Method]) -> Response<Full<Bytes>> {
    let mut response = detail(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&allow) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    detail(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
}

/// Build 422 response listing every violation
pub fn build_422_response(error: &ValidationError) -> Response<Full<Bytes>> {
    json_response(StatusCode::UNPROCESSABLE_ENTITY, &error.report())
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_json_bytes(
        StatusCode::INTERNAL_SERVER_ERROR,
        Bytes::from_static(br#"{"detail":"Internal Server Error"}"#),
    )
}

/// Build 307 redirect response (method and body preserved by the client)
pub fn build_redirect_response(target: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::TEMPORARY_REDIRECT)
        .header(LOCATION, target)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::TEMPORARY_REDIRECT, &e);
            fallback(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

/// Stamp the headers every response carries
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, server_name: &str) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert(SERVER, value);
    }
    let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    if let Ok(value) = HeaderValue::from_str(&date) {
        headers.insert(DATE, value);
    }
}

fn fallback(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
