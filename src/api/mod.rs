// API module entry
// Item catalog service: endpoint schemas, routing table and handlers

mod catalog;
mod handlers;
mod openapi;
mod schema;
mod types;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use thiserror::Error;

use crate::http;
use crate::logger;
use crate::routing::{Resolution, Router};
use crate::validation::{RawRequest, ValidationError};

use catalog::Catalog;
use schema::Operation;

pub use schema::EndpointSchema;

/// Why a matched request did not produce a 200
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("validated input did not bind to its model: {0}")]
    Binding(#[from] serde_json::Error),
}

impl ApiError {
    pub fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Self::Validation(error) => http::build_422_response(&error),
            Self::Binding(error) => {
                logger::log_error(&format!("Failed to bind request: {error}"));
                http::build_500_response()
            }
        }
    }
}

/// The item catalog service
///
/// Holds everything built at startup: the catalog, one schema per endpoint,
/// the route table over those schemas and the rendered OpenAPI document.
pub struct CatalogService {
    catalog: Catalog,
    endpoints: Vec<EndpointSchema>,
    router: Router<usize>,
    openapi: Bytes,
}

impl Default for CatalogService {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogService {
    pub fn new() -> Self {
        let endpoints = schema::endpoints();

        let mut router = Router::new();
        for (index, endpoint) in endpoints.iter().enumerate() {
            router.add(endpoint.method.clone(), endpoint.path, index);
        }

        let document = openapi::build_document(&endpoints);
        let openapi = serde_json::to_vec(&document).map_or_else(
            |e| {
                logger::log_error(&format!("Failed to render OpenAPI document: {e}"));
                Bytes::new()
            },
            Bytes::from,
        );

        Self {
            catalog: Catalog::placeholder(),
            endpoints,
            router,
            openapi,
        }
    }

    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<&EndpointSchema> {
        match self.router.resolve(method, path) {
            Resolution::Matched { target, params } => match self.endpoints.get(target) {
                Some(endpoint) => Resolution::Matched {
                    target: endpoint,
                    params,
                },
                None => Resolution::NotFound,
            },
            Resolution::MethodNotAllowed { allowed } => Resolution::MethodNotAllowed { allowed },
            Resolution::NotFound => Resolution::NotFound,
        }
    }

    pub fn redirect_target(&self, path: &str) -> Option<String> {
        self.router.redirect_target(path)
    }

    pub fn openapi_document(&self) -> Bytes {
        self.openapi.clone()
    }

    /// Validate the raw inputs against the endpoint schema, then run its handler
    pub fn serve(
        &self,
        endpoint: &EndpointSchema,
        raw: &RawRequest<'_>,
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        let input = endpoint.request.validate(raw)?;

        let response = match endpoint.operation {
            Operation::ReadRoot => http::json_response(StatusCode::OK, &handlers::read_root()),
            Operation::ReadItem => {
                http::json_response(StatusCode::OK, &handlers::read_item(input.params()?))
            }
            Operation::UpdateItem => http::json_response(
                StatusCode::OK,
                &handlers::update_item(input.params()?, input.body()?),
            ),
            Operation::ReadItems => http::json_response(
                StatusCode::OK,
                handlers::read_items(&input.params()?, &self.catalog),
            ),
            Operation::ReadUserItem => {
                http::json_response(StatusCode::OK, &handlers::read_user_item(input.params()?))
            }
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn body_json(response: Response<Full<Bytes>>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn endpoint<'a>(
        service: &'a CatalogService,
        method: &Method,
        path: &str,
    ) -> (&'a EndpointSchema, HashMap<String, String>) {
        match service.resolve(method, path) {
            Resolution::Matched { target, params } => (target, params),
            _ => panic!("{method} {path} did not resolve"),
        }
    }

    #[tokio::test]
    async fn test_update_item_round_trip() {
        let service = CatalogService::new();
        let (schema, params) = endpoint(&service, &Method::PUT, "/items/7");
        let body = json!({
            "name": "Foo",
            "price": 35.4,
            "description": "A very nice Item",
            "tax": 3.2,
            "tags": ["metal", "rock"],
            "images": [{"url": "https://example.com/baz.jpg", "name": "The Foo live", "price": 1.5}]
        });
        let bytes = serde_json::to_vec(&body).unwrap();
        let raw = RawRequest {
            path: Some(&params),
            query: None,
            body: Some(bytes.as_slice()),
        };

        let response = service.serve(schema, &raw).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"item_id": 7, "item": body}));
    }

    #[test]
    fn test_serve_rejects_before_handler() {
        let service = CatalogService::new();
        let (schema, params) = endpoint(&service, &Method::GET, "/items/abc");
        let raw = RawRequest {
            path: Some(&params),
            ..RawRequest::default()
        };
        match service.serve(schema, &raw) {
            Err(ApiError::Validation(error)) => {
                assert_eq!(error.violations().len(), 1);
                assert_eq!(error.violations()[0].kind.code(), "string_too_short");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_openapi_document_is_rendered() {
        let service = CatalogService::new();
        let document: Value = serde_json::from_slice(&service.openapi_document()).unwrap();
        assert_eq!(document["openapi"], "3.1.0");
    }
}
