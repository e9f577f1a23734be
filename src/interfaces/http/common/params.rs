//! Path and query extractors answering with the normalized error body
//!
//! Drop-in replacements for `axum::extract::{Path, Query}`. A parameter that
//! cannot be bound to its target type becomes `VALIDATION_FAILED` with the
//! parameter name as `path`.

use axum::extract::path::ErrorKind as PathErrorKind;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{FromRequestParts, MatchedPath, Path, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::application::errors::{ErrorNormalizer, NormalizedError};
use crate::support::errors::{DomainError, ErrorKind};

pub struct ApiPath<T>(pub T);

pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ApiPath(value)),
            Err(rejection) => {
                let route = parts.extensions.get::<MatchedPath>();
                Err(path_rejection(rejection, route))
            }
        }
    }
}

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(query_rejection)
    }
}

fn path_rejection(rejection: PathRejection, route: Option<&MatchedPath>) -> ApiError {
    let unbound = match &rejection {
        PathRejection::FailedToDeserializePathParams(e) => match e.kind() {
            PathErrorKind::ParseErrorAtKey {
                key,
                value,
                expected_type,
            } => Some(DomainError::invalid_parameter(key, value, *expected_type)),
            // Tuple and single-value paths carry no key; take it from the route
            PathErrorKind::ParseErrorAtIndex {
                index,
                value,
                expected_type,
            } => route
                .and_then(|r| route_params(r.as_str()).into_iter().nth(*index))
                .map(|name| DomainError::invalid_parameter(name, value, *expected_type)),
            PathErrorKind::ParseError {
                value,
                expected_type,
            } => route
                .and_then(|r| single_param(r.as_str()))
                .map(|name| DomainError::invalid_parameter(name, value, *expected_type)),
            _ => None,
        },
        _ => None,
    };

    match unbound {
        Some(err) => ApiError::bad_request(ErrorNormalizer::new().normalize(&err)),
        None => ApiError::bad_request(NormalizedError {
            kind: ErrorKind::ValidationFailed,
            message: format!("Invalid path: {}", rejection.body_text()),
            path: None,
        }),
    }
}

fn query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(NormalizedError {
        kind: ErrorKind::ValidationFailed,
        message: format!("Invalid query string: {}", rejection.body_text()),
        path: None,
    })
}

/// `{param}` names of a route template, in order
fn route_params(route: &str) -> Vec<&str> {
    route
        .split('/')
        .filter_map(|seg| seg.strip_prefix('{')?.strip_suffix('}'))
        .collect()
}

fn single_param(route: &str) -> Option<&str> {
    match route_params(route).as_slice() {
        [only] => Some(*only),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Paging {
        #[allow(dead_code)]
        limit: u32,
    }

    async fn by_id(ApiPath(id): ApiPath<i32>) -> String {
        id.to_string()
    }

    async fn by_pair(ApiPath((_course, _review)): ApiPath<(i32, i32)>) -> &'static str {
        "ok"
    }

    async fn paged(ApiQuery(_paging): ApiQuery<Paging>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/items/{id}", get(by_id))
            .route("/courses/{course_id}/reviews/{review_id}", get(by_pair))
            .route("/items", get(paged))
    }

    async fn send(uri: &str) -> Response {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn finds_route_parameters() {
        assert_eq!(route_params("/a/{x}/b/{y}"), vec!["x", "y"]);
        assert_eq!(single_param("/api/v1/reviews/{id}"), Some("id"));
        assert_eq!(single_param("/a/{x}/b/{y}"), None);
        assert_eq!(single_param("/health"), None);
    }

    #[tokio::test]
    async fn bound_path_passes_through() {
        let resp = send("/items/7").await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unbindable_single_segment_names_the_parameter() {
        let resp = send("/items/abc").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "VALIDATION_FAILED");
        assert_eq!(json["path"], "id");
        assert_eq!(
            json["error"],
            "Parameter: 'id' is not valid. Value 'abc' could not be bound to type i32"
        );
    }

    #[tokio::test]
    async fn unbindable_segment_among_several_names_its_position() {
        let resp = send("/courses/42/reviews/x").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["path"], "review_id");
    }

    #[tokio::test]
    async fn malformed_query_uses_the_error_body() {
        let resp = send("/items?limit=lots").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let json = body_json(resp).await;
        assert_eq!(json["kind"], "VALIDATION_FAILED");
        assert!(json["error"].as_str().unwrap().starts_with("Invalid query string"));
    }
}
