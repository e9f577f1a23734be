//! HTTP/JSON client for the course catalog
//!
//! `GET {base_url}/api/v1/courses/{id}` answers 200 with a course summary or
//! 404 with a `NOT_FOUND` error body on `course_id` when the catalog has no
//! such course. Everything else, a bare 404 included, is an outage.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::{CourseCatalog, CourseId, CourseSummary};
use crate::shared::{retry_with_backoff, RetryConfig};
use crate::support::errors::{LookupFailure, UnreachableCause};

/// Timeouts and retry budget for catalog calls
#[derive(Debug, Clone)]
pub struct LookupPolicy {
    /// Whole-call bound, connect included
    pub call_timeout: Duration,
    /// TCP connect bound; must not exceed `call_timeout`
    pub connect_timeout: Duration,
    /// TCP keep-alive on pooled connections
    pub keepalive: Duration,
    pub retry: RetryConfig,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            keepalive: Duration::from_secs(3),
            retry: RetryConfig::default(),
        }
    }
}

/// Error body the catalog attaches to its 404s
#[derive(Debug, Deserialize)]
struct CatalogErrorBody {
    kind: String,
    #[serde(default)]
    path: Option<String>,
}

impl CatalogErrorBody {
    fn is_course_absent(&self) -> bool {
        self.kind == "NOT_FOUND" && self.path.as_deref() == Some("course_id")
    }
}

/// Catalog client over a pooled `reqwest::Client`.
///
/// Connections are opened lazily on first use and re-established by the pool
/// after a drop, so construction never touches the network.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    base_url: String,
    policy: LookupPolicy,
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>, policy: LookupPolicy) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(policy.call_timeout)
            .connect_timeout(policy.connect_timeout)
            .tcp_keepalive(policy.keepalive)
            .build()?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn course_url(&self, id: CourseId) -> String {
        format!("{}/api/v1/courses/{}", self.base_url, id)
    }

    async fn fetch_once(&self, id: CourseId) -> Result<CourseSummary, LookupFailure> {
        let unreachable = |cause: UnreachableCause| LookupFailure::Unreachable { course_id: id, cause };

        let response = self
            .client
            .get(self.course_url(id))
            .send()
            .await
            .map_err(|e| unreachable(classify_send_error(&e)))?;

        match response.status() {
            StatusCode::OK => response
                .json::<CourseSummary>()
                .await
                .map_err(|e| unreachable(classify_body_error(&e))),
            StatusCode::NOT_FOUND => match response.json::<CatalogErrorBody>().await {
                Ok(body) if body.is_course_absent() => Err(LookupFailure::NotFound { course_id: id }),
                Ok(body) => Err(unreachable(UnreachableCause::Protocol(format!(
                    "404 with unexpected error kind {} on {:?}",
                    body.kind, body.path
                )))),
                Err(e) if e.is_decode() => Err(unreachable(UnreachableCause::Protocol(
                    "404 without a catalog error body".to_string(),
                ))),
                Err(e) => Err(unreachable(classify_body_error(&e))),
            },
            status @ (StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT) => Err(unreachable(UnreachableCause::Transport(
                format!("catalog answered {}", status),
            ))),
            status => Err(unreachable(UnreachableCause::Protocol(format!(
                "unexpected status {}",
                status
            )))),
        }
    }
}

fn classify_send_error(e: &reqwest::Error) -> UnreachableCause {
    if e.is_timeout() {
        UnreachableCause::Timeout
    } else {
        UnreachableCause::Transport(e.to_string())
    }
}

fn classify_body_error(e: &reqwest::Error) -> UnreachableCause {
    if e.is_timeout() {
        UnreachableCause::Timeout
    } else if e.is_decode() {
        UnreachableCause::Protocol(format!("undecodable course body: {}", e))
    } else {
        UnreachableCause::Transport(e.to_string())
    }
}

fn outcome_label(result: &Result<CourseSummary, LookupFailure>) -> &'static str {
    match result {
        Ok(_) => "found",
        Err(LookupFailure::NotFound { .. }) => "not_found",
        Err(LookupFailure::Unreachable {
            cause: UnreachableCause::Timeout,
            ..
        }) => "timeout",
        Err(LookupFailure::Unreachable { .. }) => "unreachable",
    }
}

#[async_trait]
impl CourseCatalog for HttpCatalogClient {
    async fn lookup_course(&self, id: CourseId) -> Result<CourseSummary, LookupFailure> {
        debug!(course_id = id, url = %self.course_url(id), "Looking up course");

        let result = retry_with_backoff(
            self.policy.retry.clone(),
            move || self.fetch_once(id),
            LookupFailure::is_transient,
            "catalog_lookup",
        )
        .await;

        let outcome = outcome_label(&result);
        metrics::counter!("catalog_lookups_total", "outcome" => outcome).increment(1);
        match &result {
            Ok(course) => info!(course_id = id, name = %course.name, "Course found in catalog"),
            Err(LookupFailure::NotFound { .. }) => info!(course_id = id, "Course not in catalog"),
            Err(err) => warn!(course_id = id, error = %err, "Catalog lookup failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_course_urls_without_double_slashes() {
        let client =
            HttpCatalogClient::new("http://catalog:8080/", LookupPolicy::default()).unwrap();
        assert_eq!(client.base_url(), "http://catalog:8080");
        assert_eq!(client.course_url(42), "http://catalog:8080/api/v1/courses/42");
    }

    #[test]
    fn only_a_course_id_not_found_body_means_absent() {
        let parse = |raw: &str| serde_json::from_str::<CatalogErrorBody>(raw).unwrap();

        assert!(parse(r#"{"success":false,"error":"x","kind":"NOT_FOUND","path":"course_id"}"#)
            .is_course_absent());
        assert!(!parse(r#"{"kind":"NOT_FOUND"}"#).is_course_absent());
        assert!(!parse(r#"{"kind":"VALIDATION_FAILED","path":"course_id"}"#).is_course_absent());
    }

    #[test]
    fn labels_outcomes_for_metrics() {
        let timeout = Err(LookupFailure::Unreachable {
            course_id: 1,
            cause: UnreachableCause::Timeout,
        });
        let missing = Err(LookupFailure::NotFound { course_id: 1 });
        assert_eq!(outcome_label(&timeout), "timeout");
        assert_eq!(outcome_label(&missing), "not_found");
    }
}
