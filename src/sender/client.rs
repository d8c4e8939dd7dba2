use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::DeliveryOutcome;
use crate::config::{ConfigError, RetryStatusSet, Settings};
use crate::record::{self, ProjectedRecord, RawRecord};
use crate::serializer::{self, SerializationError};

/// HTTP delivery client for one configured endpoint.
///
/// Owns a single underlying connection, reused across calls and returned to a
/// neutral state after each one. `deliver` takes `&mut self` because the wire
/// exchange is a strict request/response with no interleaving; concurrent
/// callers must construct independent clients.
pub struct DeliveryClient {
    client: Client,
    settings: Settings,
    extra_headers: HeaderMap,
    attempt_budget: Duration,
}

impl DeliveryClient {
    pub fn new(settings: Settings) -> Result<Self, ConfigError> {
        let client = ClientBuilder::new()
            .connect_timeout(settings.open_timeout)
            .timeout(settings.read_timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| {
                ConfigError::InvalidConfig(format!("failed to build HTTP client: {e}"))
            })?;

        let extra_headers = build_header_map(&settings)?;
        let attempt_budget = settings.open_timeout + settings.read_timeout;

        Ok(Self {
            client,
            settings,
            extra_headers,
            attempt_budget,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Delivers one chunk of raw records.
    ///
    /// Projects every record per the configured flags (order preserved),
    /// encodes the batch, POSTs it and classifies the result. A
    /// `SerializationError` aborts before any network activity; everything
    /// after that surfaces as a [`DeliveryOutcome`].
    pub async fn deliver(
        &mut self,
        chunk: &[RawRecord],
    ) -> Result<DeliveryOutcome, SerializationError> {
        let batch: Vec<ProjectedRecord> = chunk
            .iter()
            .map(|r| record::project(r, self.settings.include_tag, self.settings.include_time))
            .collect();
        let payload = serializer::encode(self.settings.serializer, &batch)?;

        debug!(
            records = chunk.len(),
            bytes = payload.body.len(),
            endpoint = %self.settings.endpoint.url(),
            "sending chunk"
        );

        let request = self
            .client
            .post(self.settings.endpoint.url().clone())
            .headers(self.extra_headers.clone())
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body);

        let response = match timeout(self.attempt_budget, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Ok(self.transport_failure(&err.to_string())),
            Err(_) => return Ok(self.transport_failure("request timed out")),
        };

        let status = response.status();
        // Drain the body so the connection goes back to the pool reusable.
        let _ = response.bytes().await;

        let outcome = classify_status(status, &self.settings.retry_statuses);
        match &outcome {
            DeliveryOutcome::Delivered => {
                info!(status = status.as_u16(), records = chunk.len(), "chunk delivered");
            }
            DeliveryOutcome::RetryableFailure(reason) => {
                warn!(%reason, "chunk will be retried");
            }
            DeliveryOutcome::Dropped(reason) => {
                warn!(%reason, "chunk dropped");
            }
        }
        Ok(outcome)
    }

    fn transport_failure(&self, detail: &str) -> DeliveryOutcome {
        if self.settings.retry_on_connect_error {
            warn!(detail, "transport error, chunk will be retried");
            DeliveryOutcome::RetryableFailure(format!("transport error: {detail}"))
        } else {
            warn!(detail, "transport error, chunk dropped");
            DeliveryOutcome::Dropped(format!("transport error: {detail}"))
        }
    }
}

impl std::fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("settings", &self.settings)
            .field("extra_headers", &self.extra_headers)
            .finish()
    }
}

/// Maps a received status code to an outcome.
///
/// Membership in the retry set wins over the 2xx test, so operators can force
/// retries on any code, a nominally successful one included.
fn classify_status(status: StatusCode, retry_statuses: &RetryStatusSet) -> DeliveryOutcome {
    let code = status.as_u16();
    if retry_statuses.contains(code) {
        DeliveryOutcome::RetryableFailure(format!("server returned status {code}"))
    } else if !status.is_success() {
        DeliveryOutcome::Dropped(format!("server returned status {code}"))
    } else {
        DeliveryOutcome::Delivered
    }
}

fn build_header_map(settings: &Settings) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    for (key, value) in settings.endpoint.extra_headers() {
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            ConfigError::InvalidHeaders(format!("'{key}' is not a valid header name: {e}"))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ConfigError::InvalidHeaders(format!("value for '{key}' is not a valid header: {e}"))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry_set(codes: &[u16]) -> RetryStatusSet {
        codes.iter().copied().collect()
    }

    #[test]
    fn status_in_retry_set_is_retryable() {
        let outcome = classify_status(StatusCode::INTERNAL_SERVER_ERROR, &retry_set(&[500]));
        assert_eq!(
            outcome,
            DeliveryOutcome::RetryableFailure("server returned status 500".to_string())
        );
    }

    #[test]
    fn non_2xx_outside_retry_set_is_dropped() {
        let outcome = classify_status(StatusCode::NOT_FOUND, &retry_set(&[]));
        assert_eq!(
            outcome,
            DeliveryOutcome::Dropped("server returned status 404".to_string())
        );
    }

    #[test]
    fn any_2xx_is_delivered() {
        assert!(classify_status(StatusCode::OK, &retry_set(&[])).is_delivered());
        assert!(classify_status(StatusCode::CREATED, &retry_set(&[])).is_delivered());
        assert!(classify_status(StatusCode::NO_CONTENT, &retry_set(&[])).is_delivered());
    }

    #[test]
    fn retry_set_wins_over_2xx() {
        let outcome = classify_status(StatusCode::OK, &retry_set(&[200]));
        assert!(outcome.is_retryable());
    }
}
