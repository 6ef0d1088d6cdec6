//! HTTP transport for the Open Exchange Rates API.

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::url::PreparedRequest;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum retry attempts for failed requests.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Errors that can occur while talking to the API.
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server kept failing after all retries.
    #[error("Server error: {status} (gave up after {attempts} retries)")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Retries performed.
        attempts: u32,
    },

    /// The API rejected the request.
    #[error("API error {status}: {message}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Api {
        /// HTTP status code.
        status: u16,
        /// Short error code, e.g. `invalid_app_id`.
        message: String,
        /// Human-readable explanation, when the API sent one.
        description: Option<String>,
    },
}

/// Error body returned by the API on 4xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    description: Option<String>,
}

impl FetchError {
    fn from_response_body(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(body) {
            Ok(parsed) => Self::Api {
                status: status.as_u16(),
                message: parsed.message,
                description: parsed.description,
            },
            Err(_) => Self::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
                description: None,
            },
        }
    }
}

/// HTTP client with timeouts and retry on transient failures.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a new API client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(ClientConfig::default())
    }

    /// Sends the request and parses the response body as JSON.
    ///
    /// Connection failures, timeouts, 5xx and 429 responses are retried with
    /// exponential backoff. Any other non-success status fails immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails after all retries, the API
    /// rejects it, or the body is not JSON.
    pub async fn get_json(&self, request: &PreparedRequest) -> Result<Value, FetchError> {
        let mut attempts = 0;

        loop {
            let mut builder = self.client.get(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        if attempts < self.config.max_retries {
                            attempts += 1;
                            let delay = self.calculate_backoff_delay(attempts);
                            warn!(
                                "{} returned {status}, retry {attempts}/{} in {delay:?}",
                                request.redacted_url(),
                                self.config.max_retries
                            );
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                        return Err(FetchError::ServerError {
                            status: status.as_u16(),
                            attempts,
                        });
                    }

                    if !status.is_success() {
                        let body = match response.text().await {
                            Ok(body) => body,
                            Err(e) => {
                                debug!(
                                    "{} returned {status} with unreadable body: {}",
                                    request.redacted_url(),
                                    e.without_url()
                                );
                                String::new()
                            }
                        };
                        return Err(FetchError::from_response_body(status, &body));
                    }

                    return response
                        .json::<Value>()
                        .await
                        .map_err(|e| e.without_url().into());
                }
                Err(e) if Self::is_retryable_error(&e) && attempts < self.config.max_retries => {
                    attempts += 1;
                    let delay = self.calculate_backoff_delay(attempts);
                    let e = e.without_url();
                    warn!(
                        "{} failed ({e}), retry {attempts}/{} in {delay:?}",
                        request.redacted_url(),
                        self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e.without_url().into()),
            }
        }
    }

    /// Calculates the backoff delay with exponential backoff and jitter.
    fn calculate_backoff_delay(&self, attempt: u32) -> Duration {
        let exp_delay = self
            .config
            .base_delay_ms
            .saturating_mul(1u64 << attempt.min(10));

        let capped_delay = exp_delay.min(self.config.max_delay_ms);

        // Deterministic jitter within ±25%
        let jitter_range = capped_delay / 4;
        let jitter = if jitter_range > 0 {
            let jitter_offset = (u64::from(attempt) * 17) % (jitter_range * 2);
            jitter_offset as i64 - jitter_range as i64
        } else {
            0
        };

        let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
        Duration::from_millis(final_delay)
    }

    /// Determines if an error is retryable.
    fn is_retryable_error(error: &reqwest::Error) -> bool {
        if error.is_builder() || error.is_decode() {
            return false;
        }

        error.is_timeout() || error.is_connect() || error.is_request()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.base_delay_ms, 500);
        assert_eq!(config.max_delay_ms, 30_000);
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = ApiClient::with_defaults();
        assert!(client.is_ok());
    }

    #[test]
    fn test_backoff_delay_calculation() {
        let client = ApiClient::with_defaults().unwrap();

        let delay1 = client.calculate_backoff_delay(1);
        assert!(delay1.as_millis() >= 750 && delay1.as_millis() <= 1250);

        let delay2 = client.calculate_backoff_delay(2);
        assert!(delay2.as_millis() >= 1500 && delay2.as_millis() <= 2500);

        let delay_high = client.calculate_backoff_delay(20);
        assert!(delay_high.as_millis() <= 37_500);
    }

    #[test]
    fn test_api_error_body() {
        let body = r#"{"error":true,"status":401,"message":"invalid_app_id","description":"Invalid App ID provided."}"#;
        let err = FetchError::from_response_body(StatusCode::UNAUTHORIZED, body);
        assert_eq!(
            err.to_string(),
            "API error 401: invalid_app_id (Invalid App ID provided.)"
        );
    }

    #[test]
    fn test_api_error_without_json_body() {
        let err = FetchError::from_response_body(StatusCode::NOT_FOUND, "<html>nope</html>");
        assert_eq!(err.to_string(), "API error 404: Not Found");
    }

    #[tokio::test]
    async fn test_truncated_error_body_falls_back_to_status() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            // Promises more body than it sends, then hangs up.
            let _ = socket
                .write_all(b"HTTP/1.1 401 X\r\nContent-Length: 100\r\nConnection: close\r\n\r\n{\"mess")
                .await;
            let _ = socket.shutdown().await;
        });

        let client = ApiClient::new(ClientConfig {
            max_retries: 0,
            ..ClientConfig::default()
        })
        .unwrap();
        let request = PreparedRequest {
            url: format!("http://{addr}/historical/2023-04-22.json?app_id=secret"),
            headers: vec![],
        };

        match client.get_json(&request).await {
            Err(FetchError::Api {
                status,
                message,
                description,
            }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Unauthorized");
                assert_eq!(description, None);
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }
}
