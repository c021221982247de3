//! Shared HTTP client, error types, and telemetry wiring for the CLI.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::anyhow;
use nbx_api_models::ApiErrorBody;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Serialize;

use crate::cli::Cli;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

/// Dependencies constructed from environment flags and CLI options.
#[derive(Clone)]
pub(crate) struct CliDependencies {
    pub(crate) client: Client,
    pub(crate) telemetry: Option<TelemetryEmitter>,
}

impl CliDependencies {
    /// Construct a configured HTTP client and optional telemetry emitter.
    pub(crate) fn from_env(cli: &Cli, trace_id: &str) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(trace_id).map_err(|_| {
            CliError::failure(anyhow!("trace identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(cli.timeout))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            telemetry: TelemetryEmitter::from_env(),
        })
    }
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) token: Option<String>,
}

impl AppContext {
    /// Start a request against the selected environment, attaching the API
    /// token header when one is configured.
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "dispatching request");
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Token {token}")),
            None => builder,
        }
    }

    /// Write operations need a token; fail fast before touching the network.
    pub(crate) fn require_token(&self) -> CliResult<()> {
        if self.token.is_some() {
            Ok(())
        } else {
            Err(CliError::validation(
                "an API token is required for write operations (set one in the \
                 environment config, or pass --token / NBX_TOKEN)",
            ))
        }
    }
}

/// Telemetry emitter used to forward CLI outcomes.
#[derive(Clone)]
pub(crate) struct TelemetryEmitter {
    pub(crate) client: Client,
    pub(crate) endpoint: Url,
}

impl TelemetryEmitter {
    #[must_use]
    pub(crate) fn from_env() -> Option<Self> {
        let endpoint = std::env::var("NBX_TELEMETRY_ENDPOINT").ok()?;
        let endpoint = endpoint.parse().ok()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .ok()?;
        Some(Self { client, endpoint })
    }

    pub(crate) async fn emit(
        &self,
        trace_id: &str,
        command: &str,
        outcome: &str,
        exit_code: i32,
        message: Option<&str>,
    ) {
        let event = TelemetryEvent {
            command,
            outcome,
            trace_id,
            exit_code,
            message,
            timestamp_ms: timestamp_now_ms(),
        };

        if let Err(err) = self
            .client
            .post(self.endpoint.clone())
            .json(&event)
            .send()
            .await
        {
            tracing::debug!(error = %err, "telemetry emit failed");
        }
    }
}

#[derive(Serialize)]
struct TelemetryEvent<'a> {
    command: &'a str,
    outcome: &'a str,
    trace_id: &'a str,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    timestamp_ms: u64,
}

/// Millisecond timestamp helper for telemetry.
#[must_use]
pub(crate) fn timestamp_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Classify a failed HTTP response into a CLI error.
///
/// NetBox reports operational errors as `{"detail": …}` and validation
/// errors as per-field message arrays; both flatten through
/// [`ApiErrorBody::message`]. Statuses the server uses to reject the
/// request's content map to validation errors, everything else is an
/// operational failure.
pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).to_string();
    let body = serde_json::from_slice::<ApiErrorBody>(&bytes).ok();
    let message = body.as_ref().and_then(ApiErrorBody::message);

    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        CliError::validation(message.unwrap_or_else(|| body_text.trim().to_string()))
    } else {
        let detail = if let Some(message) = message {
            format!("{message} (status {status})")
        } else if !body_text.trim().is_empty() {
            format!("{} (status {status})", body_text.trim())
        } else {
            format!("request failed with status {status}")
        };
        CliError::failure(anyhow!(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::MockServer;
    use httpmock::prelude::*;

    async fn response_from(server: &MockServer, path: &str) -> reqwest::Response {
        Client::new()
            .get(format!("{}{path}", server.base_url()))
            .send()
            .await
            .expect("send request")
    }

    #[tokio::test]
    async fn classify_problem_maps_bad_request_to_validation() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/boom");
            then.status(400)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"slug": ["Enter a valid slug."]}));
        });

        let err = classify_problem(response_from(&server, "/boom").await).await;
        assert!(
            matches!(err, CliError::Validation(message) if message.contains("Enter a valid slug."))
        );
    }

    #[tokio::test]
    async fn classify_problem_surfaces_detail_on_failures() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/denied");
            then.status(403)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({"detail": "Invalid token"}));
        });

        let err = classify_problem(response_from(&server, "/denied").await).await;
        match err {
            CliError::Failure(error) => {
                let text = format!("{error:#}");
                assert!(text.contains("Invalid token"));
                assert!(text.contains("403"));
            }
            CliError::Validation(message) => panic!("unexpected validation error: {message}"),
        }
    }

    #[tokio::test]
    async fn classify_problem_handles_empty_bodies() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/empty");
            then.status(502);
        });

        let err = classify_problem(response_from(&server, "/empty").await).await;
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("502"));
    }

    #[tokio::test]
    async fn telemetry_emitter_emits_event() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/telemetry");
            then.status(200);
        });

        let emitter = TelemetryEmitter {
            client: Client::new(),
            endpoint: format!("{}/telemetry", server.base_url())
                .parse()
                .expect("valid URL"),
        };

        emitter
            .emit("trace", "region_ls", "success", 0, Some("message"))
            .await;

        mock.assert();
    }

    #[test]
    fn require_token_rejects_missing_credentials() {
        let ctx = AppContext {
            client: Client::new(),
            base_url: "http://127.0.0.1:8000".parse().expect("valid URL"),
            token: None,
        };
        let err = ctx.require_token().expect_err("token should be required");
        assert_eq!(err.exit_code(), 2);
    }
}
