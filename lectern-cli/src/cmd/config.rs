use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lectern_client::events::{EventSink, NoOpEventSink, StderrEventSink};
use lectern_client::http::ReqwestHttpClient;
use lectern_client::retry::{JitterMode, RetryConfig};
use lectern_client::{ApiClient, ApiError, ClientConfig, ClientError, RetryingClient};

use crate::exit_codes;
use crate::output::print_error;
use crate::utils::redact_url_password;
use crate::{ClientArgs, EventsMode, JitterArg, OutputArgs, RetryArgs, TextInputArgs};

pub const BASE_URL_ENV: &str = "LECTERN_BASE_URL";

/// `--base-url`, then `LECTERN_BASE_URL`, then the local default.
pub fn resolve_base_url(client: &ClientArgs) -> String {
    client
        .base_url
        .clone()
        .or_else(|| {
            std::env::var(BASE_URL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
        })
        .unwrap_or_else(|| lectern_client::client::DEFAULT_BASE_URL.to_string())
}

pub fn parse_base_url(raw: &str) -> Result<url::Url, String> {
    let url = url::Url::parse(raw)
        .map_err(|e| format!("invalid base URL {}: {e}", redact_url_password(raw)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported base URL scheme: {other}")),
    }
}

pub fn build_retry_config(retry: &RetryArgs) -> RetryConfig {
    let defaults = RetryConfig::default();
    RetryConfig {
        max_attempts: retry.retry_max_attempts.unwrap_or(defaults.max_attempts),
        base_delay: retry
            .retry_base_delay
            .map(Duration::from_millis)
            .unwrap_or(defaults.base_delay),
        max_delay: retry
            .retry_max_delay
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay),
        jitter: match retry.retry_jitter {
            JitterArg::None => JitterMode::None,
            JitterArg::Full => JitterMode::Full,
        },
        ..defaults
    }
}

pub fn build_event_sink(client: &ClientArgs) -> Arc<dyn EventSink> {
    match client.events {
        EventsMode::None => Arc::new(NoOpEventSink),
        EventsMode::Stderr => Arc::new(StderrEventSink),
    }
}

/// Builds the API client, or prints the problem and returns the exit code.
pub fn build_client(
    client: &ClientArgs,
    retry: &RetryArgs,
    output: &OutputArgs,
) -> Result<ApiClient, i32> {
    let base_url = match parse_base_url(&resolve_base_url(client)) {
        Ok(u) => u,
        Err(msg) => {
            print_error(output.format, output.quiet, &msg);
            return Err(exit_codes::INPUT_ERROR);
        }
    };

    let mut config = ClientConfig::new(base_url);
    config.attempt_timeout = Duration::from_millis(client.timeout);
    config.max_response_bytes = client.max_response_bytes;
    config.retry = build_retry_config(retry);

    let http = match ReqwestHttpClient::new() {
        Ok(h) => h,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to create http client: {e}"),
            );
            return Err(exit_codes::RUNTIME_ERROR);
        }
    };

    let retrying =
        RetryingClient::new(Arc::new(http), config).with_event_sink(build_event_sink(client));
    Ok(ApiClient::new(retrying))
}

/// Cancelled requests are dropped without a message.
pub fn report_api_error(output: &OutputArgs, err: &ApiError) -> i32 {
    let code = api_error_exit_code(err);
    if code != exit_codes::CANCELLED {
        print_error(output.format, output.quiet, &err.to_string());
    }
    code
}

pub fn api_error_exit_code(err: &ApiError) -> i32 {
    match err {
        ApiError::Client(ClientError::Cancelled) => exit_codes::CANCELLED,
        ApiError::Client(ClientError::PendingRetryExhausted { .. }) => exit_codes::TIMED_OUT,
        ApiError::Client(_) | ApiError::Decode { .. } => exit_codes::REQUEST_FAILED,
        ApiError::InvalidBaseUrl { .. } | ApiError::InvalidEndpoint { .. } => exit_codes::INPUT_ERROR,
    }
}

/// Text from the positional argument or `--file`; blank input is rejected.
pub fn read_text_input(input: &TextInputArgs, output: &OutputArgs) -> Result<String, i32> {
    let text = match (&input.text, &input.file) {
        (Some(t), _) => t.clone(),
        (None, Some(path)) => read_file(path, output)?,
        (None, None) => {
            print_error(
                output.format,
                output.quiet,
                "no text given: pass TEXT or --file PATH",
            );
            return Err(exit_codes::INPUT_ERROR);
        }
    };
    if text.trim().is_empty() {
        print_error(output.format, output.quiet, "text must not be empty");
        return Err(exit_codes::INPUT_ERROR);
    }
    Ok(text)
}

pub fn read_file(path: &Path, output: &OutputArgs) -> Result<String, i32> {
    std::fs::read_to_string(path).map_err(|e| {
        print_error(
            output.format,
            output.quiet,
            &format!("failed to read {}: {e}", path.display()),
        );
        exit_codes::INPUT_ERROR
    })
}
