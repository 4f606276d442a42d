//! Shared HTTP client, error types, and the instance version gate.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use coolify_api_models::{ApiErrorBody, ApiVersion};
use coolify_config::{ConfigError, ResolvedInstance};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

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

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::UnknownInstance { .. }
            | ConfigError::DuplicateInstance { .. }
            | ConfigError::NoInstances
            | ConfigError::InvalidField { .. } => Self::Validation(error.to_string()),
            other => Self::Failure(other.into()),
        }
    }
}

/// Build the HTTP client shared by every request of one invocation.
pub(crate) fn build_http_client(timeout_secs: u64, request_id: &str) -> CliResult<Client> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(request_id)
        .map_err(|_| CliError::failure(anyhow!("request identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);
    default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("coolify-cli/", env!("CARGO_PKG_VERSION")))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))
}

/// Application context passed to command handlers.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) instance: String,
    pub(crate) api_root: Url,
    pub(crate) token: String,
}

impl AppContext {
    pub(crate) fn new(client: Client, resolved: ResolvedInstance) -> Self {
        Self {
            client,
            instance: resolved.name,
            api_root: resolved.api_root,
            token: resolved.token,
        }
    }

    /// Append percent-encoded path segments to the API root.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> CliResult<Url> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|()| CliError::failure(anyhow!("API root {} cannot be a base", self.api_root)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn fetch(&self, url: Url) -> CliResult<String> {
        tracing::debug!(method = "GET", url = %url, "sending request");
        self.execute(self.client.get(url.clone()), &url).await
    }

    pub(crate) async fn post<B>(&self, url: Url, body: &B) -> CliResult<String>
    where
        B: Serialize + ?Sized,
    {
        tracing::debug!(method = "POST", url = %url, "sending request");
        self.execute(self.client.post(url.clone()).json(body), &url)
            .await
    }

    pub(crate) async fn delete(&self, url: Url) -> CliResult<String> {
        tracing::debug!(method = "DELETE", url = %url, "sending request");
        self.execute(self.client.delete(url.clone()), &url).await
    }

    async fn execute(&self, request: RequestBuilder, url: &Url) -> CliResult<String> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|err| CliError::failure(anyhow!("request to {} failed: {err}", url.path())))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %url, "received response");
        if status.is_success() {
            response.text().await.map_err(|err| {
                CliError::failure(anyhow!("failed to read response from {}: {err}", url.path()))
            })
        } else {
            Err(classify_problem(response).await)
        }
    }
}

/// Decode a successful response body into a typed DTO.
pub(crate) fn decode<T: DeserializeOwned>(body: &str, what: &str) -> CliResult<T> {
    serde_json::from_str(body)
        .map_err(|err| CliError::failure(anyhow!("failed to parse {what}: {err}")))
}

/// Decode an acknowledgement body, tolerating unexpected shapes.
pub(crate) fn decode_ack<T: DeserializeOwned + Default>(body: &str) -> T {
    serde_json::from_str(body).unwrap_or_else(|err| {
        tracing::debug!(error = %err, "acknowledgement body did not match the expected shape");
        T::default()
    })
}

/// Classify an HTTP error response into a CLI error.
pub(crate) async fn classify_problem(response: reqwest::Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.summary())
        .unwrap_or(body_text);

    tracing::warn!(status = status.as_u16(), "request rejected by the instance");

    if matches!(
        status,
        StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::CONFLICT
            | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        if message.is_empty() {
            CliError::validation(format!("request rejected with status {status}"))
        } else {
            CliError::validation(message)
        }
    } else if message.is_empty() {
        CliError::failure(anyhow!("request failed with status {status}"))
    } else {
        CliError::failure(anyhow!("{message} (status {status})"))
    }
}

/// Fetch the version reported by the instance.
pub(crate) async fn fetch_version(ctx: &AppContext) -> CliResult<String> {
    let body = ctx.fetch(ctx.endpoint(&["version"])?).await?;
    Ok(body.trim().trim_matches('"').to_string())
}

/// Fail unless the instance runs at least `required`.
pub(crate) async fn ensure_min_version(ctx: &AppContext, required: &str) -> CliResult<()> {
    let required: ApiVersion = required.parse().map_err(|err| {
        CliError::failure(anyhow!("invalid minimum version '{required}': {err}"))
    })?;

    let reported = fetch_version(ctx).await?;
    let current: ApiVersion = reported.parse().map_err(|err| {
        CliError::failure(anyhow!(
            "instance reported an unparseable version '{reported}': {err}"
        ))
    })?;

    if current < required {
        return Err(CliError::validation(format!(
            "this command requires Coolify {required} or newer; instance '{}' runs {current}",
            ctx.instance
        )));
    }
    tracing::debug!(%current, %required, "version requirement satisfied");
    Ok(())
}
