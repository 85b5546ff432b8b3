//! Shared request plumbing for the HTTP clients.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use workstation_core::{Result, WorkstationError};

/// Joins `base` and `route` with exactly one `/`.
pub(crate) fn join_url(base: &str, route: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

/// Sends the request and maps transport failures and non-2xx statuses.
pub(crate) async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|err| WorkstationError::network(format!("Request failed: {err}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        return Err(map_http_error(status, &body));
    }

    Ok(response)
}

/// Sends the request and parses a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = send(request).await?;
    response.json::<T>().await.map_err(|err| WorkstationError::Serialization {
        format: "JSON".to_string(),
        message: format!("Failed to parse response: {err}"),
    })
}

/// Builds a `Backend` error, preferring the FastAPI `detail` field.
pub(crate) fn map_http_error(status: StatusCode, body: &str) -> WorkstationError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(Value::String(detail)) => Some(detail.clone()),
            Some(detail) => Some(detail.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.to_string());

    WorkstationError::backend(status.as_u16(), message)
}
