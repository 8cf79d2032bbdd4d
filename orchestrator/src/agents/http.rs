use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::HttpFailure;

pub(crate) fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Sends `body` as JSON and decodes a 2xx JSON reply. Non-2xx replies keep
/// their status and raw body.
pub(crate) async fn post_json<B, T>(request: RequestBuilder, body: &B) -> Result<T, HttpFailure>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let response = request.json(body).send().await?;
    let status = response.status();

    if !status.is_success() {
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Failed to read HTTP {} error body: {}", status, e);
                format!("<unreadable body: {}>", e)
            }
        };
        return Err(HttpFailure::ErrorResponse {
            status: status.as_u16(),
            body,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| HttpFailure::Malformed {
        message: format!("failed to parse response body: {}", e),
    })
}
