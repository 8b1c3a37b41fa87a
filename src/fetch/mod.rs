mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::DataAccessError;
use serde::de::DeserializeOwned;

/// Issues a GET through `client` and decodes the JSON body as `T`.
///
/// Non-success statuses become [`DataAccessError::Status`] carrying the body.
pub async fn fetch_json<C: HttpClient + ?Sized, T: DeserializeOwned>(
    client: &C,
    url: &str,
) -> Result<T, DataAccessError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| DataAccessError::InvalidRequest(format!("{url}: {e}")))?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DataAccessError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
