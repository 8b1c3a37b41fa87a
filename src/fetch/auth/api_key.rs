use crate::error::DataAccessError;
use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};

/// An [`HttpClient`] wrapper that injects an API token as an HTTP header.
///
/// Header name and value are validated once at construction so that
/// every request can reuse them.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    /// Sends `header_name: key` with every request.
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self, DataAccessError> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .map_err(|e| DataAccessError::InvalidRequest(format!("invalid header name: {e}")))?;
        let mut value = HeaderValue::from_str(key)
            .map_err(|e| DataAccessError::InvalidRequest(format!("invalid header value: {e}")))?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Uses `Authorization: Bearer <key>`, the scheme LMS REST APIs expect.
    pub fn bearer(inner: C, key: &str) -> Result<Self, DataAccessError> {
        Self::new(inner, AUTHORIZATION.as_str(), &format!("Bearer {key}"))
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
