use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::debug;

use crate::error::RestError;

/// REST API client shared by the exchange adapters
/// Infrastructure component - handles HTTP communication
///
/// Each call is one GET; the response body is always read to completion so
/// the pooled connection is returned whether the call succeeds or not.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: Option<(&'static str, String)>,
}

impl RestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RestError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("terminalcrypto/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RestClient {
            client,
            base_url: base_url.into(),
            api_key: None,
        })
    }

    /// Send `key` in `header` on every request. Empty keys are ignored so
    /// public access stays unauthenticated.
    pub fn with_api_key(mut self, header: &'static str, key: &str) -> Self {
        if !key.is_empty() {
            self.api_key = Some((header, key.to_string()));
        }
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RestError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some((header, key)) = &self.api_key {
            request = request.header(*header, key);
        }

        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, RestError> {
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<ApiError>(&text) {
                return Err(RestError::Api {
                    status: status.as_u16(),
                    code: err.code,
                    msg: err.msg,
                });
            }
            return Err(RestError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| RestError::Parse(e.to_string()))
    }
}

/// Binance-style error body
#[derive(Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}
