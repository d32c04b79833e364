//! HTTP client for the Rainforest product-data API.
//!
//! Every request is a `GET` against a single endpoint with the request type
//! and the static API key carried as query parameters. Failures are returned
//! once; retrying is left to whoever runs the command again.

mod store;

use std::time::Duration;

use asinkit_core::{FetchFailure, FetchStatus, ProductRecord, ProductSource};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::RainforestError;
use crate::failure::{classify_error, classify_response};
use crate::normalize::normalize_product;
use crate::types::ProductResponse;

pub const DEFAULT_BASE_URL: &str = "https://api.rainforestapi.com/request";

/// Client for the Rainforest API.
///
/// Use [`RainforestClient::new`] for production or
/// [`RainforestClient::with_base_url`] to point at a mock server in tests.
pub struct RainforestClient {
    client: Client,
    api_key: String,
    amazon_domain: String,
    base_url: Url,
}

impl RainforestClient {
    /// Creates a client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RainforestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        amazon_domain: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RainforestError> {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, amazon_domain, timeout_secs, user_agent)
    }

    /// Creates a client with a custom endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`RainforestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RainforestError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        amazon_domain: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, RainforestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let base_url = Url::parse(base_url).map_err(|e| RainforestError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            amazon_domain: amazon_domain.to_owned(),
            base_url,
        })
    }

    /// Fetches the raw `type=product` response body for `asin`.
    ///
    /// # Errors
    ///
    /// - [`RainforestError::Http`] on network failure.
    /// - [`RainforestError::UnexpectedStatus`] on a non-2xx status.
    /// - [`RainforestError::Deserialize`] if the body is not JSON.
    pub async fn fetch_product_json(&self, asin: &str) -> Result<Value, RainforestError> {
        let url = self.build_url("product", &[("asin", asin)]);
        self.request_json(&url, &format!("type=product asin={asin}"))
            .await
    }

    /// Fetches `asin` and normalizes it into a [`ProductRecord`].
    ///
    /// # Errors
    ///
    /// Returns a [`FetchFailure`] whose status is classified by
    /// [`crate::failure`] when no request could be completed or the response
    /// carried no `product` object.
    pub async fn fetch_product(&self, asin: &str) -> Result<ProductRecord, FetchFailure> {
        tracing::debug!(asin, "fetching product");
        let body = match self.fetch_product_json(asin).await {
            Ok(body) => body,
            Err(err) => {
                let status = classify_error(&err);
                tracing::warn!(asin, %status, error = %err, "product request failed");
                return Err(FetchFailure::new(asin, status, err.to_string()));
            }
        };

        decode_product(asin, body).inspect_err(|failure| {
            tracing::warn!(
                asin,
                status = %failure.status,
                detail = %failure.detail,
                "product response incomplete"
            );
        })
    }

    /// Builds the request URL with properly percent-encoded query parameters.
    fn build_url(&self, request_type: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            pairs.append_pair("amazon_domain", &self.amazon_domain);
            pairs.append_pair("type", request_type);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body
    /// as JSON.
    ///
    /// `context` names the request in errors; the URL itself is never logged
    /// because it carries the API key.
    async fn request_json(&self, url: &Url, context: &str) -> Result<Value, RainforestError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RainforestError::UnexpectedStatus {
                status: status.as_u16(),
                context: context.to_owned(),
            });
        }

        let body = response.text().await.map_err(reqwest::Error::without_url)?;
        serde_json::from_str(&body).map_err(|e| RainforestError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

impl ProductSource for RainforestClient {
    async fn fetch(&self, asin: &str) -> Result<ProductRecord, FetchFailure> {
        self.fetch_product(asin).await
    }
}

/// Turns a response body into a record, or a classified failure when the
/// `product` object is missing or malformed.
///
/// List entries that do not decode are dropped one by one (see
/// [`crate::types`]); only a malformed scalar field fails the product. A
/// product that does not echo its ASIN takes the requested one.
fn decode_product(asin: &str, body: Value) -> Result<ProductRecord, FetchFailure> {
    if !body.get("product").is_some_and(Value::is_object) {
        let status = classify_response(&body);
        let detail = body
            .get("request_info")
            .and_then(|r| r.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("response carried no product")
            .to_owned();
        return Err(FetchFailure::new(asin, status, detail));
    }

    let response: ProductResponse = serde_json::from_value(body).map_err(|e| {
        FetchFailure::new(asin, FetchStatus::Unknown, format!("malformed product: {e}"))
    })?;

    let mut record = response
        .product
        .map(normalize_product)
        .ok_or_else(|| FetchFailure::new(asin, FetchStatus::Unknown, "response carried no product"))?;
    if record.asin.is_empty() {
        asin.clone_into(&mut record.asin);
    }
    Ok(record)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
