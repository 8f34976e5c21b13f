use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::CatalogApi;
use crate::domain::{CatalogProduct, ProductId, Stock};
use crate::error::CatalogError;

/// Catalog client for a JSON HTTP API exposing `/products/{id}` and `/stock/{id}`.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    http: Client,
}

impl HttpCatalog {
    /// Creates a client rooted at `base_url`. Requests never time out unless `timeout` is set.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn product_url(&self, id: ProductId) -> String {
        format!("{}/products/{}", self.base_url, id)
    }

    pub fn stock_url(&self, id: ProductId) -> String {
        format!("{}/stock/{}", self.base_url, id)
    }

    /// GETs `url` and decodes the body. A 404 maps to `Ok(None)`.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, CatalogError> {
        debug!(url, "Sending catalog request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), url, "Catalog request failed");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .json::<Option<T>>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    #[instrument(skip(self))]
    async fn fetch_product(&self, id: ProductId) -> Result<Option<CatalogProduct>, CatalogError> {
        self.get_json(&self.product_url(id)).await
    }

    #[instrument(skip(self))]
    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let url = self.stock_url(id);
        self.get_json(&url).await?.ok_or(CatalogError::Status {
            status: StatusCode::NOT_FOUND.as_u16(),
            url,
        })
    }
}
