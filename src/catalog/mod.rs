//! Remote product catalog and stock lookups.

pub mod http;

pub use http::HttpCatalog;

use async_trait::async_trait;

use crate::domain::{CatalogProduct, ProductId, Stock};
use crate::error::CatalogError;

/// Request/response access to the catalog and stock service.
#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    /// Product metadata for `id`. `Ok(None)` when the service has no usable record.
    async fn fetch_product(&self, id: ProductId) -> Result<Option<CatalogProduct>, CatalogError>;

    /// Current available inventory for `id`.
    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, CatalogError>;
}
