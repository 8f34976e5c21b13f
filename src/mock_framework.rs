//! # Mock Framework
//!
//! Utilities for testing the cart service against a catalog the test controls.
//!
//! Use [`create_mock_catalog`] to get a catalog and a receiver of its requests,
//! then answer them with [`expect_product`] / [`expect_stock`]. Because the test
//! decides when (and whether) each lookup resolves, interleavings that race in
//! production can be replayed deterministically.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cart_actor::CartService;
use crate::catalog::CatalogApi;
use crate::clients::CartClient;
use crate::domain::{Cart, CatalogProduct, ProductId, Stock};
use crate::error::{CartError, CatalogError, StoreError};
use crate::store::{CartRepository, KeyValueStore, MemoryStore, CART_KEY};

pub type ProductResponder = oneshot::Sender<Result<Option<CatalogProduct>, CatalogError>>;
pub type StockResponder = oneshot::Sender<Result<Stock, CatalogError>>;

/// A lookup made by the service, waiting for the test to answer it.
#[derive(Debug)]
pub enum CatalogRequest {
    Product {
        id: ProductId,
        respond_to: ProductResponder,
    },
    Stock {
        id: ProductId,
        respond_to: StockResponder,
    },
}

/// Catalog that forwards every lookup to a channel.
pub struct MockCatalog {
    sender: mpsc::Sender<CatalogRequest>,
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<CatalogProduct>, CatalogError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CatalogRequest::Product { id, respond_to })
            .await
            .map_err(|_| CatalogError::Transport("mock catalog closed".to_string()))?;
        response
            .await
            .map_err(|_| CatalogError::Transport("mock request dropped".to_string()))?
    }

    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(CatalogRequest::Stock { id, respond_to })
            .await
            .map_err(|_| CatalogError::Transport("mock catalog closed".to_string()))?;
        response
            .await
            .map_err(|_| CatalogError::Transport("mock request dropped".to_string()))?
    }
}

/// Creates a mock catalog and a receiver for asserting and answering its lookups.
pub fn create_mock_catalog(buffer_size: usize) -> (Arc<MockCatalog>, mpsc::Receiver<CatalogRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (Arc::new(MockCatalog { sender }), receiver)
}

/// Helper to verify that the next lookup is a product fetch
pub async fn expect_product(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, ProductResponder)> {
    match receiver.recv().await {
        Some(CatalogRequest::Product { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next lookup is a stock fetch
pub async fn expect_stock(
    receiver: &mut mpsc::Receiver<CatalogRequest>,
) -> Option<(ProductId, StockResponder)> {
    match receiver.recv().await {
        Some(CatalogRequest::Stock { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Catalog with fixed answers. Unknown products have no record and no stock entry.
#[derive(Default)]
pub struct StaticCatalog {
    products: HashMap<ProductId, CatalogProduct>,
    stock: HashMap<ProductId, u32>,
}

impl StaticCatalog {
    pub fn with_product(mut self, product: CatalogProduct, stock: u32) -> Self {
        self.stock.insert(product.id, stock);
        self.products.insert(product.id, product);
        self
    }
}

#[async_trait]
impl CatalogApi for StaticCatalog {
    async fn fetch_product(&self, id: ProductId) -> Result<Option<CatalogProduct>, CatalogError> {
        Ok(self.products.get(&id).cloned())
    }

    async fn fetch_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.stock
            .get(&id)
            .map(|amount| Stock::new(id, *amount))
            .ok_or(CatalogError::Status {
                status: 404,
                url: format!("/stock/{}", id),
            })
    }
}

/// Store whose writes always fail; reads see `initial`.
pub struct FailingStore {
    pub initial: Option<Vec<u8>>,
}

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.initial.clone())
    }

    fn set(&self, _key: &str, _value: Vec<u8>) -> Result<(), StoreError> {
        Err(StoreError::Backend("disk full".to_string()))
    }
}

pub fn shoe(id: ProductId) -> CatalogProduct {
    CatalogProduct::new(id, format!("Shoe {}", id), 100.0, format!("https://cdn/shoe-{}.png", id))
}

/// A running cart service wired to an in-memory store and a failure channel.
pub struct TestCart {
    pub client: CartClient,
    pub store: MemoryStore,
    pub failures: mpsc::UnboundedReceiver<CartError>,
    pub handle: JoinHandle<()>,
}

impl TestCart {
    /// The cart as currently persisted.
    pub fn persisted(&self) -> Cart {
        CartRepository::new(self.store.clone(), CART_KEY).load().unwrap()
    }

    pub fn persisted_bytes(&self) -> Option<Vec<u8>> {
        self.store.get(CART_KEY).unwrap()
    }
}

/// Starts a cart service over `store` (its snapshot is loaded first) and `catalog`.
pub fn start_cart(store: MemoryStore, catalog: Arc<dyn CatalogApi>) -> TestCart {
    let repository = CartRepository::new(store.clone(), CART_KEY);
    let cart = repository.load().unwrap();
    let (notifier, failures) = mpsc::unbounded_channel();
    let (service, client) = CartService::new(10, cart, repository, catalog, Arc::new(notifier));
    let handle = tokio::spawn(service.run());
    TestCart {
        client,
        store,
        failures,
        handle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_catalog() {
        let (catalog, mut receiver) = create_mock_catalog(10);

        let lookup = tokio::spawn(async move { catalog.fetch_product(3).await });

        let (id, responder) = expect_product(&mut receiver).await.expect("Expected product lookup");
        assert_eq!(id, 3);
        responder.send(Ok(Some(shoe(3)))).unwrap();

        let result = lookup.await.unwrap();
        assert_eq!(result, Ok(Some(shoe(3))));
    }

    #[tokio::test]
    async fn test_dropped_responder_is_transport_error() {
        let (catalog, mut receiver) = create_mock_catalog(10);

        let lookup = tokio::spawn(async move { catalog.fetch_stock(3).await });

        let (_, responder) = expect_stock(&mut receiver).await.expect("Expected stock lookup");
        drop(responder);

        assert!(matches!(lookup.await.unwrap(), Err(CatalogError::Transport(_))));
    }
}
