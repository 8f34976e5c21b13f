use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::cart_actor::CartService;
use crate::catalog::{CatalogApi, HttpCatalog};
use crate::clients::CartClient;
use crate::config::CartConfig;
use crate::error::{CartError, SystemError};
use crate::notify::{Notifier, TracingNotifier};
use crate::store::{CartRepository, SledStore};

/// Composition root: restores the cart, starts the cart service and owns its task.
pub struct CartSystem {
    pub cart_client: CartClient,
    handle: JoinHandle<()>,
}

impl CartSystem {
    /// Loads the persisted cart and starts the service.
    ///
    /// Fails if the stored snapshot cannot be read; the stored value is left as is.
    #[instrument(name = "cart_system", skip_all)]
    pub fn start(
        repository: CartRepository,
        catalog: Arc<dyn CatalogApi>,
        notifier: Arc<dyn Notifier>,
        buffer_size: usize,
    ) -> Result<Self, SystemError> {
        info!(key = repository.key(), "Starting cart system");

        let cart = repository.load()?;
        let (service, cart_client) =
            CartService::new(buffer_size, cart, repository, catalog, notifier);
        let handle = tokio::spawn(service.run());

        info!("Cart system started successfully");
        Ok(Self {
            cart_client,
            handle,
        })
    }

    /// Starts a system backed by the HTTP catalog and the sled store named in `config`.
    pub fn from_config(config: &CartConfig) -> Result<Self, SystemError> {
        let store = SledStore::open(config.store_path())?;
        let repository = CartRepository::new(store, config.storage_key.clone());
        let catalog = HttpCatalog::new(config.catalog_url.clone(), config.request_timeout)?;

        Self::start(
            repository,
            Arc::new(catalog),
            Arc::new(TracingNotifier),
            config.channel_capacity,
        )
    }

    /// Stops taking requests, lets pending lookups finish and waits for the service.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), CartError> {
        info!("Shutting down cart system");

        self.cart_client.shutdown().await?;
        drop(self.cart_client);

        if let Err(e) = self.handle.await {
            error!(error = ?e, "Cart service task failed");
            return Err(CartError::ActorCommunicationError(e.to_string()));
        }

        info!("Cart system shutdown complete");
        Ok(())
    }
}
