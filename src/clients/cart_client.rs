use tokio::sync::{mpsc, watch};
use tracing::{debug, instrument};

use crate::domain::{Cart, ProductId};
use crate::error::CartError;
use crate::messages::CartRequest;

/// Client for the cart service. Clones share the same cart.
///
/// Mutations resolve once the service has applied (or rejected) them; the
/// current cart can be read at any time without a round trip.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
    cart: watch::Receiver<Cart>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>, cart: watch::Receiver<Cart>) -> Self {
        Self { sender, cart }
    }

    /// The cart as of the last completed mutation.
    pub fn cart(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// A receiver that is notified after every committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.cart.clone()
    }

    /// Manual method for special cases (no response needed)
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|e| CartError::ActorCommunicationError(e.to_string()))?;
        Ok(())
    }
}

client_method!(CartClient => fn add_product(product_id: ProductId) -> () as CartRequest::AddProduct, Error = CartError);
client_method!(CartClient => fn remove_product(product_id: ProductId) -> () as CartRequest::RemoveProduct, Error = CartError);
client_method!(CartClient => fn update_product_amount(product_id: ProductId, amount: i64) -> () as CartRequest::UpdateProductAmount, Error = CartError);

#[cfg(test)]
client_method!(CartClient => fn pending_count() -> usize as CartRequest::PendingCount, Error = CartError);
