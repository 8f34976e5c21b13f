use tokio::sync::oneshot;

use crate::domain::ProductId;
use crate::error::CartError;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests understood by the cart service. Each variant carries its
/// parameters and a oneshot channel for the outcome.
#[derive(Debug)]
pub enum CartRequest {
    AddProduct {
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    },
    RemoveProduct {
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    },
    UpdateProductAmount {
        product_id: ProductId,
        amount: i64,
        respond_to: ServiceResponse<(), CartError>,
    },
    Shutdown,
    #[cfg(test)]
    PendingCount {
        respond_to: ServiceResponse<usize, CartError>,
    },
}
