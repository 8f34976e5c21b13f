use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn, Instrument, Span};

use super::lane::{CartOp, InFlight, Lookup, Pending, ProductLane, Queued};
use crate::catalog::CatalogApi;
use crate::clients::CartClient;
use crate::domain::{Cart, CatalogProduct, Product, ProductId, Stock};
use crate::error::{CartError, CartOperation, CatalogError};
use crate::messages::{CartRequest, ServiceResponse};
use crate::notify::Notifier;
use crate::store::CartRepository;

/// Owner of the cart. Applies add/remove/update requests, persists every
/// successful change and publishes the new cart to observers.
///
/// Catalog and stock lookups run in spawned tasks and report back through an
/// internal channel, so the service keeps serving other products while a
/// lookup is pending. Requests for a product with an operation in flight wait
/// in that product's lane and start once it completes.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    lookups: mpsc::UnboundedReceiver<Lookup>,
    lookup_sender: mpsc::UnboundedSender<Lookup>,
    cart: Cart,
    observers: watch::Sender<Cart>,
    repository: CartRepository,
    catalog: Arc<dyn CatalogApi>,
    notifier: Arc<dyn Notifier>,
    lanes: HashMap<ProductId, ProductLane>,
    accepting: bool,
}

impl CartService {
    pub fn new(
        buffer_size: usize,
        cart: Cart,
        repository: CartRepository,
        catalog: Arc<dyn CatalogApi>,
        notifier: Arc<dyn Notifier>,
    ) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (lookup_sender, lookups) = mpsc::unbounded_channel();
        let (observers, cart_receiver) = watch::channel(cart.clone());
        let service = Self {
            receiver,
            lookups,
            lookup_sender,
            cart,
            observers,
            repository,
            catalog,
            notifier,
            lanes: HashMap::new(),
            accepting: true,
        };
        let client = CartClient::new(sender, cart_receiver);
        (service, client)
    }

    /// Main actor loop. After shutdown (or once every client is dropped) it
    /// stops taking requests but keeps going until all lanes are drained.
    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!(items = self.cart.len(), "CartService starting");

        loop {
            tokio::select! {
                msg = self.receiver.recv(), if self.accepting => match msg {
                    Some(request) => self.handle_request(request),
                    None => {
                        debug!("All clients dropped");
                        self.accepting = false;
                    }
                },
                Some(lookup) = self.lookups.recv() => self.handle_lookup(lookup),
                else => break,
            }

            if !self.accepting && self.lanes.is_empty() {
                break;
            }
        }

        info!("CartService stopped");
    }

    fn handle_request(&mut self, request: CartRequest) {
        match request {
            CartRequest::AddProduct {
                product_id,
                respond_to,
            } => self.submit(product_id, CartOp::Add, respond_to),
            CartRequest::RemoveProduct {
                product_id,
                respond_to,
            } => self.submit(product_id, CartOp::Remove, respond_to),
            CartRequest::UpdateProductAmount {
                product_id,
                amount,
                respond_to,
            } => self.submit(product_id, CartOp::SetAmount(amount), respond_to),
            CartRequest::Shutdown => {
                info!(in_flight = self.lanes.len(), "CartService shutting down");
                self.accepting = false;
            }
            #[cfg(test)]
            CartRequest::PendingCount { respond_to } => {
                let _ = respond_to.send(Ok(self.lanes.values().map(ProductLane::len).sum()));
            }
        }
    }

    fn submit(
        &mut self,
        product_id: ProductId,
        op: CartOp,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        if let Some(lane) = self.lanes.get_mut(&product_id) {
            debug!(
                product_id,
                ?op,
                queued = lane.waiting.len() + 1,
                "Operation in flight for product, queueing"
            );
            lane.waiting.push_back(Queued { op, respond_to });
            return;
        }
        self.start(product_id, op, respond_to);
    }

    fn start(
        &mut self,
        product_id: ProductId,
        op: CartOp,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        match op {
            CartOp::Add => self.handle_add_product(product_id, respond_to),
            CartOp::Remove => self.handle_remove_product(product_id, respond_to),
            CartOp::SetAmount(amount) => {
                self.handle_update_product_amount(product_id, amount, respond_to)
            }
        }
    }

    #[instrument(fields(product_id = %product_id), skip(self, respond_to))]
    fn handle_add_product(
        &mut self,
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        debug!("Processing add_product request");

        if let Some(amount) = self.cart.amount_of(product_id) {
            let next_amount = i64::from(amount) + 1;
            debug!(next_amount, "Product already in cart, incrementing");
            self.handle_update_product_amount(product_id, next_amount, respond_to);
            return;
        }

        let in_flight = InFlight {
            pending: Pending::Add,
            expected: None,
            respond_to,
        };
        self.lanes.insert(product_id, ProductLane::new(in_flight));
        self.spawn_product_lookup(product_id);
    }

    #[instrument(fields(product_id = %product_id), skip(self, respond_to))]
    fn handle_remove_product(
        &mut self,
        product_id: ProductId,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        debug!("Processing remove_product request");

        let result = match self.cart.without(product_id) {
            Some(next) => self.commit(next, CartOperation::Remove, product_id),
            None => {
                error!("Product not in cart");
                Err(CartError::NotInCart {
                    operation: CartOperation::Remove,
                    product_id,
                })
            }
        };

        if result.is_ok() {
            info!("Product removed from cart");
        }
        self.reply(respond_to, result);
    }

    #[instrument(fields(product_id = %product_id, amount = %amount), skip(self, respond_to))]
    fn handle_update_product_amount(
        &mut self,
        product_id: ProductId,
        amount: i64,
        respond_to: ServiceResponse<(), CartError>,
    ) {
        debug!("Processing update_product_amount request");

        if amount <= 0 {
            debug!("Ignoring non-positive amount");
            let _ = respond_to.send(Ok(()));
            return;
        }

        let Some(current) = self.cart.amount_of(product_id) else {
            error!("Product not in cart");
            self.reply(
                respond_to,
                Err(CartError::NotInCart {
                    operation: CartOperation::UpdateAmount,
                    product_id,
                }),
            );
            return;
        };

        // Anything past u32::MAX can never be covered by a stock level.
        let requested = u32::try_from(amount).unwrap_or(u32::MAX);
        let in_flight = InFlight {
            pending: Pending::SetAmount(requested),
            expected: Some(current),
            respond_to,
        };
        self.lanes.insert(product_id, ProductLane::new(in_flight));
        self.spawn_stock_lookup(product_id);
    }

    fn spawn_product_lookup(&self, product_id: ProductId) {
        let catalog = Arc::clone(&self.catalog);
        let lookups = self.lookup_sender.clone();
        tokio::spawn(
            async move {
                let result = catalog.fetch_product(product_id).await;
                let _ = lookups.send(Lookup::Product { product_id, result });
            }
            .instrument(Span::current()),
        );
    }

    fn spawn_stock_lookup(&self, product_id: ProductId) {
        let catalog = Arc::clone(&self.catalog);
        let lookups = self.lookup_sender.clone();
        tokio::spawn(
            async move {
                let result = catalog.fetch_stock(product_id).await;
                let _ = lookups.send(Lookup::Stock { product_id, result });
            }
            .instrument(Span::current()),
        );
    }

    fn handle_lookup(&mut self, lookup: Lookup) {
        let product_id = lookup.product_id();
        let Some(lane) = self.lanes.remove(&product_id) else {
            warn!(product_id, "Lookup resolved with no operation in flight");
            return;
        };
        let ProductLane { in_flight, waiting } = lane;

        let operation = in_flight.pending.operation();
        let result = if !in_flight.is_current(&self.cart, product_id) {
            warn!(product_id, %operation, "Line changed while lookup was pending, discarding result");
            Err(CartError::Superseded {
                operation,
                product_id,
            })
        } else {
            match (in_flight.pending, lookup) {
                (Pending::Add, Lookup::Product { result, .. }) => {
                    self.resolve_add(product_id, result)
                }
                (Pending::SetAmount(requested), Lookup::Stock { result, .. }) => {
                    self.resolve_update(product_id, requested, result)
                }
                (_, lookup) => {
                    error!(product_id, ?lookup, "Lookup does not match the operation in flight");
                    Err(CartError::ServiceFailure {
                        operation,
                        product_id,
                        reason: "unexpected lookup result".to_string(),
                    })
                }
            }
        };

        self.reply(in_flight.respond_to, result);
        self.drain(product_id, waiting);
    }

    #[instrument(fields(product_id = %product_id), skip(self, result))]
    fn resolve_add(
        &mut self,
        product_id: ProductId,
        result: Result<Option<CatalogProduct>, CatalogError>,
    ) -> Result<(), CartError> {
        let failure = |reason: String| CartError::ServiceFailure {
            operation: CartOperation::Add,
            product_id,
            reason,
        };

        let record = match result {
            Ok(Some(record)) if record.id == product_id => record,
            Ok(Some(record)) => {
                error!(returned_id = record.id, "Catalog returned a different product");
                return Err(failure(format!("catalog returned product {}", record.id)));
            }
            Ok(None) => {
                error!("Product not found in catalog");
                return Err(failure("product not found in catalog".to_string()));
            }
            Err(e) => {
                error!(error = %e, "Product lookup failed");
                return Err(failure(e.to_string()));
            }
        };

        let next = self
            .cart
            .with_line(Product::from_catalog(record, 1))
            .ok_or(CartError::Superseded {
                operation: CartOperation::Add,
                product_id,
            })?;
        self.commit(next, CartOperation::Add, product_id)?;

        info!("Product added to cart");
        Ok(())
    }

    #[instrument(fields(product_id = %product_id, requested = %requested), skip(self, result))]
    fn resolve_update(
        &mut self,
        product_id: ProductId,
        requested: u32,
        result: Result<Stock, CatalogError>,
    ) -> Result<(), CartError> {
        let stock = match result {
            Ok(stock) => stock,
            Err(e) => {
                error!(error = %e, "Stock lookup failed");
                return Err(CartError::ServiceFailure {
                    operation: CartOperation::UpdateAmount,
                    product_id,
                    reason: e.to_string(),
                });
            }
        };

        if !stock.covers(requested) {
            warn!(available = stock.amount, "Requested quantity exceeds stock");
            return Err(CartError::StockExceeded {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let next = self
            .cart
            .with_amount(product_id, requested)
            .ok_or(CartError::Superseded {
                operation: CartOperation::UpdateAmount,
                product_id,
            })?;
        self.commit(next, CartOperation::UpdateAmount, product_id)?;

        info!(available = stock.amount, "Product amount updated");
        Ok(())
    }

    /// Persists `next`, then makes it the current cart. On a failed save the
    /// previous cart stays current in memory and in the store.
    fn commit(
        &mut self,
        next: Cart,
        operation: CartOperation,
        product_id: ProductId,
    ) -> Result<(), CartError> {
        if let Err(e) = self.repository.save(&next) {
            error!(error = %e, "Failed to persist cart, keeping previous snapshot");
            return Err(CartError::Persistence {
                operation,
                product_id,
                reason: e.to_string(),
            });
        }

        self.cart = next;
        self.observers.send_replace(self.cart.clone());
        Ok(())
    }

    fn reply(&self, respond_to: ServiceResponse<(), CartError>, result: Result<(), CartError>) {
        if let Err(error) = &result {
            self.notifier.notify(error);
        }
        let _ = respond_to.send(result);
    }

    /// Starts queued operations for a product until one of them has to wait on a lookup.
    fn drain(&mut self, product_id: ProductId, mut waiting: VecDeque<Queued>) {
        while let Some(Queued { op, respond_to }) = waiting.pop_front() {
            self.start(product_id, op, respond_to);
            if let Some(lane) = self.lanes.get_mut(&product_id) {
                lane.waiting.extend(waiting);
                return;
            }
        }
    }
}
