//! One-way outcome sink for failed cart operations.

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::CartError;

/// Receives every failure the cart reports. Successes are silent.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, error: &CartError);
}

/// Logs failures; the default sink when nothing renders them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, error: &CartError) {
        warn!(product_id = ?error.product_id(), error = %error, "Cart operation failed");
    }
}

/// Forwards failures to a channel, e.g. a UI task showing toasts.
impl Notifier for mpsc::UnboundedSender<CartError> {
    fn notify(&self, error: &CartError) {
        let _ = self.send(error.clone());
    }
}
