//! Notifier seam: how raised alerts reach a human.

use dohwatch_core::{Notification, Result};
use std::sync::Arc;
use tracing::warn;

/// Renders a user-visible alert
pub trait Notifier: Send + Sync {
    /// Deliver one notification
    fn notify(&self, notification: &Notification) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: &Notification) -> Result<()> {
        (**self).notify(notification)
    }
}

/// Emits alerts as `warn`-level tracing events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        warn!(
            id = %notification.id,
            title = %notification.title,
            priority = notification.priority,
            "{}",
            notification.message
        );
        Ok(())
    }
}
