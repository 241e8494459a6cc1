//! Log-backed notifier
//!
//! The daemon has no notification surface of its own; new items are written
//! to the log where a desktop integration or journald consumer picks them up.

use anyhow::Result;
use tracing::info;

use matchday_core::domain::NewItems;
use matchday_core::ports::INotifier;

/// `INotifier` that emits every notification as a structured log event
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait::async_trait]
impl INotifier for TracingNotifier {
    async fn notify_new_items(&self, items: &NewItems) -> Result<()> {
        let Some(notification) = items.render() else {
            return Ok(());
        };
        info!(
            target: "matchday::notification",
            collection = %notification.collection,
            count = items.len(),
            ids = ?items.ids(),
            title = %notification.title,
            body = %notification.body,
            "New items"
        );
        Ok(())
    }
}
