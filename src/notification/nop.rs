use crate::notification::event::{Progress, TransferListener, TransferRecord};

use async_trait::async_trait;

/// A listener that does nothing. Used as the default Null Object in a
/// [`SessionBuilder`](crate::server::SessionBuilder).
#[derive(Debug, Default)]
pub struct NopListener {}

#[async_trait]
impl TransferListener for NopListener {
    async fn record_transfer(&self, _: TransferRecord) {}

    async fn record_progress(&self, _: Progress) {}
}
