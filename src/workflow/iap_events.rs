use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::entities::iap_update_notification::IapUpdateNotification;

/// Fan-out channel for [`IapUpdateNotification`]s.
///
/// Receivers that fall more than the channel capacity behind observe
/// `RecvError::Lagged` and skip ahead.
#[derive(Debug, Clone)]
pub struct IapEvents {
    sender: broadcast::Sender<IapUpdateNotification>,
}

impl IapEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IapUpdateNotification> {
        self.sender.subscribe()
    }

    pub(crate) fn emit(&self, notification: IapUpdateNotification) {
        if self.sender.send(notification).is_err() {
            trace!("no subscribers for IAP notification");
        }
    }
}
