//! Port interface for presenting account lockout to the user

use async_trait::async_trait;
use pawsit_domain::SuspensionNotice;

/// Presents the one-time suspended/banned notification
#[async_trait]
pub trait SuspensionHandler: Send + Sync {
    /// Notify the user; logout happens after this returns
    async fn notify(&self, notice: &SuspensionNotice);
}
