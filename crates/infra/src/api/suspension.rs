//! Default presentation of account lockout

use async_trait::async_trait;
use pawsit_core::SuspensionHandler;
use pawsit_domain::SuspensionNotice;
use tracing::warn;

/// Handler for headless use: records the notice in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSuspensionHandler;

#[async_trait]
impl SuspensionHandler for LoggingSuspensionHandler {
    async fn notify(&self, notice: &SuspensionNotice) {
        warn!(status = notice.status.as_str(), message = %notice.message, "Account locked by server");
    }
}
