// Status endpoint

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::YoulessClient;
use crate::error::Error;
use crate::models::RawStatus;

/// Method code of the status page.
const STATUS_METHOD: &str = "a";

impl YoulessClient {
    /// Fetch the current meter status.
    ///
    /// `GET /a?f=j`
    pub async fn raw_status(&self, cancel: &CancellationToken) -> Result<RawStatus, Error> {
        debug!("fetching status");
        self.get_json(STATUS_METHOD, &[], cancel).await
    }
}
