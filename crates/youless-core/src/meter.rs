// ── Meter facade ──
//
// One `Meter` owns one `YoulessClient` (and with it one session). Every
// operation fetches raw records, translates them and, for the composite
// windows, merges the blocks after all round trips have joined.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use youless_api::{Credentials, TransportConfig, UsageWindow, YoulessClient};

use crate::config::MeterConfig;
use crate::convert::{translate_status, translate_usage};
use crate::error::CoreError;
use crate::model::{Status, UsageBlock};

struct MeterInner {
    client: YoulessClient,
    /// Fired by `close()`; every operation races it.
    shutdown: CancellationToken,
}

/// High-level client for a Youless meter.
///
/// Cheap to clone; clones share the session. After [`close`](Self::close)
/// every operation, including ones already in flight, fails with
/// [`CoreError::Disposed`].
#[derive(Clone)]
pub struct Meter {
    inner: Arc<MeterInner>,
}

impl Meter {
    /// Build a meter from connection settings.
    pub fn new(config: MeterConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let credentials = Credentials::from(config.password);
        let client = YoulessClient::new(&config.host, config.port, credentials, &transport)?;
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured API client.
    pub fn with_client(client: YoulessClient) -> Self {
        Self {
            inner: Arc::new(MeterInner {
                client,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Build a meter, run `f` against it and close it again.
    pub async fn oneshot<F, Fut, T>(config: MeterConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Meter) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let meter = Meter::new(config)?;
        let result = f(meter.clone()).await;
        meter.close();
        result
    }

    /// The underlying API client.
    pub fn client(&self) -> &YoulessClient {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Close the meter. Idempotent.
    pub fn close(&self) {
        if !self.inner.shutdown.is_cancelled() {
            debug!(host = %self.inner.client.host(), "closing meter");
            self.inner.shutdown.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Run `op` unless the meter is closed, aborting it if a close
    /// arrives while it is pending.
    async fn guarded<T>(
        &self,
        op: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        if self.is_closed() {
            return Err(CoreError::Disposed);
        }
        tokio::select! {
            biased;
            () = self.inner.shutdown.cancelled() => Err(CoreError::Disposed),
            result = op => result,
        }
    }

    // ── Operations ───────────────────────────────────────────────

    /// Live readings.
    pub async fn status(&self, cancel: &CancellationToken) -> Result<Status, CoreError> {
        self.guarded(async {
            let raw = self.inner.client.raw_status(cancel).await?;
            translate_status(raw)
        })
        .await
    }

    /// One history window.
    pub async fn usage(
        &self,
        window: UsageWindow,
        cancel: &CancellationToken,
    ) -> Result<UsageBlock, CoreError> {
        self.guarded(self.fetch_usage(window, cancel)).await
    }

    /// The last hour at one-minute resolution: both half-hour windows,
    /// fetched concurrently and merged.
    pub async fn last_hour(&self, cancel: &CancellationToken) -> Result<UsageBlock, CoreError> {
        let first = UsageWindow::hour(1)?;
        let second = UsageWindow::hour(2)?;

        self.guarded(async {
            let (a, b) = futures_util::try_join!(
                self.fetch_usage(first, cancel),
                self.fetch_usage(second, cancel),
            )?;
            a.merge(&b)
        })
        .await
    }

    /// The last 24 hours at ten-minute resolution: the three 8-hour
    /// windows, fetched concurrently and merged.
    pub async fn last_day(&self, cancel: &CancellationToken) -> Result<UsageBlock, CoreError> {
        let windows = [
            UsageWindow::eight_hours(1)?,
            UsageWindow::eight_hours(2)?,
            UsageWindow::eight_hours(3)?,
        ];

        self.guarded(async {
            let (a, b, c) = futures_util::try_join!(
                self.fetch_usage(windows[0], cancel),
                self.fetch_usage(windows[1], cancel),
                self.fetch_usage(windows[2], cancel),
            )?;
            UsageBlock::merge_all([a, b, c])?.ok_or_else(|| CoreError::Operation {
                message: "no usage windows to merge".into(),
            })
        })
        .await
    }

    /// One 8-hour block of the last day (`1..=3`).
    pub async fn eight_hours(
        &self,
        index: u8,
        cancel: &CancellationToken,
    ) -> Result<UsageBlock, CoreError> {
        self.usage(UsageWindow::eight_hours(index)?, cancel).await
    }

    /// One day, `0` being today, up to six days back.
    pub async fn day(&self, index: u8, cancel: &CancellationToken) -> Result<UsageBlock, CoreError> {
        self.usage(UsageWindow::day(index)?, cancel).await
    }

    /// One month by number (`1..=12`).
    pub async fn month(
        &self,
        index: u8,
        cancel: &CancellationToken,
    ) -> Result<UsageBlock, CoreError> {
        self.usage(UsageWindow::month(index)?, cancel).await
    }

    async fn fetch_usage(
        &self,
        window: UsageWindow,
        cancel: &CancellationToken,
    ) -> Result<UsageBlock, CoreError> {
        let raw = self.inner.client.raw_usage(window, cancel).await?;
        let block = translate_usage(raw)?;
        debug!(%window, readings = block.len(), unit = %block.unit(), "usage translated");
        Ok(block)
    }
}
