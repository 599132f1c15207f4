//! Wall clock and timers.

use std::time::{Duration, SystemTime};

use super::RealRuntime;

impl RealRuntime {
    pub(crate) fn now_impl(&self) -> SystemTime {
        SystemTime::now()
    }

    #[tracing::instrument(skip(self))]
    pub(crate) async fn sleep_impl(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}
