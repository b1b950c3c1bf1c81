//! Per-bucket debounce timers

use ondemand_common::BucketKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// One restartable timer per bucket
///
/// Arming a bucket again before its delay elapsed cancels the pending
/// deadline and starts over. Timers of different buckets never affect each
/// other.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    timers: Mutex<HashMap<BucketKey, JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer spawning its timers on `runtime`
    pub fn new(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Quiet period applied to every bucket
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Start or restart the bucket's timer
    ///
    /// `callback` runs once after the delay passes without another `arm` for
    /// the same bucket. The callback's future is spawned as its own task, so a
    /// later `arm` never cancels work that has already started.
    pub fn arm<F, Fut>(&self, bucket: &BucketKey, callback: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let runtime = self.runtime.clone();
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            runtime.spawn(callback());
        });

        match self.timers.lock().insert(bucket.clone(), timer) {
            Some(previous) if !previous.is_finished() => {
                previous.abort();
                debug!("Re-armed debounce timer for {}", bucket);
            }
            _ => debug!("Armed debounce timer for {}", bucket),
        }
    }

    /// Whether the bucket has a timer that has not fired yet
    pub fn is_armed(&self, bucket: &BucketKey) -> bool {
        self.timers
            .lock()
            .get(bucket)
            .is_some_and(|timer| !timer.is_finished())
    }

    /// Cancel the bucket's pending timer, if any
    pub fn cancel(&self, bucket: &BucketKey) -> bool {
        self.timers.lock().get(bucket).is_some_and(|timer| {
            let pending = !timer.is_finished();
            timer.abort();
            pending
        })
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        for timer in self.timers.get_mut().values() {
            timer.abort();
        }
    }
}
