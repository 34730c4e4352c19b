//! Periodic refresh scheduling
//!
//! [`RefreshScheduler`] owns the one and only auto-refresh timer. The timer
//! runs as a tokio task that, on every tick, reads the current target host
//! and reports a [`RefreshTick`] over a channel; the receiver decides what to
//! fetch. The target lives in a `watch` channel so it can be rebound without
//! restarting the timer.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// One firing of the refresh timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTick {
    /// Host bound at the time of the tick
    pub host: String,
    /// Timer lifetime the tick belongs to
    pub epoch: u64,
}

/// Single-timer polling scheduler
///
/// Created idle. At most one timer task exists at any time: [`enable`]
/// always stops the previous timer before starting a new one, and dropping
/// the scheduler stops it too.
///
/// [`enable`]: RefreshScheduler::enable
#[derive(Debug)]
pub struct RefreshScheduler {
    interval: Duration,
    target: watch::Sender<Option<String>>,
    ticks: mpsc::UnboundedSender<RefreshTick>,
    handle: Option<JoinHandle<()>>,
    epoch: u64,
}

impl RefreshScheduler {
    /// Create an idle scheduler; a zero interval is raised to one second
    pub fn new(interval: Duration, ticks: mpsc::UnboundedSender<RefreshTick>) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_secs(1)
        } else {
            interval
        };
        let (target, _) = watch::channel(None);
        Self {
            interval,
            target,
            ticks,
            handle: None,
            epoch: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a timer task is currently owned
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Host the next tick will target
    pub fn target(&self) -> Option<String> {
        self.target.borrow().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start the timer bound to `host`, replacing any running timer
    ///
    /// The first tick fires one interval from now. Must be called from within
    /// a tokio runtime.
    pub fn enable(&mut self, host: Option<String>) {
        self.disable();
        self.target.send_replace(host);
        self.epoch += 1;

        let epoch = self.epoch;
        let period = self.interval;
        let mut target = self.target.subscribe();
        let ticks = self.ticks.clone();

        self.handle = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                let Some(host) = target.borrow_and_update().clone() else {
                    tracing::debug!("Refresh tick skipped: no host selected");
                    continue;
                };
                if ticks.send(RefreshTick { host, epoch }).is_err() {
                    tracing::debug!("Refresh receiver closed, stopping timer");
                    break;
                }
            }
        }));

        tracing::debug!(
            "Auto-refresh enabled (epoch {}, every {:?}, target {:?})",
            epoch,
            period,
            self.target()
        );
    }

    /// Stop the timer; no-op when idle
    pub fn disable(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Auto-refresh disabled (epoch {})", self.epoch);
        }
    }

    /// Change the host ticks are sent for, without restarting the timer
    pub fn rebind(&mut self, host: Option<String>) {
        self.target.send_replace(host);
    }

    /// Whether a tick comes from the timer that is running now
    pub fn is_current(&self, tick: &RefreshTick) -> bool {
        self.is_enabled() && tick.epoch == self.epoch
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::time::sleep;

    const PERIOD: Duration = Duration::from_secs(30);

    fn scheduler() -> (RefreshScheduler, UnboundedReceiver<RefreshTick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RefreshScheduler::new(PERIOD, tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<RefreshTick>) -> Vec<RefreshTick> {
        let mut ticks = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            ticks.push(tick);
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_interval() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));

        sleep(PERIOD - Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());

        sleep(Duration::from_secs(2)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].host, "web-1");
        assert!(scheduler.is_current(&ticks[0]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_enable_twice_keeps_one_timer() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));
        scheduler.enable(Some("web-1".to_string()));
        assert!(scheduler.is_enabled());

        sleep(PERIOD * 3 + Duration::from_secs(1)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 3);
        assert!(ticks.iter().all(|t| t.epoch == scheduler.epoch()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_when_idle_is_noop() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.disable();
        scheduler.disable();
        assert!(!scheduler.is_enabled());
        assert_eq!(scheduler.epoch(), 0);

        sleep(PERIOD * 2).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_stops_ticks() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));
        sleep(PERIOD + Duration::from_secs(1)).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);

        scheduler.disable();
        assert!(!scheduler.is_current(&ticks[0]));
        sleep(PERIOD * 3).await;
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebind_targets_new_host() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));
        let epoch = scheduler.epoch();

        sleep(PERIOD + Duration::from_secs(1)).await;
        assert_eq!(drain(&mut rx)[0].host, "web-1");

        scheduler.rebind(Some("db-1".to_string()));
        assert_eq!(scheduler.target().as_deref(), Some("db-1"));
        assert_eq!(scheduler.epoch(), epoch);

        sleep(PERIOD).await;
        let ticks = drain(&mut rx);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].host, "db-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_without_host_is_skipped() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(None);

        sleep(PERIOD * 2 + Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(scheduler.is_enabled());

        scheduler.rebind(Some("web-1".to_string()));
        sleep(PERIOD).await;
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_old_epoch_is_not_current() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));
        sleep(PERIOD + Duration::from_secs(1)).await;
        let old = drain(&mut rx).remove(0);

        scheduler.enable(Some("web-1".to_string()));
        assert!(!scheduler.is_current(&old));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_timer() {
        let (mut scheduler, mut rx) = scheduler();
        scheduler.enable(Some("web-1".to_string()));
        drop(scheduler);

        sleep(PERIOD * 2).await;
        assert!(rx.try_recv().is_err());
    }
}
