//! Monthly usage reset.
//!
//! Checks the calendar month on an interval and zeroes every user's counters
//! once per rollover. A failed sweep leaves the observed period untouched so
//! the next tick tries the same rollover again.

use std::sync::Arc;
use std::time::Duration;

use postpilot_core::{PeriodId, UsageTracker};
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};

/// What a single check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTick {
    /// Still in the observed month.
    Unchanged,
    /// Month rolled over; this many users were reset.
    Reset { period: PeriodId, users_reset: u64 },
    /// Month rolled over but the sweep failed; retried next tick.
    Failed { period: PeriodId },
}

pub struct UsageResetScheduler {
    usage: UsageTracker,
    check_interval: Duration,
    last_period: Mutex<PeriodId>,
}

impl UsageResetScheduler {
    pub fn new(usage: UsageTracker, check_interval: Duration) -> Self {
        Self::starting_at(usage, check_interval, PeriodId::current())
    }

    /// Scheduler that treats `period` as already observed.
    pub fn starting_at(usage: UsageTracker, check_interval: Duration, period: PeriodId) -> Self {
        Self {
            usage,
            check_interval,
            last_period: Mutex::new(period),
        }
    }

    /// Start the background check loop.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            tracing::info!(
                interval_secs = self.check_interval.as_secs(),
                "Usage reset scheduler started"
            );

            loop {
                ticker.tick().await;
                self.tick(PeriodId::current()).await;
            }
        })
    }

    #[tracing::instrument(skip(self), fields(job = "usage_reset"))]
    pub async fn tick(&self, now: PeriodId) -> ResetTick {
        let mut last = self.last_period.lock().await;
        if *last == now {
            return ResetTick::Unchanged;
        }

        tracing::info!(from = %*last, to = %now, "Billing month rolled over, resetting usage");
        match self.usage.reset_usage_in(&now).await {
            Ok(users_reset) => {
                *last = now.clone();
                ResetTick::Reset {
                    period: now,
                    users_reset,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, period = %now, "Monthly usage reset failed");
                ResetTick::Failed { period: now }
            }
        }
    }

    pub async fn last_period(&self) -> PeriodId {
        self.last_period.lock().await.clone()
    }
}
