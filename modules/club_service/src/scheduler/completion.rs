//! Auto-completion sweep
//!
//! Moves published activities whose end time has passed to Completed. Runs
//! hourly by default.

use crate::contract::ActivityStatus;
use crate::domain::clock::Clock;
use crate::domain::repository::{ActivityRepository, PublishAtUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic task that completes expired activities
pub struct CompletionScheduler {
    activities: Arc<dyn ActivityRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl CompletionScheduler {
    /// Create a new scheduler sweeping at the given interval
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            activities,
            clock,
            interval,
        }
    }

    /// Run until the token is cancelled
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "completion scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("completion scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(error) = self.tick().await {
                        tracing::error!(%error, "completion sweep failed");
                    }
                }
            }
        }
    }

    /// One sweep: complete every published activity that is over. The
    /// transition is guarded on the row still being Published, so an
    /// activity cancelled between selection and write is skipped, and a
    /// second sweep over the same rows is a no-op. A failing row is logged
    /// and the sweep moves on.
    pub async fn tick(&self) -> anyhow::Result<usize> {
        let now = self.clock.now();
        let expired = self.activities.find_expired(now).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let mut completed = 0;
        for activity in expired {
            let result = self
                .activities
                .transition_status(
                    activity.id,
                    ActivityStatus::Published,
                    ActivityStatus::Completed,
                    PublishAtUpdate::Keep,
                    now,
                )
                .await;
            match result {
                Ok(true) => {
                    completed += 1;
                    tracing::info!(
                        activity_id = activity.id,
                        title = %activity.title,
                        "expired activity completed"
                    );
                }
                Ok(false) => {
                    tracing::debug!(
                        activity_id = activity.id,
                        "activity no longer published, skipped"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        activity_id = activity.id,
                        %error,
                        "failed to complete expired activity"
                    );
                }
            }
        }
        Ok(completed)
    }
}
