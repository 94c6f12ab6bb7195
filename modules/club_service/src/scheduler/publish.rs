//! Scheduled-publication sweep
//!
//! Promotes activities whose requested publish time has arrived from
//! Scheduled to Published, without a user request. Runs every minute by
//! default.

use crate::contract::ActivityStatus;
use crate::domain::clock::Clock;
use crate::domain::repository::{ActivityRepository, PublishAtUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Periodic task that publishes due scheduled activities
pub struct PublishScheduler {
    activities: Arc<dyn ActivityRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl PublishScheduler {
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
        tracing::info!(interval_secs = self.interval.as_secs(), "publish scheduler started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("publish scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(error) = self.tick().await {
                        tracing::error!(%error, "publish sweep failed");
                    }
                }
            }
        }
    }

    /// One sweep: publish every scheduled activity whose publish time has
    /// passed. The stored publish time is kept as-is, so the activity carries
    /// the originally requested publication instant, not the tick time.
    ///
    /// Each promotion is a guarded transition: an activity that was already
    /// published manually (or pulled back to draft) between selection and
    /// write matches zero rows and is skipped. A failing row is logged and
    /// the sweep moves on.
    pub async fn tick(&self) -> anyhow::Result<usize> {
        let now = self.clock.now();
        let due = self.activities.find_due_for_publish(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let mut published = 0;
        for activity in due {
            let result = self
                .activities
                .transition_status(
                    activity.id,
                    ActivityStatus::Scheduled,
                    ActivityStatus::Published,
                    PublishAtUpdate::Keep,
                    now,
                )
                .await;
            match result {
                Ok(true) => {
                    published += 1;
                    tracing::info!(
                        activity_id = activity.id,
                        title = %activity.title,
                        "scheduled activity published"
                    );
                }
                Ok(false) => {
                    tracing::debug!(
                        activity_id = activity.id,
                        "activity no longer scheduled, skipped"
                    );
                }
                Err(error) => {
                    tracing::warn!(
                        activity_id = activity.id,
                        %error,
                        "failed to publish scheduled activity"
                    );
                }
            }
        }
        Ok(published)
    }
}
