//! Activity lifecycle manager
//!
//! Owns the activity state machine:
//!
//! ```text
//! Draft     -> Published  publish()
//! Draft     -> Scheduled  schedule_publish(at)
//! Scheduled -> Draft      cancel_schedule_publish()
//! Scheduled -> Published  publish sweep, once publish_at is reached
//! Published -> Cancelled  cancel()
//! Published -> Completed  complete() / completion sweep, once end_time passed
//! Draft     -> (deleted)  delete()
//! ```
//!
//! Every transition re-validates its precondition inside the guarded
//! compare-and-set write, so concurrent transitions on the same activity are
//! serialized rather than last-committer-wins.

use crate::contract::{
    Activity, ActivityId, ActivityStatus, ActivityType, ActivityUpdate, ClubError, NewActivity,
};
use crate::domain::clock::Clock;
use crate::domain::repository::{ActivityRepository, PublishAtUpdate, RegistrationRepository};
use crate::domain::validation;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// How far ahead the upcoming-activities query looks
const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Domain service for activity lifecycle management
pub struct ActivityService {
    activities: Arc<dyn ActivityRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    clock: Arc<dyn Clock>,
}

impl ActivityService {
    /// Create a new service instance
    pub fn new(
        activities: Arc<dyn ActivityRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            registrations,
            clock,
        }
    }

    // ===== Queries =====

    /// Get an activity by id
    pub async fn get_activity(&self, id: ActivityId) -> Result<Activity, ClubError> {
        self.activities
            .find_by_id(id)
            .await
            .map_err(|_| ClubError::Internal)?
            .ok_or_else(|| ClubError::NotFound {
                resource: "activity".to_string(),
                id: id.to_string(),
            })
    }

    /// All activities regardless of state
    pub async fn list_activities(&self) -> Result<Vec<Activity>, ClubError> {
        self.activities
            .list_all()
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Published activities, soonest first
    pub async fn list_published_activities(&self) -> Result<Vec<Activity>, ClubError> {
        self.activities
            .find_published()
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Published activities of one category, soonest first
    pub async fn list_published_by_type(
        &self,
        activity_type: ActivityType,
    ) -> Result<Vec<Activity>, ClubError> {
        self.activities
            .find_published_by_type(activity_type)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Keyword search over title and description of published activities
    pub async fn search_activities(&self, keyword: &str) -> Result<Vec<Activity>, ClubError> {
        let keyword = validation::validate_keyword(keyword)?;
        self.activities
            .search_published(&keyword)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Activities that are open for registration right now
    /// (published, deadline not passed or absent, not yet started)
    pub async fn list_registrable_activities(&self) -> Result<Vec<Activity>, ClubError> {
        let now = self.clock.now();
        self.activities
            .find_registrable(now)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Published activities starting within the next seven days
    pub async fn list_upcoming_activities(&self) -> Result<Vec<Activity>, ClubError> {
        let now = self.clock.now();
        let until = now + Duration::days(UPCOMING_WINDOW_DAYS);
        self.activities
            .find_starting_between(now, until)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Draft activities, newest first
    pub async fn list_draft_activities(&self) -> Result<Vec<Activity>, ClubError> {
        self.activities
            .find_drafts()
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Activities created by one user, newest first
    pub async fn list_activities_by_creator(
        &self,
        created_by: &str,
    ) -> Result<Vec<Activity>, ClubError> {
        validation::validate_user_id(created_by)?;
        self.activities
            .find_by_creator(created_by)
            .await
            .map_err(|_| ClubError::Internal)
    }

    // ===== Creation and mutation =====

    /// Create a new activity. Always lands in Draft.
    pub async fn create_activity(&self, new: NewActivity) -> Result<Activity, ClubError> {
        validation::validate_schedule(
            new.start_time,
            new.end_time,
            new.fee_amount,
            new.max_participants,
        )?;
        if new.title.chars().count() > validation::MAX_TITLE_LEN {
            return Err(ClubError::InvalidArgument {
                message: format!(
                    "title cannot exceed {} characters",
                    validation::MAX_TITLE_LEN
                ),
            });
        }
        validation::validate_user_id(&new.created_by)?;

        let now = self.clock.now();
        let activity = Activity {
            id: 0,
            title: new.title,
            description: new.description,
            location: new.location,
            start_time: new.start_time,
            end_time: new.end_time,
            max_participants: new.max_participants,
            registration_deadline: new.registration_deadline,
            fee_amount: new.fee_amount,
            activity_type: new.activity_type,
            target_audience: new.target_audience,
            status: ActivityStatus::Draft,
            publish_at: None,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .activities
            .insert(&activity)
            .await
            .map_err(|_| ClubError::Internal)?;
        tracing::info!(activity_id = created.id, "activity created");
        Ok(created)
    }

    /// Replace the mutable fields of an activity. Rejected once the activity
    /// reached a terminal state.
    pub async fn update_activity(
        &self,
        id: ActivityId,
        update: ActivityUpdate,
    ) -> Result<Activity, ClubError> {
        let existing = self.get_activity(id).await?;
        if existing.status.is_terminal() {
            return Err(ClubError::InvalidState {
                reason: "cancelled or completed activities cannot be updated".to_string(),
            });
        }
        validation::validate_schedule(
            update.start_time,
            update.end_time,
            update.fee_amount,
            update.max_participants,
        )?;
        if update.title.chars().count() > validation::MAX_TITLE_LEN {
            return Err(ClubError::InvalidArgument {
                message: format!(
                    "title cannot exceed {} characters",
                    validation::MAX_TITLE_LEN
                ),
            });
        }

        let updated = Activity {
            title: update.title,
            description: update.description,
            location: update.location,
            start_time: update.start_time,
            end_time: update.end_time,
            max_participants: update.max_participants,
            registration_deadline: update.registration_deadline,
            fee_amount: update.fee_amount,
            activity_type: update.activity_type,
            target_audience: update.target_audience,
            updated_at: self.clock.now(),
            ..existing
        };
        self.activities
            .update(&updated)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Delete an activity. Only drafts may be deleted; anything that left
    /// Draft stays on record and can only be cancelled.
    pub async fn delete_activity(&self, id: ActivityId) -> Result<(), ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Draft {
            return Err(ClubError::InvalidState {
                reason: "only draft activities can be deleted".to_string(),
            });
        }
        self.activities
            .delete(id)
            .await
            .map_err(|_| ClubError::Internal)?;
        tracing::info!(activity_id = id, "draft activity deleted");
        Ok(())
    }

    // ===== State transitions =====

    /// Publish a draft activity immediately
    pub async fn publish_activity(&self, id: ActivityId) -> Result<Activity, ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Draft {
            return Err(ClubError::InvalidState {
                reason: "only draft activities can be published".to_string(),
            });
        }
        validation::validate_title(&activity.title)?;

        let now = self.clock.now();
        self.apply_transition(
            id,
            ActivityStatus::Draft,
            ActivityStatus::Published,
            PublishAtUpdate::Set(now),
            now,
        )
        .await?;
        tracing::info!(activity_id = id, "activity published");
        self.get_activity(id).await
    }

    /// Queue a draft activity for publication at a future time
    pub async fn schedule_publish(
        &self,
        id: ActivityId,
        publish_at: DateTime<Utc>,
    ) -> Result<Activity, ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Draft {
            return Err(ClubError::InvalidState {
                reason: "only draft activities can be scheduled for publication".to_string(),
            });
        }
        let now = self.clock.now();
        if publish_at <= now {
            return Err(ClubError::InvalidArgument {
                message: "publish time must be in the future".to_string(),
            });
        }

        self.apply_transition(
            id,
            ActivityStatus::Draft,
            ActivityStatus::Scheduled,
            PublishAtUpdate::Set(publish_at),
            now,
        )
        .await?;
        tracing::info!(activity_id = id, %publish_at, "activity scheduled for publication");
        self.get_activity(id).await
    }

    /// Revert a scheduled activity back to draft
    pub async fn cancel_schedule_publish(&self, id: ActivityId) -> Result<Activity, ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Scheduled {
            return Err(ClubError::InvalidState {
                reason: "activity is not scheduled for publication".to_string(),
            });
        }

        let now = self.clock.now();
        self.apply_transition(
            id,
            ActivityStatus::Scheduled,
            ActivityStatus::Draft,
            PublishAtUpdate::Clear,
            now,
        )
        .await?;
        tracing::info!(activity_id = id, "scheduled publication cancelled");
        self.get_activity(id).await
    }

    /// Cancel a published activity. Registrations are not cascaded; callers
    /// reconcile them separately.
    pub async fn cancel_activity(&self, id: ActivityId) -> Result<Activity, ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Published {
            return Err(ClubError::InvalidState {
                reason: "only published activities can be cancelled".to_string(),
            });
        }

        let now = self.clock.now();
        self.apply_transition(
            id,
            ActivityStatus::Published,
            ActivityStatus::Cancelled,
            PublishAtUpdate::Keep,
            now,
        )
        .await?;
        tracing::info!(activity_id = id, "activity cancelled");
        self.get_activity(id).await
    }

    /// Mark a published activity as completed once it is over
    pub async fn complete_activity(&self, id: ActivityId) -> Result<Activity, ClubError> {
        let activity = self.get_activity(id).await?;
        if activity.status != ActivityStatus::Published {
            return Err(ClubError::InvalidState {
                reason: "only published activities can be completed".to_string(),
            });
        }
        let now = self.clock.now();
        if now <= activity.end_time {
            return Err(ClubError::InvalidArgument {
                message: "activity has not ended yet".to_string(),
            });
        }

        self.apply_transition(
            id,
            ActivityStatus::Published,
            ActivityStatus::Completed,
            PublishAtUpdate::Keep,
            now,
        )
        .await?;
        tracing::info!(activity_id = id, "activity completed");
        self.get_activity(id).await
    }

    // ===== Registration admission checks =====

    /// Whether a new registration would currently be admitted
    pub async fn can_register(&self, id: ActivityId) -> Result<bool, ClubError> {
        let activity = self.get_activity(id).await?;
        let now = self.clock.now();
        if !activity.can_register(now) {
            return Ok(false);
        }
        if activity.has_participant_limit() {
            let taken = self
                .registrations
                .count_valid(id)
                .await
                .map_err(|_| ClubError::Internal)?;
            if let Some(cap) = activity.max_participants {
                if taken >= cap as u64 {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Validate the timing-related admission preconditions, one distinct
    /// reason per failure mode. The capacity and duplicate checks are not
    /// made here: they are only authoritative inside the guarded insert.
    pub fn validate_can_register(
        &self,
        activity: &Activity,
        now: DateTime<Utc>,
    ) -> Result<(), ClubError> {
        if !activity.is_published() {
            return Err(ClubError::InvalidState {
                reason: "activity is not published".to_string(),
            });
        }
        if activity.is_registration_closed(now) {
            return Err(ClubError::InvalidState {
                reason: "registration deadline has passed".to_string(),
            });
        }
        if activity.has_ended(now) {
            return Err(ClubError::InvalidState {
                reason: "activity has already ended".to_string(),
            });
        }
        if activity.has_started(now) {
            return Err(ClubError::InvalidState {
                reason: "activity has already started".to_string(),
            });
        }
        Ok(())
    }

    /// Guarded compare-and-set transition. A zero-row write means another
    /// caller changed the state between our read and the write.
    async fn apply_transition(
        &self,
        id: ActivityId,
        expected: ActivityStatus,
        next: ActivityStatus,
        publish_at: PublishAtUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), ClubError> {
        let applied = self
            .activities
            .transition_status(id, expected, next, publish_at, now)
            .await
            .map_err(|_| ClubError::Internal)?;
        if !applied {
            return Err(ClubError::InvalidState {
                reason: "activity state changed concurrently".to_string(),
            });
        }
        Ok(())
    }
}
