//! Repository traits for data access
//!
//! These traits define the interface for data access operations.
//! Implementations are in infra/storage/repositories.rs
//!
//! State transitions are expressed as guarded writes: the expected current
//! state travels into the storage layer and is re-checked inside the same
//! statement/transaction that performs the write, so a transition that lost a
//! race matches zero rows instead of clobbering a concurrent change.

use crate::contract::{
    Activity, ActivityId, ActivityStatus, ActivityType, Registration, RegistrationId,
    RegistrationStatus,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// How a status transition touches the stored publish time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishAtUpdate {
    /// Leave the stored value untouched
    Keep,
    /// Overwrite with the given instant
    Set(DateTime<Utc>),
    /// Null the value out
    Clear,
}

/// Outcome of the guarded registration insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The registration was stored
    Admitted(Registration),
    /// The participant cap is already reached
    CapacityExhausted,
    /// A non-cancelled registration for this (activity, user) already exists
    Duplicate,
}

/// Repository for activities
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Insert a new activity, returning it with its assigned id
    async fn insert(&self, activity: &Activity) -> Result<Activity>;

    /// Find an activity by id
    async fn find_by_id(&self, id: ActivityId) -> Result<Option<Activity>>;

    /// Overwrite an activity row with the given model
    async fn update(&self, activity: &Activity) -> Result<Activity>;

    /// Remove an activity row
    async fn delete(&self, id: ActivityId) -> Result<()>;

    /// Compare-and-set status transition. The write only lands when the
    /// stored status still equals `expected`; returns false otherwise.
    /// `updated_at` is stamped with `now` on success.
    async fn transition_status(
        &self,
        id: ActivityId,
        expected: ActivityStatus,
        next: ActivityStatus,
        publish_at: PublishAtUpdate,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// All activities, any state
    async fn list_all(&self) -> Result<Vec<Activity>>;

    /// Published activities, start time ascending
    async fn find_published(&self) -> Result<Vec<Activity>>;

    /// Published activities of one category, start time ascending
    async fn find_published_by_type(&self, activity_type: ActivityType) -> Result<Vec<Activity>>;

    /// Published activities whose title or description contains the keyword
    /// (case-insensitive), start time ascending
    async fn search_published(&self, keyword: &str) -> Result<Vec<Activity>>;

    /// Published activities whose registration is open and that have not yet
    /// started, start time ascending
    async fn find_registrable(&self, now: DateTime<Utc>) -> Result<Vec<Activity>>;

    /// Published activities starting inside the given window, start time
    /// ascending
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Activity>>;

    /// Draft activities, newest first
    async fn find_drafts(&self) -> Result<Vec<Activity>>;

    /// Activities created by one user, newest first
    async fn find_by_creator(&self, created_by: &str) -> Result<Vec<Activity>>;

    /// Scheduled activities whose requested publish time has passed
    async fn find_due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<Activity>>;

    /// Published activities whose end time has passed
    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Activity>>;
}

/// Repository for registrations
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Admission-guarded insert. Duplicate check, capacity check and insert
    /// run as one atomic unit against concurrent admissions for the same
    /// activity: the stored count of non-cancelled registrations never
    /// exceeds `capacity`.
    async fn insert_guarded(
        &self,
        registration: &Registration,
        capacity: Option<i32>,
    ) -> Result<AdmissionOutcome>;

    /// Find a registration by id
    async fn find_by_id(&self, id: RegistrationId) -> Result<Option<Registration>>;

    /// The non-cancelled registration of one user for one activity, if any
    async fn find_active_by_activity_and_user(
        &self,
        activity_id: ActivityId,
        user_id: &str,
    ) -> Result<Option<Registration>>;

    /// Guarded cancel: lands only while the row is still Registered and not
    /// checked in. Returns false otherwise.
    async fn mark_cancelled(&self, id: RegistrationId, now: DateTime<Utc>) -> Result<bool>;

    /// Guarded payment settlement: lands only while payment is still Pending.
    /// Returns false otherwise.
    async fn mark_paid(&self, id: RegistrationId, now: DateTime<Utc>) -> Result<bool>;

    /// Guarded check-in: lands only while the row is Registered, not checked
    /// in and not awaiting payment. Moves the row to Attended and records the
    /// check-in time and late flag. Returns false otherwise.
    async fn record_check_in(
        &self,
        id: RegistrationId,
        check_in_time: DateTime<Utc>,
        is_late: bool,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// All registrations of one user, registration time descending
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Registration>>;

    /// All registrations for one activity, registration time ascending
    async fn find_by_activity(&self, activity_id: ActivityId) -> Result<Vec<Registration>>;

    /// Registrations of one user in one state, registration time descending
    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>>;

    /// Registrations for one activity in one state, registration time
    /// ascending
    async fn find_by_activity_and_status(
        &self,
        activity_id: ActivityId,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>>;

    /// Registrations of one user still awaiting payment
    async fn find_pending_payments(&self, user_id: &str) -> Result<Vec<Registration>>;

    /// Checked-in registrations for one activity
    async fn find_checked_in(&self, activity_id: ActivityId) -> Result<Vec<Registration>>;

    /// All registrations for one activity, cancelled included
    async fn count_by_activity(&self, activity_id: ActivityId) -> Result<u64>;

    /// Non-cancelled registrations for one activity (the count the capacity
    /// guard is defined over)
    async fn count_valid(&self, activity_id: ActivityId) -> Result<u64>;

    /// Checked-in registrations for one activity
    async fn count_checked_in(&self, activity_id: ActivityId) -> Result<u64>;
}
