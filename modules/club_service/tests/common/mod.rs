//! Common test utilities: in-memory repositories, manual clock, fixtures

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use club_service::contract::{
    Activity, ActivityId, ActivityStatus, ActivityType, NewActivity, Registration,
    RegistrationId, RegistrationStatus, TargetAudience,
};
use club_service::domain::repository::{
    ActivityRepository, AdmissionOutcome, PublishAtUpdate, RegistrationRepository,
};
use club_service::domain::{ActivityService, Clock, RegistrationService};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Fixed starting instant so every test computes offsets from the same point
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// Manually driven clock
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.write() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

// ===== Mock repositories =====

pub struct MockActivityRepo {
    data: RwLock<HashMap<ActivityId, Activity>>,
    next_id: AtomicI64,
    /// Ids whose guarded transition should fail with a storage error
    fail_transitions: RwLock<HashSet<ActivityId>>,
}

impl MockActivityRepo {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            fail_transitions: RwLock::new(HashSet::new()),
        }
    }

    /// Make transition_status fail for the given activity
    pub fn fail_transitions_for(&self, id: ActivityId) {
        self.fail_transitions.write().insert(id);
    }

    pub fn stored(&self, id: ActivityId) -> Option<Activity> {
        self.data.read().get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl ActivityRepository for MockActivityRepo {
    async fn insert(&self, activity: &Activity) -> anyhow::Result<Activity> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = activity.clone();
        stored.id = id;
        self.data.write().insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: ActivityId) -> anyhow::Result<Option<Activity>> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn update(&self, activity: &Activity) -> anyhow::Result<Activity> {
        self.data.write().insert(activity.id, activity.clone());
        Ok(activity.clone())
    }

    async fn delete(&self, id: ActivityId) -> anyhow::Result<()> {
        self.data.write().remove(&id);
        Ok(())
    }

    async fn transition_status(
        &self,
        id: ActivityId,
        expected: ActivityStatus,
        next: ActivityStatus,
        publish_at: PublishAtUpdate,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        if self.fail_transitions.read().contains(&id) {
            anyhow::bail!("injected storage failure for activity {}", id);
        }
        let mut data = self.data.write();
        let Some(activity) = data.get_mut(&id) else {
            return Ok(false);
        };
        if activity.status != expected {
            return Ok(false);
        }
        activity.status = next;
        activity.updated_at = now;
        match publish_at {
            PublishAtUpdate::Keep => {}
            PublishAtUpdate::Set(at) => activity.publish_at = Some(at),
            PublishAtUpdate::Clear => activity.publish_at = None,
        }
        Ok(true)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Activity>> {
        let mut all: Vec<Activity> = self.data.read().values().cloned().collect();
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    async fn find_published(&self) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Ok(found)
    }

    async fn find_published_by_type(
        &self,
        activity_type: ActivityType,
    ) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published && a.activity_type == activity_type)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Ok(found)
    }

    async fn search_published(&self, keyword: &str) -> anyhow::Result<Vec<Activity>> {
        let needle = keyword.to_lowercase();
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published)
            .filter(|a| {
                a.title.to_lowercase().contains(&needle)
                    || a.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Ok(found)
    }

    async fn find_registrable(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published)
            .filter(|a| a.registration_deadline.map_or(true, |d| d > now))
            .filter(|a| a.start_time > now)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Ok(found)
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published)
            .filter(|a| a.start_time >= from && a.start_time <= until)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.start_time);
        Ok(found)
    }

    async fn find_drafts(&self) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Draft)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_by_creator(&self, created_by: &str) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.created_by == created_by)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_due_for_publish(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Scheduled)
            .filter(|a| a.publish_at.is_some_and(|at| at <= now))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.publish_at);
        Ok(found)
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> anyhow::Result<Vec<Activity>> {
        let mut found: Vec<Activity> = self
            .data
            .read()
            .values()
            .filter(|a| a.status == ActivityStatus::Published && a.end_time < now)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.end_time);
        Ok(found)
    }
}

pub struct MockRegistrationRepo {
    data: RwLock<HashMap<RegistrationId, Registration>>,
    next_id: AtomicI64,
}

impl MockRegistrationRepo {
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn stored(&self, id: RegistrationId) -> Option<Registration> {
        self.data.read().get(&id).cloned()
    }
}

#[async_trait::async_trait]
impl RegistrationRepository for MockRegistrationRepo {
    async fn insert_guarded(
        &self,
        registration: &Registration,
        capacity: Option<i32>,
    ) -> anyhow::Result<AdmissionOutcome> {
        // One write-lock critical section covers duplicate check, capacity
        // count and insert, matching the transactional guarantee of the
        // storage implementation.
        let mut data = self.data.write();

        let duplicate = data.values().any(|r| {
            r.activity_id == registration.activity_id
                && r.user_id == registration.user_id
                && r.status != RegistrationStatus::Cancelled
        });
        if duplicate {
            return Ok(AdmissionOutcome::Duplicate);
        }

        if let Some(cap) = capacity {
            let taken = data
                .values()
                .filter(|r| {
                    r.activity_id == registration.activity_id
                        && r.status != RegistrationStatus::Cancelled
                })
                .count();
            if taken >= cap as usize {
                return Ok(AdmissionOutcome::CapacityExhausted);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut stored = registration.clone();
        stored.id = id;
        data.insert(id, stored.clone());
        Ok(AdmissionOutcome::Admitted(stored))
    }

    async fn find_by_id(&self, id: RegistrationId) -> anyhow::Result<Option<Registration>> {
        Ok(self.data.read().get(&id).cloned())
    }

    async fn find_active_by_activity_and_user(
        &self,
        activity_id: ActivityId,
        user_id: &str,
    ) -> anyhow::Result<Option<Registration>> {
        Ok(self
            .data
            .read()
            .values()
            .find(|r| {
                r.activity_id == activity_id
                    && r.user_id == user_id
                    && r.status != RegistrationStatus::Cancelled
            })
            .cloned())
    }

    async fn mark_cancelled(
        &self,
        id: RegistrationId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        let mut data = self.data.write();
        let Some(registration) = data.get_mut(&id) else {
            return Ok(false);
        };
        if registration.status != RegistrationStatus::Registered || registration.checked_in {
            return Ok(false);
        }
        registration.status = RegistrationStatus::Cancelled;
        registration.updated_at = now;
        Ok(true)
    }

    async fn mark_paid(&self, id: RegistrationId, now: DateTime<Utc>) -> anyhow::Result<bool> {
        use club_service::contract::PaymentStatus;

        let mut data = self.data.write();
        let Some(registration) = data.get_mut(&id) else {
            return Ok(false);
        };
        if registration.payment_status != PaymentStatus::Pending {
            return Ok(false);
        }
        registration.payment_status = PaymentStatus::Paid;
        registration.updated_at = now;
        Ok(true)
    }

    async fn record_check_in(
        &self,
        id: RegistrationId,
        check_in_time: DateTime<Utc>,
        is_late: bool,
        now: DateTime<Utc>,
    ) -> anyhow::Result<bool> {
        use club_service::contract::PaymentStatus;

        let mut data = self.data.write();
        let Some(registration) = data.get_mut(&id) else {
            return Ok(false);
        };
        if registration.status != RegistrationStatus::Registered
            || registration.checked_in
            || registration.payment_status == PaymentStatus::Pending
        {
            return Ok(false);
        }
        registration.checked_in = true;
        registration.check_in_time = Some(check_in_time);
        registration.is_late = Some(is_late);
        registration.status = RegistrationStatus::Attended;
        registration.updated_at = now;
        Ok(true)
    }

    async fn find_by_user(&self, user_id: &str) -> anyhow::Result<Vec<Registration>> {
        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.registration_time.cmp(&a.registration_time));
        Ok(found)
    }

    async fn find_by_activity(&self, activity_id: ActivityId) -> anyhow::Result<Vec<Registration>> {
        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.activity_id == activity_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.registration_time);
        Ok(found)
    }

    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: RegistrationStatus,
    ) -> anyhow::Result<Vec<Registration>> {
        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.user_id == user_id && r.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.registration_time.cmp(&a.registration_time));
        Ok(found)
    }

    async fn find_by_activity_and_status(
        &self,
        activity_id: ActivityId,
        status: RegistrationStatus,
    ) -> anyhow::Result<Vec<Registration>> {
        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.activity_id == activity_id && r.status == status)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.registration_time);
        Ok(found)
    }

    async fn find_pending_payments(&self, user_id: &str) -> anyhow::Result<Vec<Registration>> {
        use club_service::contract::PaymentStatus;

        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.user_id == user_id && r.payment_status == PaymentStatus::Pending)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.registration_time.cmp(&a.registration_time));
        Ok(found)
    }

    async fn find_checked_in(&self, activity_id: ActivityId) -> anyhow::Result<Vec<Registration>> {
        let mut found: Vec<Registration> = self
            .data
            .read()
            .values()
            .filter(|r| r.activity_id == activity_id && r.checked_in)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.check_in_time);
        Ok(found)
    }

    async fn count_by_activity(&self, activity_id: ActivityId) -> anyhow::Result<u64> {
        Ok(self
            .data
            .read()
            .values()
            .filter(|r| r.activity_id == activity_id)
            .count() as u64)
    }

    async fn count_valid(&self, activity_id: ActivityId) -> anyhow::Result<u64> {
        Ok(self
            .data
            .read()
            .values()
            .filter(|r| {
                r.activity_id == activity_id && r.status != RegistrationStatus::Cancelled
            })
            .count() as u64)
    }

    async fn count_checked_in(&self, activity_id: ActivityId) -> anyhow::Result<u64> {
        Ok(self
            .data
            .read()
            .values()
            .filter(|r| r.activity_id == activity_id && r.checked_in)
            .count() as u64)
    }
}

// ===== Fixtures =====

/// Everything a test needs, wired over the mock repositories
pub struct TestEnv {
    pub activities: Arc<MockActivityRepo>,
    pub registrations: Arc<MockRegistrationRepo>,
    pub clock: Arc<ManualClock>,
    pub activity_service: Arc<ActivityService>,
    pub registration_service: Arc<RegistrationService>,
}

pub fn test_env() -> TestEnv {
    let activities = Arc::new(MockActivityRepo::new());
    let registrations = Arc::new(MockRegistrationRepo::new());
    let clock = Arc::new(ManualClock::new(base_time()));

    let activity_service = Arc::new(ActivityService::new(
        activities.clone(),
        registrations.clone(),
        clock.clone(),
    ));
    let registration_service = Arc::new(RegistrationService::new(
        registrations.clone(),
        activity_service.clone(),
        clock.clone(),
    ));

    TestEnv {
        activities,
        registrations,
        clock,
        activity_service,
        registration_service,
    }
}

/// A free, uncapped activity starting a day after `now`
pub fn free_activity(now: DateTime<Utc>) -> NewActivity {
    NewActivity {
        title: "Salsa Night".to_string(),
        description: Some("Open-level social dancing".to_string()),
        location: Some("Main hall".to_string()),
        start_time: now + Duration::hours(24),
        end_time: now + Duration::hours(26),
        max_participants: None,
        registration_deadline: None,
        fee_amount: Decimal::ZERO,
        activity_type: ActivityType::Regular,
        target_audience: TargetAudience::All,
        created_by: "admin".to_string(),
    }
}

/// A paid activity with the given fee, starting a day after `now`
pub fn paid_activity(now: DateTime<Utc>, fee: Decimal) -> NewActivity {
    NewActivity {
        fee_amount: fee,
        ..free_activity(now)
    }
}

/// Create and immediately publish an activity, returning its stored form
pub async fn published_activity(env: &TestEnv, new: NewActivity) -> Activity {
    let created = env
        .activity_service
        .create_activity(new)
        .await
        .expect("create activity");
    env.activity_service
        .publish_activity(created.id)
        .await
        .expect("publish activity")
}
