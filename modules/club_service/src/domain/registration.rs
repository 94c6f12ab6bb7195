//! Registration lifecycle manager
//!
//! Owns the registration state machine:
//!
//! ```text
//! (none)     -> Registered  register(activity, user)
//! Registered -> Cancelled   cancel()    before activity start, not checked in
//! Registered -> Attended    check_in()  payment settled
//! ```
//!
//! plus the payment sub-state (NotRequired / Pending / Paid) and the check-in
//! fields. Admission (duplicate + capacity) is delegated to the repository's
//! guarded insert so the count-then-insert is atomic under concurrent
//! attempts.

use crate::contract::{
    ActivityId, ClubError, PaymentStatus, Registration, RegistrationId, RegistrationStatus,
};
use crate::domain::activity::ActivityService;
use crate::domain::clock::Clock;
use crate::domain::repository::{AdmissionOutcome, RegistrationRepository};
use crate::domain::validation;
use chrono::Duration;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Check-ins later than this many minutes past the activity start count as
/// late
const LATE_GRACE_MINUTES: i64 = 30;

/// Domain service for registration lifecycle management
pub struct RegistrationService {
    registrations: Arc<dyn RegistrationRepository>,
    activity_service: Arc<ActivityService>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    /// Create a new service instance
    pub fn new(
        registrations: Arc<dyn RegistrationRepository>,
        activity_service: Arc<ActivityService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registrations,
            activity_service,
            clock,
        }
    }

    /// Get a registration by id
    pub async fn get_registration(&self, id: RegistrationId) -> Result<Registration, ClubError> {
        self.registrations
            .find_by_id(id)
            .await
            .map_err(|_| ClubError::Internal)?
            .ok_or_else(|| ClubError::NotFound {
                resource: "registration".to_string(),
                id: id.to_string(),
            })
    }

    // ===== Lifecycle operations =====

    /// Register a user for an activity.
    ///
    /// The fee is frozen into the registration at this moment: a paid
    /// activity yields a Pending payment over the current fee, a free one
    /// yields NotRequired with amount zero.
    pub async fn register(
        &self,
        activity_id: ActivityId,
        user_id: &str,
        note: Option<String>,
    ) -> Result<Registration, ClubError> {
        validation::validate_user_id(user_id)?;
        validation::validate_note(note.as_deref())?;

        let activity = self.activity_service.get_activity(activity_id).await?;
        let now = self.clock.now();
        self.activity_service
            .validate_can_register(&activity, now)?;

        // Fast-path duplicate check; the guarded insert below re-checks it
        // atomically together with the capacity count.
        let existing = self
            .registrations
            .find_active_by_activity_and_user(activity_id, user_id)
            .await
            .map_err(|_| ClubError::Internal)?;
        if existing.is_some() {
            return Err(ClubError::AlreadyRegistered {
                activity_id,
                user_id: user_id.to_string(),
            });
        }

        let (payment_status, payment_amount) = if activity.requires_payment() {
            (PaymentStatus::Pending, activity.fee_amount)
        } else {
            (PaymentStatus::NotRequired, Decimal::ZERO)
        };

        let registration = Registration {
            id: 0,
            activity_id,
            user_id: user_id.to_string(),
            status: RegistrationStatus::Registered,
            payment_status,
            payment_amount,
            registration_time: now,
            note,
            checked_in: false,
            check_in_time: None,
            is_late: None,
            created_at: now,
            updated_at: now,
        };

        let outcome = self
            .registrations
            .insert_guarded(&registration, activity.max_participants)
            .await
            .map_err(|_| ClubError::Internal)?;

        match outcome {
            AdmissionOutcome::Admitted(stored) => {
                tracing::info!(
                    registration_id = stored.id,
                    activity_id,
                    user_id,
                    "registration created"
                );
                Ok(stored)
            }
            AdmissionOutcome::CapacityExhausted => Err(ClubError::CapacityExceeded { activity_id }),
            AdmissionOutcome::Duplicate => Err(ClubError::AlreadyRegistered {
                activity_id,
                user_id: user_id.to_string(),
            }),
        }
    }

    /// Withdraw a registration. Allowed only before the activity starts and
    /// only while the member has not checked in.
    pub async fn cancel(&self, id: RegistrationId) -> Result<Registration, ClubError> {
        let registration = self.get_registration(id).await?;
        let activity = self
            .activity_service
            .get_activity(registration.activity_id)
            .await?;

        let now = self.clock.now();
        if activity.has_started(now) {
            return Err(ClubError::InvalidState {
                reason: "activity has already started".to_string(),
            });
        }
        if registration.checked_in {
            return Err(ClubError::InvalidState {
                reason: "registration is already checked in".to_string(),
            });
        }
        if registration.status != RegistrationStatus::Registered {
            return Err(ClubError::InvalidState {
                reason: "registration is not active".to_string(),
            });
        }

        let applied = self
            .registrations
            .mark_cancelled(id, now)
            .await
            .map_err(|_| ClubError::Internal)?;
        if !applied {
            return Err(ClubError::InvalidState {
                reason: "registration changed concurrently".to_string(),
            });
        }
        tracing::info!(registration_id = id, "registration cancelled");
        self.get_registration(id).await
    }

    /// Record the registration fee as settled
    pub async fn mark_paid(&self, id: RegistrationId) -> Result<Registration, ClubError> {
        let registration = self.get_registration(id).await?;
        if registration.payment_status != PaymentStatus::Pending {
            return Err(ClubError::InvalidState {
                reason: "registration has no pending payment".to_string(),
            });
        }

        let now = self.clock.now();
        let applied = self
            .registrations
            .mark_paid(id, now)
            .await
            .map_err(|_| ClubError::Internal)?;
        if !applied {
            return Err(ClubError::InvalidState {
                reason: "registration changed concurrently".to_string(),
            });
        }
        tracing::info!(registration_id = id, "registration payment settled");
        self.get_registration(id).await
    }

    /// Check a member in at the event. Requires a settled (or absent) fee,
    /// marks the registration Attended and records whether the member showed
    /// up past the grace window.
    pub async fn check_in(&self, id: RegistrationId) -> Result<Registration, ClubError> {
        let registration = self.get_registration(id).await?;
        let activity = self
            .activity_service
            .get_activity(registration.activity_id)
            .await?;

        if registration.checked_in {
            return Err(ClubError::InvalidState {
                reason: "registration is already checked in".to_string(),
            });
        }
        if registration.status != RegistrationStatus::Registered {
            return Err(ClubError::InvalidState {
                reason: "registration state does not allow check-in".to_string(),
            });
        }
        if registration.requires_payment() {
            return Err(ClubError::PaymentRequired {
                registration_id: id,
            });
        }

        let now = self.clock.now();
        let late_after = activity.start_time + Duration::minutes(LATE_GRACE_MINUTES);
        let is_late = now > late_after;

        let applied = self
            .registrations
            .record_check_in(id, now, is_late, now)
            .await
            .map_err(|_| ClubError::Internal)?;
        if !applied {
            return Err(ClubError::InvalidState {
                reason: "registration changed concurrently".to_string(),
            });
        }
        tracing::info!(registration_id = id, is_late, "registration checked in");
        self.get_registration(id).await
    }

    // ===== Queries =====

    /// All registrations of one user, most recent first
    pub async fn list_user_registrations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Registration>, ClubError> {
        validation::validate_user_id(user_id)?;
        self.registrations
            .find_by_user(user_id)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Non-cancelled registrations for one activity, oldest first
    pub async fn list_activity_registrations(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<Registration>, ClubError> {
        let all = self
            .registrations
            .find_by_activity(activity_id)
            .await
            .map_err(|_| ClubError::Internal)?;
        Ok(all
            .into_iter()
            .filter(|r| r.status != RegistrationStatus::Cancelled)
            .collect())
    }

    /// Registrations of one user in a given state, most recent first
    pub async fn list_user_registrations_by_status(
        &self,
        user_id: &str,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>, ClubError> {
        validation::validate_user_id(user_id)?;
        self.registrations
            .find_by_user_and_status(user_id, status)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Registrations for one activity in a given state, oldest first
    pub async fn list_activity_registrations_by_status(
        &self,
        activity_id: ActivityId,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>, ClubError> {
        self.registrations
            .find_by_activity_and_status(activity_id, status)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Registrations of one user still awaiting payment
    pub async fn list_pending_payments(
        &self,
        user_id: &str,
    ) -> Result<Vec<Registration>, ClubError> {
        validation::validate_user_id(user_id)?;
        self.registrations
            .find_pending_payments(user_id)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Checked-in registrations for one activity
    pub async fn list_checked_in(
        &self,
        activity_id: ActivityId,
    ) -> Result<Vec<Registration>, ClubError> {
        self.registrations
            .find_checked_in(activity_id)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Total registrations for an activity, cancelled included
    pub async fn count_registrations(&self, activity_id: ActivityId) -> Result<u64, ClubError> {
        self.registrations
            .count_by_activity(activity_id)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Non-cancelled registrations for an activity (the number the capacity
    /// cap is enforced against)
    pub async fn count_valid_registrations(
        &self,
        activity_id: ActivityId,
    ) -> Result<u64, ClubError> {
        self.registrations
            .count_valid(activity_id)
            .await
            .map_err(|_| ClubError::Internal)
    }

    /// Checked-in registrations for an activity
    pub async fn count_checked_in(&self, activity_id: ActivityId) -> Result<u64, ClubError> {
        self.registrations
            .count_checked_in(activity_id)
            .await
            .map_err(|_| ClubError::Internal)
    }
}
