//! Contract models for the club service
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives - these are pure domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Identifier of an activity (database-assigned)
pub type ActivityId = i64;

/// Identifier of a registration (database-assigned)
pub type RegistrationId = i64;

/// Activity lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityStatus {
    /// Editable, not yet visible to members
    Draft,
    /// Publication queued for a future time
    Scheduled,
    /// Open for viewing and (subject to timing) registration
    Published,
    /// Terminal: called off after publication
    Cancelled,
    /// Terminal: the event took place and was closed out
    Completed,
}

impl ActivityStatus {
    /// Whether this state admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

/// Activity category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    Regular,
    Outdoor,
    Training,
    Orientation,
    Competition,
    WhatsOn,
    NewOnsales,
}

/// Who the activity is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAudience {
    All,
    MemberOnly,
    ManagerOnly,
}

/// Registration lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Active enrollment
    Registered,
    /// Terminal: withdrawn before the activity started
    Cancelled,
    /// Terminal: checked in at the event
    Attended,
    /// Terminal: did not show up
    Absent,
}

/// Payment sub-state of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    /// Free activity, nothing owed
    NotRequired,
    /// Fee owed, not yet paid
    Pending,
    /// Fee settled
    Paid,
}

/// A scheduled club event with capacity, fee and a publish/cancel/complete
/// lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Database-assigned identifier (0 until inserted)
    pub id: ActivityId,
    /// Event name
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Where the event takes place
    pub location: Option<String>,
    /// Event start
    pub start_time: DateTime<Utc>,
    /// Event end (always after start)
    pub end_time: DateTime<Utc>,
    /// Participant cap; None means unlimited
    pub max_participants: Option<i32>,
    /// Registration cut-off; None means registration stays open until start
    pub registration_deadline: Option<DateTime<Utc>>,
    /// Fee per participant; zero means free
    pub fee_amount: Decimal,
    /// Activity category
    pub activity_type: ActivityType,
    /// Intended audience
    pub target_audience: TargetAudience,
    /// Lifecycle state
    pub status: ActivityStatus,
    /// While Scheduled: the requested publication time.
    /// Once Published: the actual publication time.
    pub publish_at: Option<DateTime<Utc>>,
    /// User that created the activity
    pub created_by: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Whether registering for this activity costs anything
    pub fn requires_payment(&self) -> bool {
        self.fee_amount > Decimal::ZERO
    }

    /// Whether the activity is free of charge
    pub fn is_free(&self) -> bool {
        self.fee_amount == Decimal::ZERO
    }

    /// Whether the event has started as of `now`
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        now > self.start_time
    }

    /// Whether the event is over as of `now`
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_time
    }

    /// Whether the event is currently running as of `now`
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        now > self.start_time && now < self.end_time
    }

    /// Whether the registration deadline has passed as of `now`.
    /// An absent deadline never closes.
    pub fn is_registration_closed(&self, now: DateTime<Utc>) -> bool {
        match self.registration_deadline {
            Some(deadline) => now > deadline,
            None => false,
        }
    }

    /// Whether the activity is in the Published state
    pub fn is_published(&self) -> bool {
        self.status == ActivityStatus::Published
    }

    /// Whether members can register as of `now`
    /// (published, registration open, not yet started)
    pub fn can_register(&self, now: DateTime<Utc>) -> bool {
        self.is_published() && !self.is_registration_closed(now) && !self.has_started(now)
    }

    /// Whether a participant cap applies
    pub fn has_participant_limit(&self) -> bool {
        matches!(self.max_participants, Some(cap) if cap > 0)
    }
}

/// Input for creating an activity. The new activity always lands in Draft.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub fee_amount: Decimal,
    pub activity_type: ActivityType,
    pub target_audience: TargetAudience,
    pub created_by: String,
}

/// Replacement values for an activity's mutable fields
#[derive(Debug, Clone)]
pub struct ActivityUpdate {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_participants: Option<i32>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub fee_amount: Decimal,
    pub activity_type: ActivityType,
    pub target_audience: TargetAudience,
}

/// A member's enrollment record against one activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Database-assigned identifier (0 until inserted)
    pub id: RegistrationId,
    /// The activity this registration belongs to
    pub activity_id: ActivityId,
    /// The registered member
    pub user_id: String,
    /// Lifecycle state
    pub status: RegistrationStatus,
    /// Payment sub-state
    pub payment_status: PaymentStatus,
    /// Fee frozen at registration time; not recomputed if the activity fee
    /// later changes
    pub payment_amount: Decimal,
    /// When the member registered
    pub registration_time: DateTime<Utc>,
    /// Free-form note, bounded length
    pub note: Option<String>,
    /// Whether the member has checked in
    pub checked_in: bool,
    /// When the member checked in
    pub check_in_time: Option<DateTime<Utc>>,
    /// Whether check-in happened past the grace window; meaningful only once
    /// checked in
    pub is_late: Option<bool>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Whether the member has checked in
    pub fn is_checked_in(&self) -> bool {
        self.checked_in
    }

    /// Whether the registration can still be withdrawn
    /// (active and not yet checked in)
    pub fn can_cancel(&self) -> bool {
        self.status == RegistrationStatus::Registered && !self.checked_in
    }

    /// Whether the fee has been settled
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Whether a fee is still owed
    pub fn requires_payment(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }
}
