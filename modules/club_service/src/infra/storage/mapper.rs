//! Entity to model mappers
//!
//! Conversions between SeaORM entities and contract models. Status strings
//! are parsed strictly: an unknown stored value is a data error, not a
//! default.

use crate::contract::{
    Activity, ActivityStatus, ActivityType, PaymentStatus, Registration, RegistrationStatus,
    TargetAudience,
};
use anyhow::bail;

use super::entity;

// ===== Activity conversions =====

impl TryFrom<entity::Model> for Activity {
    type Error = anyhow::Error;

    fn try_from(entity: entity::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            title: entity.title,
            description: entity.description,
            location: entity.location,
            start_time: entity.start_time,
            end_time: entity.end_time,
            max_participants: entity.max_participants,
            registration_deadline: entity.registration_deadline,
            fee_amount: entity.fee_amount,
            activity_type: parse_activity_type(&entity.activity_type)?,
            target_audience: parse_target_audience(&entity.target_audience)?,
            status: parse_activity_status(&entity.status)?,
            publish_at: entity.publish_at,
            created_by: entity.created_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&Activity> for entity::ActiveModel {
    fn from(model: &Activity) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            id: Set(model.id),
            title: Set(model.title.clone()),
            description: Set(model.description.clone()),
            location: Set(model.location.clone()),
            start_time: Set(model.start_time),
            end_time: Set(model.end_time),
            max_participants: Set(model.max_participants),
            registration_deadline: Set(model.registration_deadline),
            fee_amount: Set(model.fee_amount),
            activity_type: Set(format_activity_type(model.activity_type).to_string()),
            target_audience: Set(format_target_audience(model.target_audience).to_string()),
            status: Set(format_activity_status(model.status).to_string()),
            publish_at: Set(model.publish_at),
            created_by: Set(model.created_by.clone()),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== Registration conversions =====

impl TryFrom<entity::registration::Model> for Registration {
    type Error = anyhow::Error;

    fn try_from(entity: entity::registration::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            activity_id: entity.activity_id,
            user_id: entity.user_id,
            status: parse_registration_status(&entity.status)?,
            payment_status: parse_payment_status(&entity.payment_status)?,
            payment_amount: entity.payment_amount,
            registration_time: entity.registration_time,
            note: entity.note,
            checked_in: entity.checked_in,
            check_in_time: entity.check_in_time,
            is_late: entity.is_late,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

impl From<&Registration> for entity::registration::ActiveModel {
    fn from(model: &Registration) -> Self {
        use sea_orm::ActiveValue::Set;

        Self {
            id: Set(model.id),
            activity_id: Set(model.activity_id),
            user_id: Set(model.user_id.clone()),
            status: Set(format_registration_status(model.status).to_string()),
            payment_status: Set(format_payment_status(model.payment_status).to_string()),
            payment_amount: Set(model.payment_amount),
            registration_time: Set(model.registration_time),
            note: Set(model.note.clone()),
            checked_in: Set(model.checked_in),
            check_in_time: Set(model.check_in_time),
            is_late: Set(model.is_late),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        }
    }
}

// ===== String forms =====

pub fn parse_activity_status(s: &str) -> anyhow::Result<ActivityStatus> {
    Ok(match s {
        "DRAFT" => ActivityStatus::Draft,
        "SCHEDULED" => ActivityStatus::Scheduled,
        "PUBLISHED" => ActivityStatus::Published,
        "CANCELLED" => ActivityStatus::Cancelled,
        "COMPLETED" => ActivityStatus::Completed,
        other => bail!("unknown activity status: {}", other),
    })
}

pub fn format_activity_status(status: ActivityStatus) -> &'static str {
    match status {
        ActivityStatus::Draft => "DRAFT",
        ActivityStatus::Scheduled => "SCHEDULED",
        ActivityStatus::Published => "PUBLISHED",
        ActivityStatus::Cancelled => "CANCELLED",
        ActivityStatus::Completed => "COMPLETED",
    }
}

pub fn parse_activity_type(s: &str) -> anyhow::Result<ActivityType> {
    Ok(match s {
        "REGULAR" => ActivityType::Regular,
        "OUTDOOR" => ActivityType::Outdoor,
        "TRAINING" => ActivityType::Training,
        "ORIENTATION" => ActivityType::Orientation,
        "COMPETITION" => ActivityType::Competition,
        "WHATS_ON" => ActivityType::WhatsOn,
        "NEW_ONSALES" => ActivityType::NewOnsales,
        other => bail!("unknown activity type: {}", other),
    })
}

pub fn format_activity_type(activity_type: ActivityType) -> &'static str {
    match activity_type {
        ActivityType::Regular => "REGULAR",
        ActivityType::Outdoor => "OUTDOOR",
        ActivityType::Training => "TRAINING",
        ActivityType::Orientation => "ORIENTATION",
        ActivityType::Competition => "COMPETITION",
        ActivityType::WhatsOn => "WHATS_ON",
        ActivityType::NewOnsales => "NEW_ONSALES",
    }
}

pub fn parse_target_audience(s: &str) -> anyhow::Result<TargetAudience> {
    Ok(match s {
        "ALL" => TargetAudience::All,
        "MEMBER_ONLY" => TargetAudience::MemberOnly,
        "MANAGER_ONLY" => TargetAudience::ManagerOnly,
        other => bail!("unknown target audience: {}", other),
    })
}

pub fn format_target_audience(audience: TargetAudience) -> &'static str {
    match audience {
        TargetAudience::All => "ALL",
        TargetAudience::MemberOnly => "MEMBER_ONLY",
        TargetAudience::ManagerOnly => "MANAGER_ONLY",
    }
}

pub fn parse_registration_status(s: &str) -> anyhow::Result<RegistrationStatus> {
    Ok(match s {
        "REGISTERED" => RegistrationStatus::Registered,
        "CANCELLED" => RegistrationStatus::Cancelled,
        "ATTENDED" => RegistrationStatus::Attended,
        "ABSENT" => RegistrationStatus::Absent,
        other => bail!("unknown registration status: {}", other),
    })
}

pub fn format_registration_status(status: RegistrationStatus) -> &'static str {
    match status {
        RegistrationStatus::Registered => "REGISTERED",
        RegistrationStatus::Cancelled => "CANCELLED",
        RegistrationStatus::Attended => "ATTENDED",
        RegistrationStatus::Absent => "ABSENT",
    }
}

pub fn parse_payment_status(s: &str) -> anyhow::Result<PaymentStatus> {
    Ok(match s {
        "NOT_REQUIRED" => PaymentStatus::NotRequired,
        "PENDING" => PaymentStatus::Pending,
        "PAID" => PaymentStatus::Paid,
        other => bail!("unknown payment status: {}", other),
    })
}

pub fn format_payment_status(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::NotRequired => "NOT_REQUIRED",
        PaymentStatus::Pending => "PENDING",
        PaymentStatus::Paid => "PAID",
    }
}
