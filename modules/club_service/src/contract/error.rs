//! Contract error types for the club service
//!
//! These errors are transport-agnostic and used for inter-module communication.

use crate::contract::model::{ActivityId, RegistrationId};

/// Club service domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClubError {
    /// Activity or registration not found
    NotFound {
        /// Resource type (activity, registration)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Operation is not legal for the entity's current state
    InvalidState {
        /// Why the transition was refused
        reason: String,
    },
    /// Malformed input (bad time ordering, blank required field, over-length text)
    InvalidArgument {
        /// Validation error message
        message: String,
    },
    /// The activity's participant cap is already reached
    CapacityExceeded {
        /// Activity that is full
        activity_id: ActivityId,
    },
    /// A non-cancelled registration already exists for this (activity, user) pair
    AlreadyRegistered {
        /// Activity the user tried to register for again
        activity_id: ActivityId,
        /// User holding the existing registration
        user_id: String,
    },
    /// Check-in attempted while the registration fee is still unpaid
    PaymentRequired {
        /// Registration with a pending payment
        registration_id: RegistrationId,
    },
    /// Internal error
    Internal,
}

impl std::fmt::Display for ClubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { resource, id } => {
                write!(f, "{} not found: {}", resource, id)
            }
            Self::InvalidState { reason } => {
                write!(f, "Invalid state: {}", reason)
            }
            Self::InvalidArgument { message } => {
                write!(f, "Invalid argument: {}", message)
            }
            Self::CapacityExceeded { activity_id } => {
                write!(f, "Activity {} is full", activity_id)
            }
            Self::AlreadyRegistered {
                activity_id,
                user_id,
            } => {
                write!(
                    f,
                    "User {} is already registered for activity {}",
                    user_id, activity_id
                )
            }
            Self::PaymentRequired { registration_id } => {
                write!(
                    f,
                    "Registration {} has an outstanding payment",
                    registration_id
                )
            }
            Self::Internal => {
                write!(f, "Internal error")
            }
        }
    }
}

impl std::error::Error for ClubError {}
