//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and errors.
//! NO serde derives on models - these are pure domain types.

pub mod error;
pub mod model;

pub use error::ClubError;
pub use model::{
    Activity, ActivityId, ActivityStatus, ActivityType, ActivityUpdate, NewActivity,
    PaymentStatus, Registration, RegistrationId, RegistrationStatus, TargetAudience,
};
