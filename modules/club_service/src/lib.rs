//! Club Service Module
//!
//! Lifecycle engine for club activities and member registrations: the
//! activity state machine (draft, scheduled, published, cancelled,
//! completed), the registration state machine with its payment sub-state and
//! check-in, capacity-guarded admission, and the two time-driven background
//! sweeps (scheduled publication, auto-completion).

// Public exports
pub mod contract;
pub use contract::{
    Activity, ActivityId, ActivityStatus, ActivityType, ActivityUpdate, ClubError, NewActivity,
    PaymentStatus, Registration, RegistrationId, RegistrationStatus, TargetAudience,
};

pub mod module;
pub use module::ClubServiceModule;

pub mod config;
pub use config::Config;

pub mod domain;
pub mod scheduler;

#[doc(hidden)]
pub mod infra;
