//! Domain layer - business logic and services

pub mod activity;
pub mod clock;
pub mod registration;
pub mod repository;
pub mod validation;

pub use activity::ActivityService;
pub use clock::{Clock, SystemClock};
pub use registration::RegistrationService;
pub use repository::{
    ActivityRepository, AdmissionOutcome, PublishAtUpdate, RegistrationRepository,
};
