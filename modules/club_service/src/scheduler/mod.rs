//! Time-driven background transitions
//!
//! Two independent periodic tasks share the storage with request handlers:
//! the publish sweep (Scheduled -> Published) and the completion sweep
//! (Published -> Completed). Each holds no state beyond its timer;
//! correctness rests on the guarded transitions in the repository layer.

pub mod completion;
pub mod publish;

pub use completion::CompletionScheduler;
pub use publish::PublishScheduler;
