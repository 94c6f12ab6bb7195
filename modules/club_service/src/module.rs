//! Module wiring and lifecycle
//!
//! Builds the repositories, services and background schedulers from a
//! database handle. The host application owns the connection, runs the
//! migrations, and cancels the token on shutdown.

use crate::config::Config;
use crate::domain::{ActivityService, RegistrationService, SystemClock};
use crate::domain::clock::Clock;
use crate::domain::repository::ActivityRepository;
use crate::infra::storage::repositories::{
    SeaOrmActivityRepository, SeaOrmRegistrationRepository,
};
use crate::scheduler::{CompletionScheduler, PublishScheduler};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Club service module
pub struct ClubServiceModule {
    config: Config,
    activities: Arc<dyn ActivityRepository>,
    activity_service: Arc<ActivityService>,
    registration_service: Arc<RegistrationService>,
    clock: Arc<dyn Clock>,
}

impl ClubServiceModule {
    /// Run the module's database migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("club service migrations completed");
        Ok(())
    }

    /// Build the module over the given database connection
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// Build the module with an explicit clock (tests drive time through it)
    pub fn with_clock(
        db: Arc<DatabaseConnection>,
        config: Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let activities: Arc<dyn ActivityRepository> =
            Arc::new(SeaOrmActivityRepository::new(db.clone()));
        let registrations = Arc::new(SeaOrmRegistrationRepository::new(db));

        let activity_service = Arc::new(ActivityService::new(
            activities.clone(),
            registrations.clone(),
            clock.clone(),
        ));
        let registration_service = Arc::new(RegistrationService::new(
            registrations,
            activity_service.clone(),
            clock.clone(),
        ));

        tracing::info!("club service initialized");
        Self {
            config,
            activities,
            activity_service,
            registration_service,
            clock,
        }
    }

    /// The activity lifecycle manager
    pub fn activity_service(&self) -> Arc<ActivityService> {
        self.activity_service.clone()
    }

    /// The registration lifecycle manager
    pub fn registration_service(&self) -> Arc<RegistrationService> {
        self.registration_service.clone()
    }

    /// Start the two background sweeps. They run until the token is
    /// cancelled.
    pub fn spawn_schedulers(&self, cancel: &CancellationToken) -> Vec<JoinHandle<()>> {
        let publish = PublishScheduler::new(
            self.activities.clone(),
            self.clock.clone(),
            Duration::from_secs(self.config.publish_sweep_interval_secs),
        );
        let completion = CompletionScheduler::new(
            self.activities.clone(),
            self.clock.clone(),
            Duration::from_secs(self.config.completion_sweep_interval_secs),
        );

        vec![
            tokio::spawn(publish.run(cancel.clone())),
            tokio::spawn(completion.run(cancel.clone())),
        ]
    }
}
