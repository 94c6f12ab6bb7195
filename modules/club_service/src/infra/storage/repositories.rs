//! SeaORM repository implementations

use crate::contract::{
    Activity, ActivityId, ActivityStatus, ActivityType, Registration, RegistrationId,
    RegistrationStatus,
};
use crate::domain::repository::{
    ActivityRepository, AdmissionOutcome, PublishAtUpdate, RegistrationRepository,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Func;
use sea_orm::{
    prelude::Expr, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use std::sync::Arc;

use super::entity;
use super::mapper;

// ===== Activity repository =====

pub struct SeaOrmActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmActivityRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn published_filter() -> sea_orm::sea_query::SimpleExpr {
    entity::Column::Status.eq(mapper::format_activity_status(ActivityStatus::Published))
}

#[async_trait]
impl ActivityRepository for SeaOrmActivityRepository {
    async fn insert(&self, activity: &Activity) -> Result<Activity> {
        let mut active: entity::ActiveModel = activity.into();
        active.id = NotSet;

        let stored = entity::Entity::insert(active)
            .exec_with_returning(&*self.db)
            .await?;
        stored.try_into()
    }

    async fn find_by_id(&self, id: ActivityId) -> Result<Option<Activity>> {
        let result = entity::Entity::find_by_id(id).one(&*self.db).await?;

        match result {
            Some(model) => Ok(Some(model.try_into()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, activity: &Activity) -> Result<Activity> {
        let active: entity::ActiveModel = activity.into();

        let stored = entity::Entity::update(active).exec(&*self.db).await?;
        stored.try_into()
    }

    async fn delete(&self, id: ActivityId) -> Result<()> {
        entity::Entity::delete_by_id(id).exec(&*self.db).await?;

        Ok(())
    }

    async fn transition_status(
        &self,
        id: ActivityId,
        expected: ActivityStatus,
        next: ActivityStatus,
        publish_at: PublishAtUpdate,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let mut update = entity::Entity::update_many()
            .col_expr(
                entity::Column::Status,
                Expr::value(mapper::format_activity_status(next)),
            )
            .col_expr(entity::Column::UpdatedAt, Expr::value(now))
            .filter(entity::Column::Id.eq(id))
            .filter(entity::Column::Status.eq(mapper::format_activity_status(expected)));

        match publish_at {
            PublishAtUpdate::Keep => {}
            PublishAtUpdate::Set(at) => {
                update = update.col_expr(entity::Column::PublishAt, Expr::value(at));
            }
            PublishAtUpdate::Clear => {
                update = update.col_expr(
                    entity::Column::PublishAt,
                    Expr::value(Option::<DateTime<Utc>>::None),
                );
            }
        }

        let result = update.exec(&*self.db).await?;
        Ok(result.rows_affected == 1)
    }

    async fn list_all(&self) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_published(&self) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(published_filter())
            .order_by_asc(entity::Column::StartTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_published_by_type(&self, activity_type: ActivityType) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(published_filter())
            .filter(entity::Column::ActivityType.eq(mapper::format_activity_type(activity_type)))
            .order_by_asc(entity::Column::StartTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn search_published(&self, keyword: &str) -> Result<Vec<Activity>> {
        let pattern = format!("%{}%", keyword.to_lowercase());
        let results = entity::Entity::find()
            .filter(published_filter())
            .filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(entity::Column::Title)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(entity::Column::Description)))
                            .like(pattern),
                    ),
            )
            .order_by_asc(entity::Column::StartTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_registrable(&self, now: DateTime<Utc>) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(published_filter())
            .filter(
                Condition::any()
                    .add(entity::Column::RegistrationDeadline.is_null())
                    .add(entity::Column::RegistrationDeadline.gt(now)),
            )
            .filter(entity::Column::StartTime.gt(now))
            .order_by_asc(entity::Column::StartTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(published_filter())
            .filter(entity::Column::StartTime.between(from, until))
            .order_by_asc(entity::Column::StartTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_drafts(&self) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(entity::Column::Status.eq(mapper::format_activity_status(ActivityStatus::Draft)))
            .order_by_desc(entity::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_creator(&self, created_by: &str) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(entity::Column::CreatedBy.eq(created_by))
            .order_by_desc(entity::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_due_for_publish(&self, now: DateTime<Utc>) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(
                entity::Column::Status
                    .eq(mapper::format_activity_status(ActivityStatus::Scheduled)),
            )
            .filter(entity::Column::PublishAt.lte(now))
            .order_by_asc(entity::Column::PublishAt)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> Result<Vec<Activity>> {
        let results = entity::Entity::find()
            .filter(published_filter())
            .filter(entity::Column::EndTime.lt(now))
            .order_by_asc(entity::Column::EndTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }
}

// ===== Registration repository =====

pub struct SeaOrmRegistrationRepository {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRegistrationRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

fn cancelled() -> &'static str {
    mapper::format_registration_status(RegistrationStatus::Cancelled)
}

#[async_trait]
impl RegistrationRepository for SeaOrmRegistrationRepository {
    async fn insert_guarded(
        &self,
        registration: &Registration,
        capacity: Option<i32>,
    ) -> Result<AdmissionOutcome> {
        let txn = self.db.begin().await?;

        // Serialize admissions per activity by locking the parent row for
        // the duration of count-and-insert. SQLite ignores the lock clause;
        // there the write transaction itself serializes.
        let _activity = entity::Entity::find_by_id(registration.activity_id)
            .lock_exclusive()
            .one(&txn)
            .await?;

        let duplicates = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(registration.activity_id))
            .filter(entity::registration::Column::UserId.eq(&registration.user_id))
            .filter(entity::registration::Column::Status.ne(cancelled()))
            .count(&txn)
            .await?;
        if duplicates > 0 {
            txn.rollback().await?;
            return Ok(AdmissionOutcome::Duplicate);
        }

        if let Some(cap) = capacity {
            let taken = entity::registration::Entity::find()
                .filter(entity::registration::Column::ActivityId.eq(registration.activity_id))
                .filter(entity::registration::Column::Status.ne(cancelled()))
                .count(&txn)
                .await?;
            if taken >= cap as u64 {
                txn.rollback().await?;
                return Ok(AdmissionOutcome::CapacityExhausted);
            }
        }

        let mut active: entity::registration::ActiveModel = registration.into();
        active.id = NotSet;
        let stored = entity::registration::Entity::insert(active)
            .exec_with_returning(&txn)
            .await?;
        txn.commit().await?;

        Ok(AdmissionOutcome::Admitted(stored.try_into()?))
    }

    async fn find_by_id(&self, id: RegistrationId) -> Result<Option<Registration>> {
        let result = entity::registration::Entity::find_by_id(id)
            .one(&*self.db)
            .await?;

        match result {
            Some(model) => Ok(Some(model.try_into()?)),
            None => Ok(None),
        }
    }

    async fn find_active_by_activity_and_user(
        &self,
        activity_id: ActivityId,
        user_id: &str,
    ) -> Result<Option<Registration>> {
        let result = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .filter(entity::registration::Column::UserId.eq(user_id))
            .filter(entity::registration::Column::Status.ne(cancelled()))
            .one(&*self.db)
            .await?;

        match result {
            Some(model) => Ok(Some(model.try_into()?)),
            None => Ok(None),
        }
    }

    async fn mark_cancelled(&self, id: RegistrationId, now: DateTime<Utc>) -> Result<bool> {
        let result = entity::registration::Entity::update_many()
            .col_expr(
                entity::registration::Column::Status,
                Expr::value(cancelled()),
            )
            .col_expr(entity::registration::Column::UpdatedAt, Expr::value(now))
            .filter(entity::registration::Column::Id.eq(id))
            .filter(
                entity::registration::Column::Status
                    .eq(mapper::format_registration_status(RegistrationStatus::Registered)),
            )
            .filter(entity::registration::Column::CheckedIn.eq(false))
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn mark_paid(&self, id: RegistrationId, now: DateTime<Utc>) -> Result<bool> {
        use crate::contract::PaymentStatus;

        let result = entity::registration::Entity::update_many()
            .col_expr(
                entity::registration::Column::PaymentStatus,
                Expr::value(mapper::format_payment_status(PaymentStatus::Paid)),
            )
            .col_expr(entity::registration::Column::UpdatedAt, Expr::value(now))
            .filter(entity::registration::Column::Id.eq(id))
            .filter(
                entity::registration::Column::PaymentStatus
                    .eq(mapper::format_payment_status(PaymentStatus::Pending)),
            )
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn record_check_in(
        &self,
        id: RegistrationId,
        check_in_time: DateTime<Utc>,
        is_late: bool,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        use crate::contract::PaymentStatus;

        let result = entity::registration::Entity::update_many()
            .col_expr(entity::registration::Column::CheckedIn, Expr::value(true))
            .col_expr(
                entity::registration::Column::CheckInTime,
                Expr::value(check_in_time),
            )
            .col_expr(entity::registration::Column::IsLate, Expr::value(is_late))
            .col_expr(
                entity::registration::Column::Status,
                Expr::value(mapper::format_registration_status(
                    RegistrationStatus::Attended,
                )),
            )
            .col_expr(entity::registration::Column::UpdatedAt, Expr::value(now))
            .filter(entity::registration::Column::Id.eq(id))
            .filter(
                entity::registration::Column::Status
                    .eq(mapper::format_registration_status(RegistrationStatus::Registered)),
            )
            .filter(entity::registration::Column::CheckedIn.eq(false))
            .filter(
                entity::registration::Column::PaymentStatus
                    .ne(mapper::format_payment_status(PaymentStatus::Pending)),
            )
            .exec(&*self.db)
            .await?;

        Ok(result.rows_affected == 1)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Registration>> {
        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::UserId.eq(user_id))
            .order_by_desc(entity::registration::Column::RegistrationTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_activity(&self, activity_id: ActivityId) -> Result<Vec<Registration>> {
        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .order_by_asc(entity::registration::Column::RegistrationTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_user_and_status(
        &self,
        user_id: &str,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>> {
        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::UserId.eq(user_id))
            .filter(
                entity::registration::Column::Status
                    .eq(mapper::format_registration_status(status)),
            )
            .order_by_desc(entity::registration::Column::RegistrationTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_by_activity_and_status(
        &self,
        activity_id: ActivityId,
        status: RegistrationStatus,
    ) -> Result<Vec<Registration>> {
        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .filter(
                entity::registration::Column::Status
                    .eq(mapper::format_registration_status(status)),
            )
            .order_by_asc(entity::registration::Column::RegistrationTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_pending_payments(&self, user_id: &str) -> Result<Vec<Registration>> {
        use crate::contract::PaymentStatus;

        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::UserId.eq(user_id))
            .filter(
                entity::registration::Column::PaymentStatus
                    .eq(mapper::format_payment_status(PaymentStatus::Pending)),
            )
            .order_by_desc(entity::registration::Column::RegistrationTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_checked_in(&self, activity_id: ActivityId) -> Result<Vec<Registration>> {
        let results = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .filter(entity::registration::Column::CheckedIn.eq(true))
            .order_by_asc(entity::registration::Column::CheckInTime)
            .all(&*self.db)
            .await?;

        results.into_iter().map(TryInto::try_into).collect()
    }

    async fn count_by_activity(&self, activity_id: ActivityId) -> Result<u64> {
        let count = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn count_valid(&self, activity_id: ActivityId) -> Result<u64> {
        let count = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .filter(entity::registration::Column::Status.ne(cancelled()))
            .count(&*self.db)
            .await?;

        Ok(count)
    }

    async fn count_checked_in(&self, activity_id: ActivityId) -> Result<u64> {
        let count = entity::registration::Entity::find()
            .filter(entity::registration::Column::ActivityId.eq(activity_id))
            .filter(entity::registration::Column::CheckedIn.eq(true))
            .count(&*self.db)
            .await?;

        Ok(count)
    }
}
