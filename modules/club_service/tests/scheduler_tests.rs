//! Integration tests for the publish and completion sweeps

use chrono::Duration;
use club_service::contract::ActivityStatus;
use club_service::domain::repository::{ActivityRepository, PublishAtUpdate};
use club_service::domain::Clock;
use club_service::scheduler::{CompletionScheduler, PublishScheduler};
use tokio_util::sync::CancellationToken;

mod common;
use common::{free_activity, published_activity, test_env, TestEnv};

fn publish_scheduler(env: &TestEnv) -> PublishScheduler {
    PublishScheduler::new(
        env.activities.clone(),
        env.clock.clone(),
        std::time::Duration::from_secs(60),
    )
}

fn completion_scheduler(env: &TestEnv) -> CompletionScheduler {
    CompletionScheduler::new(
        env.activities.clone(),
        env.clock.clone(),
        std::time::Duration::from_secs(3600),
    )
}

#[tokio::test]
async fn test_publish_tick_is_noop_when_nothing_due() {
    let env = test_env();
    let now = env.clock.now();

    let created = env
        .activity_service
        .create_activity(free_activity(now))
        .await
        .expect("create activity");
    env.activity_service
        .schedule_publish(created.id, now + Duration::minutes(30))
        .await
        .expect("schedule publish");

    let promoted = publish_scheduler(&env).tick().await.expect("tick");
    assert_eq!(promoted, 0);

    let stored = env.activities.stored(created.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Scheduled);
}

#[tokio::test]
async fn test_publish_tick_promotes_due_and_keeps_requested_time() {
    let env = test_env();
    let now = env.clock.now();
    let requested = now + Duration::minutes(1);

    let created = env
        .activity_service
        .create_activity(free_activity(now))
        .await
        .expect("create activity");
    env.activity_service
        .schedule_publish(created.id, requested)
        .await
        .expect("schedule publish");

    env.clock.advance(Duration::minutes(2));
    let promoted = publish_scheduler(&env).tick().await.expect("tick");
    assert_eq!(promoted, 1);

    let stored = env.activities.stored(created.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);
    // The activity carries the originally requested publication instant,
    // not the tick time
    assert_eq!(stored.publish_at, Some(requested));
    assert_eq!(stored.updated_at, env.clock.now());
}

#[tokio::test]
async fn test_publish_tick_skips_manually_published_activity() {
    let env = test_env();
    let now = env.clock.now();

    let created = env
        .activity_service
        .create_activity(free_activity(now))
        .await
        .expect("create activity");
    env.activity_service
        .schedule_publish(created.id, now + Duration::minutes(1))
        .await
        .expect("schedule publish");

    // A user pulls the activity back to draft and publishes it manually
    // before the sweep runs
    env.activity_service
        .cancel_schedule_publish(created.id)
        .await
        .expect("cancel schedule");
    env.activity_service
        .publish_activity(created.id)
        .await
        .expect("manual publish");
    let manual_publish_at = env
        .activities
        .stored(created.id)
        .expect("stored")
        .publish_at;

    env.clock.advance(Duration::minutes(2));
    let promoted = publish_scheduler(&env).tick().await.expect("tick");
    assert_eq!(promoted, 0);

    let stored = env.activities.stored(created.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);
    assert_eq!(stored.publish_at, manual_publish_at);
}

#[tokio::test]
async fn test_guarded_transition_refuses_unexpected_state() {
    let env = test_env();
    let now = env.clock.now();
    let activity = published_activity(&env, free_activity(now)).await;

    // Expecting Scheduled while the row is Published: the write must not land
    let applied = env
        .activities
        .transition_status(
            activity.id,
            ActivityStatus::Scheduled,
            ActivityStatus::Published,
            PublishAtUpdate::Keep,
            now,
        )
        .await
        .expect("transition");
    assert!(!applied);

    let stored = env.activities.stored(activity.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);
}

#[tokio::test]
async fn test_publish_tick_continues_past_failing_entity() {
    let env = test_env();
    let now = env.clock.now();

    let broken = env
        .activity_service
        .create_activity(free_activity(now))
        .await
        .expect("create activity");
    let mut other_new = free_activity(now);
    other_new.title = "Tango practice".to_string();
    let healthy = env
        .activity_service
        .create_activity(other_new)
        .await
        .expect("create activity");

    for id in [broken.id, healthy.id] {
        env.activity_service
            .schedule_publish(id, now + Duration::minutes(1))
            .await
            .expect("schedule publish");
    }
    env.activities.fail_transitions_for(broken.id);

    env.clock.advance(Duration::minutes(2));
    let promoted = publish_scheduler(&env).tick().await.expect("tick");

    // The failing row is logged and skipped; the rest of the batch proceeds
    assert_eq!(promoted, 1);
    let stored = env.activities.stored(healthy.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);
    let stored = env.activities.stored(broken.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Scheduled);
}

#[tokio::test]
async fn test_completion_tick_completes_expired_once() {
    let env = test_env();
    let now = env.clock.now();
    let activity = published_activity(&env, free_activity(now)).await;

    env.clock.set(activity.end_time + Duration::hours(1));
    let scheduler = completion_scheduler(&env);

    let completed = scheduler.tick().await.expect("tick");
    assert_eq!(completed, 1);
    let stored = env.activities.stored(activity.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Completed);

    // Second sweep over the same rows is a no-op
    let completed = scheduler.tick().await.expect("tick");
    assert_eq!(completed, 0);
}

#[tokio::test]
async fn test_completion_tick_skips_cancelled_activity() {
    let env = test_env();
    let now = env.clock.now();
    let activity = published_activity(&env, free_activity(now)).await;

    env.activity_service
        .cancel_activity(activity.id)
        .await
        .expect("cancel activity");

    env.clock.set(activity.end_time + Duration::hours(1));
    let completed = completion_scheduler(&env).tick().await.expect("tick");
    assert_eq!(completed, 0);

    let stored = env.activities.stored(activity.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Cancelled);
}

#[tokio::test]
async fn test_completion_tick_ignores_running_activity() {
    let env = test_env();
    let now = env.clock.now();
    let activity = published_activity(&env, free_activity(now)).await;

    // Mid-event: not expired yet
    env.clock.set(activity.start_time + Duration::minutes(30));
    let completed = completion_scheduler(&env).tick().await.expect("tick");
    assert_eq!(completed, 0);

    let stored = env.activities.stored(activity.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);
}

#[tokio::test(start_paused = true)]
async fn test_publish_run_loop_sweeps_until_cancelled() {
    let env = test_env();
    let now = env.clock.now();

    let created = env
        .activity_service
        .create_activity(free_activity(now))
        .await
        .expect("create activity");
    env.activity_service
        .schedule_publish(created.id, now + Duration::minutes(1))
        .await
        .expect("schedule publish");
    env.clock.advance(Duration::minutes(2));

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(publish_scheduler(&env).run(cancel.clone()));

    // Paused time auto-advances; the first interval tick fires immediately
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    let stored = env.activities.stored(created.id).expect("stored");
    assert_eq!(stored.status, ActivityStatus::Published);

    cancel.cancel();
    handle.await.expect("scheduler task");
}
