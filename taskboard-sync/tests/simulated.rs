use std::time::Duration;

use taskboard_core::{ErrorChannel, SortKey, SortSpec, TaskChanges, TaskDraft, TaskStatus, with_relations};
use taskboard_remote::{SimulatedApi, SimulationConfig};
use taskboard_sync::{Dashboard, RetryPolicy};

fn instant_dashboard() -> Dashboard<SimulatedApi> {
    let api = SimulatedApi::seeded(SimulationConfig::instant()).unwrap();
    Dashboard::new(api)
}

#[tokio::test]
async fn full_round_trip_against_the_simulated_backend() {
    let dash = instant_dashboard();
    dash.load_all().await.unwrap();

    let state = dash.snapshot();
    assert_eq!(state.projects.len(), 3);
    assert_eq!(state.users.len(), 4);
    let seeded = state.tasks.len();
    assert!(seeded > 0);

    let created = dash
        .create_task(TaskDraft::new("Write release notes").with_project("p1"))
        .await
        .unwrap();
    let updated = dash
        .update_task(&created.id, TaskChanges::status(TaskStatus::Review))
        .await
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Review);

    dash.delete_task("1").await.unwrap();

    let state = dash.snapshot();
    assert_eq!(state.tasks.len(), seeded);
    assert!(state.pending.is_empty());
    assert_eq!(dash.api().server_tasks().len(), seeded);

    // every visible task resolves its project
    let view = dash.visible_tasks();
    let rows = with_relations(&view, &state.users, &state.projects);
    assert!(rows.iter().all(|r| r.project.is_some()));
}

#[tokio::test]
async fn sorted_view_over_fetched_tasks() {
    let dash = instant_dashboard();
    dash.fetch_tasks().await.unwrap();

    dash.set_filters(taskboard_core::FilterPatch {
        sort: Some(Some(SortSpec::descending(SortKey::Priority))),
        ..Default::default()
    })
    .await
    .unwrap();

    let ranks: Vec<u8> = dash.visible_tasks().iter().map(|t| t.priority.rank()).collect();
    let mut sorted = ranks.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ranks, sorted);
}

#[tokio::test(start_paused = true)]
async fn always_failing_backend_exhausts_the_retry_budget() {
    let api = SimulatedApi::seeded(SimulationConfig::instant().with_failure_rate(1.0)).unwrap();
    let dash = Dashboard::new(api).with_retry(RetryPolicy::new(2, Duration::from_millis(250)));

    let start = tokio::time::Instant::now();
    assert!(dash.fetch_tasks().await.is_err());
    assert_eq!(start.elapsed(), Duration::from_millis(250));
    assert_eq!(
        dash.error(ErrorChannel::Tasks).as_deref(),
        Some("Network error: could not fetch tasks")
    );
}
