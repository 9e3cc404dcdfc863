mod common;

use std::time::Duration;

use common::{ScriptedApi, seed_tasks};
use proptest::prelude::*;
use taskboard_core::{TaskChanges, TaskDraft, TaskStatus, is_temporary_id};
use taskboard_remote::Operation;
use taskboard_sync::Dashboard;

#[derive(Debug, Clone)]
enum Intent {
    Create(String),
    Update(&'static str),
    Delete(&'static str),
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        "[a-z]{3,8}".prop_map(Intent::Create),
        prop::sample::select(vec!["1", "2"]).prop_map(Intent::Update),
        prop::sample::select(vec!["1", "2"]).prop_map(Intent::Delete),
    ]
}

fn op_of(intent: &Intent) -> Operation {
    match intent {
        Intent::Create(_) => Operation::CreateTask,
        Intent::Update(_) => Operation::UpdateTask,
        Intent::Delete(_) => Operation::DeleteTask,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Whatever mix of successes and failures, once every intent is terminal
    // nothing is left pending and no placeholder survives.
    #[test]
    fn tracker_drains_for_any_interleaving(
        intents in prop::collection::vec((intent(), 0u64..400, 0u32..4), 1..10),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        rt.block_on(async move {
            let api = ScriptedApi::new(seed_tasks());
            for (intent, delay_ms, _) in &intents {
                api.delay_next(op_of(intent), Duration::from_millis(*delay_ms));
            }
            // failure counts are per operation kind; the last draw wins
            for (intent, _, failures) in &intents {
                api.fail_next(op_of(intent), *failures);
            }

            let dash = Dashboard::new(api);
            dash.fetch_tasks().await.unwrap();

            let mut set = tokio::task::JoinSet::new();
            for (intent, _, _) in intents {
                let dash = dash.clone();
                set.spawn(async move {
                    match intent {
                        Intent::Create(title) => {
                            let _ = dash.create_task(TaskDraft::new(title)).await;
                        }
                        Intent::Update(id) => {
                            let _ = dash.update_task(id, TaskChanges::status(TaskStatus::Review)).await;
                        }
                        Intent::Delete(id) => {
                            let _ = dash.delete_task(id).await;
                        }
                    }
                });
            }
            while let Some(joined) = set.join_next().await {
                joined.unwrap();
            }

            let state = dash.snapshot();
            assert!(state.pending.is_empty(), "left pending: {:?}", state.pending);
            assert!(state.tasks.ids().iter().all(|id| !is_temporary_id(id)));
            assert!(state.tasks.iter().all(|t| !t.is_optimistic()));
        });
    }
}
