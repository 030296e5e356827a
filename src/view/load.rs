//! Data Loading
//!
//! `load_all` issues at most two reads: objectives, then key results of all
//! loaded objectives in one batched membership query.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::error::{ViewError, LOAD_FAILED};
use super::OkrView;
use crate::model::{KeyResult, KeyResultGroups, Objective, KEY_RESULTS, OBJECTIVES};
use crate::remote::{RemoteError, RemoteResult, SelectQuery};

impl OkrView {
    /// Reload every objective and key result from the store.
    ///
    /// On an objective read failure nothing changes. On a key result read
    /// failure the objectives of this load stay in place while the grouping
    /// keeps its previous value.
    pub async fn load_all(&mut self) -> Result<(), ViewError> {
        self.ensure_active()?;
        self.begin();

        let store = Arc::clone(&self.store);

        let query = SelectQuery::new(OBJECTIVES).order("created_at", false);
        let fetched = self.remote(store.select(&query)).await?;
        let objectives = match fetched.and_then(decode_rows::<Objective>(OBJECTIVES)) {
            Ok(objectives) => objectives,
            Err(source) => return Err(self.fail(load_error(source))),
        };
        self.state.objectives = objectives;

        if self.state.objectives.is_empty() {
            self.state.key_results.clear();
            tracing::debug!("No objectives, skipping key result read");
            self.finish();
            return Ok(());
        }

        let ids: Vec<Value> = self
            .state
            .objectives
            .iter()
            .map(|o| Value::from(o.id.as_str()))
            .collect();
        let query = SelectQuery::new(KEY_RESULTS).in_list("objective_id", ids);
        let fetched = self.remote(store.select(&query)).await?;
        let key_results = match fetched.and_then(decode_rows::<KeyResult>(KEY_RESULTS)) {
            Ok(key_results) => key_results,
            Err(source) => return Err(self.fail(load_error(source))),
        };
        self.state.key_results = KeyResultGroups::from_key_results(key_results);

        tracing::debug!(
            objectives = self.state.objectives.len(),
            key_results = self.state.key_results.len(),
            "Loaded OKR data"
        );
        self.finish();
        Ok(())
    }
}

fn load_error(source: RemoteError) -> ViewError {
    ViewError::Remote {
        fallback: LOAD_FAILED,
        source,
    }
}

/// Decode raw store rows into records of one table
pub(super) fn decode_rows<T: DeserializeOwned>(
    table: &'static str,
) -> impl FnOnce(Vec<Value>) -> RemoteResult<Vec<T>> {
    move |rows| {
        rows.into_iter()
            .map(|row| {
                serde_json::from_value(row).map_err(|e| RemoteError::Decode {
                    table: table.to_string(),
                    error: e.to_string(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordId;
    use crate::remote::{MemoryStore, StoreCall, StoreOp};
    use crate::view::{NoticeKind, Phase};
    use serde_json::json;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::okr());
        store
            .seed(
                OBJECTIVES,
                vec![
                    json!({"title": "Oldest"}),
                    json!({"title": "Middle", "owner": "hong.vu"}),
                    json!({"title": "Newest"}),
                ],
            )
            .await;
        store
            .seed(
                KEY_RESULTS,
                vec![
                    json!({"objective_id": 1, "title": "KR 1a", "target_value": 10}),
                    json!({"objective_id": 3, "title": "KR 3a", "target_value": null}),
                    json!({"objective_id": 1, "title": "KR 1b", "target_value": 2.5}),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_objectives_newest_first() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store);
        view.load_all().await.unwrap();

        let titles: Vec<_> = view.state().objectives.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
        assert_eq!(view.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_key_results_grouped_by_objective() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store);
        view.load_all().await.unwrap();

        let groups = &view.state().key_results;
        let first: Vec<_> = groups
            .for_objective(&RecordId::new("1"))
            .iter()
            .map(|kr| kr.title.as_str())
            .collect();
        assert_eq!(first, vec!["KR 1a", "KR 1b"]);
        assert_eq!(groups.for_objective(&RecordId::new("3")).len(), 1);
        assert!(groups.for_objective(&RecordId::new("2")).is_empty());

        for objective in &view.state().objectives {
            for kr in groups.for_objective(&objective.id) {
                assert_eq!(kr.objective_id, objective.id);
            }
        }
    }

    #[tokio::test]
    async fn test_key_results_fetched_in_one_batched_query() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        let calls = store.calls().await;
        assert_eq!(calls.len(), 2);
        match &calls[1] {
            StoreCall::Select(query) => {
                assert_eq!(query.table, KEY_RESULTS);
                assert_eq!(
                    query.to_params()[1],
                    ("objective_id".to_string(), "in.(3,2,1)".to_string())
                );
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_objectives_skips_key_result_read() {
        let store = Arc::new(MemoryStore::okr());
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        assert!(view.state().objectives.is_empty());
        assert!(view.state().key_results.is_empty());
        assert!(store.calls_to(StoreOp::Select, KEY_RESULTS).await.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_loads_yield_identical_state() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store);

        view.load_all().await.unwrap();
        let first = view.state().clone();
        view.load_all().await.unwrap();

        assert_eq!(*view.state(), first);
    }

    #[tokio::test]
    async fn test_objective_failure_keeps_previous_data() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();
        let before = view.state().clone();

        store.seed(OBJECTIVES, vec![json!({"title": "Unseen"})]).await;
        store
            .fail_next(StoreOp::Select, OBJECTIVES, "permission denied for table objectives")
            .await;
        let err = view.load_all().await.unwrap_err();

        assert_eq!(err.user_message(), "permission denied for table objectives");
        assert_eq!(view.state().objectives, before.objectives);
        assert_eq!(view.state().key_results, before.key_results);
        assert_eq!(view.state().phase, Phase::Idle);
        assert_eq!(view.state().notice.as_ref().unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_key_result_failure_keeps_new_objectives_and_old_groups() {
        let store = seeded_store().await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();
        let groups_before = view.state().key_results.clone();

        store.seed(OBJECTIVES, vec![json!({"title": "Fresh"})]).await;
        store.seed(KEY_RESULTS, vec![json!({"objective_id": 2, "title": "KR 2a"})]).await;
        store.fail_next(StoreOp::Select, KEY_RESULTS, "").await;

        assert!(view.load_all().await.is_err());
        assert_eq!(view.state().objectives.len(), 4);
        assert_eq!(view.state().objectives[0].title, "Fresh");
        assert_eq!(view.state().key_results, groups_before);
        assert_eq!(view.state().notice.as_ref().unwrap().message, LOAD_FAILED);
        assert_eq!(view.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_malformed_rows_fail_the_load() {
        let store = Arc::new(MemoryStore::new());
        store.seed(OBJECTIVES, vec![json!({"name": "no title"})]).await;

        let mut view = OkrView::new(store);
        let err = view.load_all().await.unwrap_err();
        assert!(matches!(
            err,
            ViewError::Remote {
                source: RemoteError::Decode { .. },
                ..
            }
        ));
    }
}
