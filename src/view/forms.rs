//! Creation Forms
//!
//! One insert per submission. Inputs survive a failed write so the user can
//! retry without retyping.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::error::{
    ViewError, CREATE_KEY_RESULT_FAILED, CREATE_OBJECTIVE_FAILED, TARGET_NOT_NUMBER,
};
use super::load::decode_rows;
use super::{OkrView, RefreshStrategy};
use crate::model::{
    KeyResult, NewKeyResult, NewObjective, Objective, RecordId, KEY_RESULTS, OBJECTIVES,
};
use crate::remote::{RemoteError, RemoteResult};

/// Parse the optional numeric target of a key result.
///
/// Only empty input means "no target". Surrounding whitespace is ignored and
/// whitespace alone reads as `0`. Decimal and exponent forms are accepted, as
/// are unsigned `0x`, `0o` and `0b` integers. The value must be finite, since
/// the store receives it as a JSON number.
pub fn parse_target(text: &str) -> Result<Option<f64>, ViewError> {
    if text.is_empty() {
        return Ok(None);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Some(0.0));
    }

    let parsed = match radix_prefix(trimmed) {
        // from_str_radix would accept a sign after the prefix
        Some((_, digits)) if digits.starts_with(['+', '-']) => None,
        Some((radix, digits)) => u64::from_str_radix(digits, radix).ok().map(|n| n as f64),
        None => trimmed.parse::<f64>().ok(),
    };

    match parsed {
        Some(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ViewError::Validation(TARGET_NOT_NUMBER.to_string())),
    }
}

fn radix_prefix(text: &str) -> Option<(u32, &str)> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

impl OkrView {
    /// Create one objective from form input.
    ///
    /// A title that trims to nothing makes this a no-op.
    pub async fn create_objective(&mut self, title: &str, owner: &str) -> Result<(), ViewError> {
        self.state.form.objective_title = title.to_string();
        self.state.form.objective_owner = owner.to_string();

        let Some(objective) = NewObjective::from_input(title, owner) else {
            tracing::debug!("Objective title is blank, nothing to create");
            self.publish();
            return Ok(());
        };

        self.ensure_active()?;
        self.begin();

        let store = Arc::clone(&self.store);
        let result = match encode_row(OBJECTIVES, &objective) {
            Ok(row) => self.remote(store.insert(OBJECTIVES, vec![row])).await?,
            Err(e) => Err(e),
        };
        let inserted = match result {
            Ok(rows) => rows,
            Err(source) => {
                return Err(self.fail(ViewError::Remote {
                    fallback: CREATE_OBJECTIVE_FAILED,
                    source,
                }))
            }
        };

        tracing::info!(title = %objective.title, "Created objective");
        self.state.form.objective_title.clear();
        self.state.form.objective_owner.clear();

        if self.refresh == RefreshStrategy::Incremental {
            if let Some(created) = decode_inserted::<Objective>(OBJECTIVES, inserted) {
                for objective in created.into_iter().rev() {
                    self.state.objectives.insert(0, objective);
                }
                self.finish();
                return Ok(());
            }
        }
        self.reload_after_write().await
    }

    /// Create one key result under the selected objective.
    ///
    /// No selection or a blank title makes this a no-op. A target that is not
    /// a number is rejected before anything is sent.
    pub async fn create_key_result(
        &mut self,
        objective_id: &str,
        title: &str,
        target: &str,
    ) -> Result<(), ViewError> {
        self.state.form.selected_objective = objective_id.to_string();
        self.state.form.key_result_title = title.to_string();
        self.state.form.key_result_target = target.to_string();

        if !self.state.form.can_create_key_result() {
            tracing::debug!("Key result form incomplete, nothing to create");
            self.publish();
            return Ok(());
        }

        let target_value = match parse_target(target) {
            Ok(value) => value,
            Err(err) => return Err(self.fail(err)),
        };

        self.ensure_active()?;
        self.begin();

        let key_result = NewKeyResult {
            objective_id: RecordId::new(objective_id),
            title: title.trim().to_string(),
            target_value,
        };
        let store = Arc::clone(&self.store);
        let result = match encode_row(KEY_RESULTS, &key_result) {
            Ok(row) => self.remote(store.insert(KEY_RESULTS, vec![row])).await?,
            Err(e) => Err(e),
        };
        let inserted = match result {
            Ok(rows) => rows,
            Err(source) => {
                return Err(self.fail(ViewError::Remote {
                    fallback: CREATE_KEY_RESULT_FAILED,
                    source,
                }))
            }
        };

        tracing::info!(
            objective_id = %key_result.objective_id,
            title = %key_result.title,
            "Created key result"
        );
        // Selection is kept
        self.state.form.key_result_title.clear();
        self.state.form.key_result_target.clear();

        if self.refresh == RefreshStrategy::Incremental {
            if let Some(created) = decode_inserted::<KeyResult>(KEY_RESULTS, inserted) {
                for kr in created {
                    self.state.key_results.push(kr);
                }
                self.finish();
                return Ok(());
            }
        }
        self.reload_after_write().await
    }

    /// Full reload after a successful write.
    ///
    /// A failed reload is already surfaced as a notice and does not undo the
    /// write, so only deactivation is reported to the caller.
    async fn reload_after_write(&mut self) -> Result<(), ViewError> {
        match self.load_all().await {
            Err(ViewError::Detached) => Err(ViewError::Detached),
            _ => Ok(()),
        }
    }
}

/// Insert payload as a store row
fn encode_row<T: Serialize>(table: &'static str, record: &T) -> RemoteResult<Value> {
    serde_json::to_value(record).map_err(|e| RemoteError::Decode {
        table: table.to_string(),
        error: e.to_string(),
    })
}

/// Rows echoed by an insert, when there are any and they decode
fn decode_inserted<T: DeserializeOwned>(table: &'static str, rows: Vec<Value>) -> Option<Vec<T>> {
    if rows.is_empty() {
        return None;
    }
    match decode_rows::<T>(table)(rows) {
        Ok(records) => Some(records),
        Err(e) => {
            tracing::warn!(table, error = %e, "Inserted rows unusable, reloading instead");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MemoryStore, StoreCall, StoreOp};
    use crate::view::{NoticeKind, Phase};
    use serde_json::json;

    async fn store_with_objectives(titles: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::okr());
        let rows = titles.iter().map(|t| json!({ "title": t })).collect();
        store.seed(OBJECTIVES, rows).await;
        store
    }

    async fn inserted_rows(store: &MemoryStore, table: &str) -> Vec<Value> {
        store
            .calls_to(StoreOp::Insert, table)
            .await
            .into_iter()
            .flat_map(|call| match call {
                StoreCall::Insert { rows, .. } => rows,
                StoreCall::Select(_) => Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("").unwrap(), None);
        assert_eq!(parse_target("   ").unwrap(), Some(0.0));
        assert_eq!(parse_target("20").unwrap(), Some(20.0));
        assert_eq!(parse_target(" 2.5 ").unwrap(), Some(2.5));
        assert_eq!(parse_target("-1e3").unwrap(), Some(-1000.0));
        assert_eq!(parse_target(".5").unwrap(), Some(0.5));
        assert!(parse_target("abc").is_err());
        assert!(parse_target("20%").is_err());
    }

    #[test]
    fn test_parse_target_prefixed_integers() {
        assert_eq!(parse_target("0x10").unwrap(), Some(16.0));
        assert_eq!(parse_target(" 0b101 ").unwrap(), Some(5.0));
        assert_eq!(parse_target("0O17").unwrap(), Some(15.0));
        assert!(parse_target("0x").is_err());
        assert!(parse_target("0x-1").is_err());
        assert!(parse_target("-0x10").is_err());
        assert!(parse_target("0x1g").is_err());
    }

    #[test]
    fn test_parse_target_rejects_non_finite() {
        assert!(parse_target("NaN").is_err());
        assert!(parse_target("inf").is_err());
        assert!(parse_target("Infinity").is_err());
        assert!(parse_target("-Infinity").is_err());
        assert!(parse_target("1e400").is_err());
    }

    #[tokio::test]
    async fn test_create_objective_trims_and_nulls_owner() {
        let store = Arc::new(MemoryStore::okr());
        let mut view = OkrView::new(store.clone());

        view.create_objective("  Growth  ", "").await.unwrap();

        assert_eq!(
            inserted_rows(&store, OBJECTIVES).await,
            vec![json!({"title": "Growth", "owner": null})]
        );
        assert_eq!(view.state().objectives.len(), 1);
        assert_eq!(view.state().objectives[0].title, "Growth");
        assert_eq!(view.state().form.objective_title, "");
        assert_eq!(view.state().form.objective_owner, "");
        assert_eq!(view.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_blank_objective_title_is_noop() {
        let store = Arc::new(MemoryStore::okr());
        let mut view = OkrView::new(store.clone());

        view.create_objective("   ", "hong.vu").await.unwrap();

        assert!(store.calls().await.is_empty());
        assert_eq!(view.state().form.objective_owner, "hong.vu");
    }

    #[tokio::test]
    async fn test_failed_objective_insert_keeps_inputs() {
        let store = Arc::new(MemoryStore::okr());
        store.fail_next(StoreOp::Insert, OBJECTIVES, "").await;
        let mut view = OkrView::new(store.clone());

        let err = view.create_objective("Growth", "hong.vu").await.unwrap_err();

        assert_eq!(err.user_message(), CREATE_OBJECTIVE_FAILED);
        assert_eq!(view.state().form.objective_title, "Growth");
        assert_eq!(view.state().form.objective_owner, "hong.vu");
        assert_eq!(view.state().phase, Phase::Idle);
        assert!(store.calls_to(StoreOp::Select, OBJECTIVES).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_target_never_writes() {
        let store = store_with_objectives(&["Grow users"]).await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        let err = view.create_key_result("1", "DAU", "abc").await.unwrap_err();

        assert!(matches!(err, ViewError::Validation(_)));
        assert!(store.calls_to(StoreOp::Insert, KEY_RESULTS).await.is_empty());
        let notice = view.state().notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Validation);
        assert_eq!(notice.message, TARGET_NOT_NUMBER);
        assert_eq!(view.state().form.key_result_target, "abc");
    }

    #[tokio::test]
    async fn test_empty_target_inserts_null() {
        let store = store_with_objectives(&["Grow users"]).await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        view.create_key_result("1", " DAU +20% ", "").await.unwrap();

        assert_eq!(
            inserted_rows(&store, KEY_RESULTS).await,
            vec![json!({"objective_id": "1", "title": "DAU +20%", "target_value": null})]
        );
        let group = view.state().key_results.for_objective(&RecordId::new("1"));
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].target_value, None);
    }

    #[tokio::test]
    async fn test_whitespace_target_inserts_zero() {
        let store = store_with_objectives(&["Grow users"]).await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        view.create_key_result("1", "KR", "   ").await.unwrap();
        view.create_key_result("1", "Hex KR", "0x10").await.unwrap();

        let rows = inserted_rows(&store, KEY_RESULTS).await;
        assert_eq!(rows[0]["target_value"], json!(0.0));
        assert_eq!(rows[1]["target_value"], json!(16.0));
    }

    #[tokio::test]
    async fn test_selection_survives_key_result_creation() {
        let store = store_with_objectives(&["First", "Second"]).await;
        let mut view = OkrView::new(store.clone());
        view.load_all().await.unwrap();

        view.create_key_result("2", "Ship v2", "20").await.unwrap();

        let form = &view.state().form;
        assert_eq!(form.selected_objective, "2");
        assert_eq!(form.key_result_title, "");
        assert_eq!(form.key_result_target, "");
        assert_eq!(
            view.state().key_results.for_objective(&RecordId::new("2"))[0].target_value,
            Some(20.0)
        );
    }

    #[tokio::test]
    async fn test_key_result_without_selection_is_noop() {
        let store = store_with_objectives(&["First"]).await;
        let mut view = OkrView::new(store.clone());

        view.create_key_result("", "Ship v2", "abc").await.unwrap();

        assert!(store.calls().await.is_empty());
        assert!(view.state().notice.is_none());
    }

    #[tokio::test]
    async fn test_rejected_key_result_keeps_all_inputs() {
        let store = store_with_objectives(&["First"]).await;
        let mut view = OkrView::new(store.clone());

        let err = view.create_key_result("42", "Orphan", "5").await.unwrap_err();

        assert!(err.user_message().contains("foreign key"));
        let form = &view.state().form;
        assert_eq!(form.selected_objective, "42");
        assert_eq!(form.key_result_title, "Orphan");
        assert_eq!(form.key_result_target, "5");
    }

    #[tokio::test]
    async fn test_failed_reload_still_counts_as_created() {
        let store = Arc::new(MemoryStore::okr());
        let mut view = OkrView::new(store.clone());
        store.fail_next(StoreOp::Select, OBJECTIVES, "connection reset").await;

        view.create_objective("Growth", "").await.unwrap();

        assert_eq!(store.rows(OBJECTIVES).await.len(), 1);
        assert_eq!(view.state().form.objective_title, "");
        assert_eq!(view.state().notice.as_ref().unwrap().message, "connection reset");
    }

    #[tokio::test]
    async fn test_incremental_refresh_patches_without_reading() {
        let store = store_with_objectives(&["First"]).await;
        let mut view = OkrView::new(store.clone()).with_refresh(RefreshStrategy::Incremental);
        view.load_all().await.unwrap();

        view.create_objective("Second", "").await.unwrap();
        view.create_key_result("1", "KR", "3").await.unwrap();

        assert_eq!(store.calls_to(StoreOp::Select, OBJECTIVES).await.len(), 1);
        let titles: Vec<_> = view.state().objectives.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(view.state().key_results.for_objective(&RecordId::new("1")).len(), 1);

        let mut reloaded = OkrView::new(store.clone());
        reloaded.load_all().await.unwrap();
        assert_eq!(reloaded.state().objectives, view.state().objectives);
        assert_eq!(reloaded.state().key_results, view.state().key_results);
    }
}
