//! OKR Data Model
//!
//! Records owned by the remote store. The client only ever holds transient,
//! re-fetchable copies of them.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Remote collection holding objectives
pub const OBJECTIVES: &str = "objectives";

/// Remote collection holding key results
pub const KEY_RESULTS: &str = "key_results";

/// Opaque identifier assigned by the remote store.
///
/// The store may hand ids out as JSON numbers or strings; both are kept as
/// text and sent back as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Signed(n) => RecordId(n.to_string()),
            Raw::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// A goal record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// Creation timestamp as reported by the store
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A measurable sub-item of exactly one objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyResult {
    pub id: RecordId,
    pub objective_id: RecordId,
    pub title: String,
    #[serde(default)]
    pub target_value: Option<f64>,
}

/// Insert payload for `objectives`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewObjective {
    pub title: String,
    pub owner: Option<String>,
}

impl NewObjective {
    /// Normalize raw form input.
    ///
    /// Returns `None` when the trimmed title is empty. An owner that trims to
    /// nothing becomes `None` rather than an empty string.
    pub fn from_input(title: &str, owner: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let owner = owner.trim();
        Some(Self {
            title: title.to_string(),
            owner: (!owner.is_empty()).then(|| owner.to_string()),
        })
    }
}

/// Insert payload for `key_results`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewKeyResult {
    pub objective_id: RecordId,
    pub title: String,
    pub target_value: Option<f64>,
}

/// Key results grouped by the objective they belong to.
///
/// Derived from the last successful load and rebuilt wholesale each time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyResultGroups(HashMap<RecordId, Vec<KeyResult>>);

impl KeyResultGroups {
    /// Group key results by `objective_id`, keeping fetch order within a group
    pub fn from_key_results(key_results: impl IntoIterator<Item = KeyResult>) -> Self {
        let mut groups: HashMap<RecordId, Vec<KeyResult>> = HashMap::new();
        for kr in key_results {
            groups.entry(kr.objective_id.clone()).or_default().push(kr);
        }
        Self(groups)
    }

    /// Key results of one objective; empty when it has none
    pub fn for_objective(&self, id: &RecordId) -> &[KeyResult] {
        self.0.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a single key result to its group
    pub fn push(&mut self, kr: KeyResult) {
        self.0.entry(kr.objective_id.clone()).or_default().push(kr);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of key results across all groups
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kr(id: &str, objective: &str) -> KeyResult {
        KeyResult {
            id: RecordId::new(id),
            objective_id: RecordId::new(objective),
            title: format!("kr {}", id),
            target_value: None,
        }
    }

    #[test]
    fn test_record_id_accepts_numbers_and_strings() {
        let objective: Objective =
            serde_json::from_str(r#"{"id": 42, "title": "Grow users", "owner": null}"#).unwrap();
        assert_eq!(objective.id.as_str(), "42");
        assert_eq!(objective.owner, None);
        assert_eq!(objective.created_at, None);

        let kr: KeyResult = serde_json::from_str(
            r#"{"id": "a1", "objective_id": "9b2c", "title": "DAU +20%", "target_value": 20}"#,
        )
        .unwrap();
        assert_eq!(kr.objective_id.as_str(), "9b2c");
        assert_eq!(kr.target_value, Some(20.0));
    }

    #[test]
    fn test_record_id_serializes_as_text() {
        let payload = NewKeyResult {
            objective_id: RecordId::new("7"),
            title: "x".to_string(),
            target_value: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["objective_id"], "7");
        assert!(json["target_value"].is_null());
    }

    #[test]
    fn test_new_objective_normalizes_input() {
        let objective = NewObjective::from_input("  Growth  ", "").unwrap();
        assert_eq!(objective.title, "Growth");
        assert_eq!(objective.owner, None);

        let objective = NewObjective::from_input("Q4", "  hong.vu ").unwrap();
        assert_eq!(objective.owner.as_deref(), Some("hong.vu"));

        assert!(NewObjective::from_input("   ", "someone").is_none());
    }

    #[test]
    fn test_groups_place_each_key_result_under_its_objective() {
        let groups = KeyResultGroups::from_key_results(vec![kr("1", "a"), kr("2", "b"), kr("3", "a")]);

        let a: Vec<_> = groups.for_objective(&"a".into()).iter().map(|k| k.id.as_str()).collect();
        assert_eq!(a, vec!["1", "3"]);
        assert_eq!(groups.for_objective(&"b".into()).len(), 1);
        assert!(groups.for_objective(&"missing".into()).is_empty());
        assert_eq!(groups.len(), 3);
    }
}
