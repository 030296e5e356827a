//! View State
//!
//! The in-memory view model of the OKR page: loaded records, form inputs,
//! the loading phase and a pending notification.

use serde::Serialize;

use crate::model::{KeyResultGroups, Objective};

/// Whether a load or write is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
}

/// Current values of the two creation forms
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    pub objective_title: String,
    pub objective_owner: String,
    /// Id of the objective new key results attach to; empty when none chosen
    pub selected_objective: String,
    pub key_result_title: String,
    pub key_result_target: String,
}

impl FormState {
    pub fn can_create_key_result(&self) -> bool {
        !self.selected_objective.is_empty() && !self.key_result_title.trim().is_empty()
    }
}

/// What a notification reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A remote call failed
    Error,
    /// Input was rejected before any remote call
    Validation,
}

/// A blocking notification for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Everything the page renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub phase: Phase,
    /// Set once the initial load has been started
    pub mounted: bool,
    /// Newest first
    pub objectives: Vec<Objective>,
    pub key_results: KeyResultGroups,
    pub form: FormState,
    pub notice: Option<Notice>,
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}
