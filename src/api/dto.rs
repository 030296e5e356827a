//! Data Transfer Objects
//!
//! Form and JSON bodies accepted by the handlers, and JSON responses.

use serde::{Deserialize, Serialize};

// ============================================
// FORM / CREATE DTOs
// ============================================

/// Objective creation input (HTML form or JSON)
#[derive(Debug, Default, Deserialize)]
pub struct ObjectiveForm {
    #[serde(default)]
    pub title: String,
    /// Optional owner label; blank means none
    #[serde(default)]
    pub owner: String,
}

/// Key result creation input (HTML form or JSON)
#[derive(Debug, Default, Deserialize)]
pub struct KeyResultForm {
    /// Id of the objective, as rendered in the selector
    #[serde(default)]
    pub objective_id: String,
    #[serde(default)]
    pub title: String,
    /// Optional numeric target as typed
    #[serde(default)]
    pub target: String,
}

/// Query string of the page
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Present after a submission was turned away because the view was busy
    #[serde(default)]
    pub busy: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: String,
    /// "configured" or "unconfigured"
    pub store: String,
    /// Backend tag of the data store
    pub backend: String,
    pub uptime_seconds: u64,
    pub version: String,
}
