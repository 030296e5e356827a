//! Refresh Strategy
//!
//! What the view does after a successful write.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the view catches up after a create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStrategy {
    /// Re-run the full two-query load
    #[default]
    FullReload,
    /// Patch the view with the rows the store echoed back; reload in full
    /// when nothing usable was echoed
    Incremental,
}

impl FromStr for RefreshStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "full_reload" | "full" => Ok(RefreshStrategy::FullReload),
            "incremental" => Ok(RefreshStrategy::Incremental),
            other => Err(format!("unknown refresh strategy '{}'", other)),
        }
    }
}

impl fmt::Display for RefreshStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshStrategy::FullReload => write!(f, "full_reload"),
            RefreshStrategy::Incremental => write!(f, "incremental"),
        }
    }
}
