//! View Errors

use thiserror::Error;

use crate::remote::RemoteError;

/// Fallback shown when loading fails without a message from the store
pub const LOAD_FAILED: &str = "Lỗi tải dữ liệu";
/// Fallback shown when creating an objective fails without a message
pub const CREATE_OBJECTIVE_FAILED: &str = "Không thể tạo Objective";
/// Fallback shown when creating a key result fails without a message
pub const CREATE_KEY_RESULT_FAILED: &str = "Không thể tạo Key Result";
/// Shown when the key result target is not a number
pub const TARGET_NOT_NUMBER: &str = "Target phải là số";

/// Errors returned by view operations
#[derive(Error, Debug)]
pub enum ViewError {
    /// Input rejected before any remote call
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote call failed
    #[error("{fallback}: {source}")]
    Remote {
        fallback: &'static str,
        #[source]
        source: RemoteError,
    },

    /// The view was deactivated while the operation was pending
    #[error("View is no longer active")]
    Detached,
}

impl ViewError {
    /// Text for the user notification
    pub fn user_message(&self) -> String {
        match self {
            ViewError::Validation(message) => message.clone(),
            ViewError::Remote { fallback, source } => source
                .service_message()
                .unwrap_or_else(|| fallback.to_string()),
            ViewError::Detached => self.to_string(),
        }
    }
}
