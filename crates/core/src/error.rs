use chairside_types::ChartTypeError;

/// A field-level validation message returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Errors surfaced by the remote entity client.
///
/// Grouped by user-visible consequence rather than transport code. Every
/// variant's `Display` output is suitable for showing to the user directly.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, TLS).
    /// Safely retryable by re-invoking the same action.
    #[error("could not reach the server: {0}")]
    Network(String),
    /// The backend rejected the payload, optionally with field-level detail.
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    /// Missing or expired credentials.
    #[error("your session has expired, please sign in again")]
    Unauthorized,
    /// Authenticated but outside the caller's clinic scope.
    #[error("you do not have access to this record")]
    Forbidden,
    /// The record does not exist (or is outside the tenant's view).
    #[error("{0} was not found")]
    NotFound(String),
    /// Anything else, with the status code when one was received.
    #[error("unexpected server error: {message}")]
    Unexpected {
        status: Option<u16>,
        message: String,
    },
}

impl ApiError {
    /// True when re-invoking the same user action is safe and may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Unexpected { .. })
    }
}

/// Errors surfaced by the chart editor.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// A save is already in flight for this section.
    #[error("a save is already in progress")]
    SaveInProgress,
    /// Save was requested for a section with no active edit session.
    #[error("nothing is being edited")]
    NoActiveEdit,
    /// The mutation landed but the follow-up refetch failed, so the
    /// displayed aggregate may be out of date until the next reload.
    #[error("saved, but the chart could not be reloaded and may be out of date: {0}")]
    StaleAfterSave(#[source] ApiError),
    #[error(transparent)]
    InvalidValue(#[from] ChartTypeError),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
pub type EditorResult<T> = std::result::Result<T, EditorError>;
