//! # chairside client
//!
//! Typed HTTP client for the practice-management backend: the
//! [`chairside_core::OdontogramApi`] implementation plus the generic
//! paginated resource client used by the other dashboard entities.
//!
//! The client is a pure request/response boundary. No retries, no caching,
//! no batching; every failure is mapped into
//! [`chairside_core::ApiError`] with a message fit for direct display.
//! Tenant scope is explicit: the clinic id travels in [`ClientConfig`] and is
//! attached to every request, never read from ambient state.

mod http;
mod pagination;
mod resources;

pub use http::ApiClient;
pub use pagination::{ListQuery, Paginated, SortOrder};
pub use resources::{LabVendor, Patient, PayrollEntry, PayrollStatus, ResourceClient, Service, Subscription, SubscriptionStatus};

use uuid::Uuid;

/// Errors constructing a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("base URL cannot be empty")]
    EmptyBaseUrl,
    #[error("bearer token cannot be empty")]
    EmptyToken,
}

/// Connection settings resolved once at startup and passed in.
///
/// Nothing here is read from the environment during request handling; the
/// caller decides where the values come from.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    bearer_token: String,
    clinic_id: Uuid,
}

impl ClientConfig {
    /// Creates a new `ClientConfig`.
    ///
    /// The base URL is trimmed of trailing slashes so path joining stays
    /// uniform. Empty URL or token is rejected up front rather than at the
    /// first request.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        clinic_id: Uuid,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self {
            base_url,
            bearer_token,
            clinic_id,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn clinic_id(&self) -> Uuid {
        self.clinic_id
    }

    pub(crate) fn bearer_token(&self) -> &str {
        &self.bearer_token
    }
}
