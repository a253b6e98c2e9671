//! The reqwest-backed backend client.

use chairside_core::error::{ApiError, ApiResult, FieldError};
use chairside_core::{
    NewToothCondition, Odontogram, OdontogramApi, PeriodontalAssessment, ToothCondition,
    ToothConditionPatch, TreatmentPlan, TreatmentPlanPatch,
};
use chairside_types::ToothNumber;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::ClientConfig;

/// Clinic-scope header attached to every request.
const CLINIC_HEADER: &str = "X-Clinic-Id";

/// Typed JSON-over-REST client for the practice-management backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url(), path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        debug!(%method, path, "backend request");
        self.http
            .request(method, self.url(path))
            .bearer_auth(self.config.bearer_token())
            .header(CLINIC_HEADER, self.config.clinic_id().to_string())
    }

    /// Sends the request, mapping transport failures to
    /// [`ApiError::Network`] and non-2xx statuses through
    /// [`error_for_status`]. `what` names the resource for "not found"
    /// messages.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> ApiResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(error_for_status(status.as_u16(), body, what))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &str,
    ) -> ApiResult<T> {
        let response = self.send(self.request(reqwest::Method::GET, path), what).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Unexpected {
                status: None,
                message: format!("could not read the server's response: {e}"),
            })
    }

    pub(crate) async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
        what: &str,
    ) -> ApiResult<T> {
        let builder = self.request(reqwest::Method::GET, path).query(query);
        let response = self.send(builder, what).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Unexpected {
                status: None,
                message: format!("could not read the server's response: {e}"),
            })
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        what: &str,
    ) -> ApiResult<T> {
        let response = self
            .send(self.request(method, path).json(body), what)
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Unexpected {
                status: None,
                message: format!("could not read the server's response: {e}"),
            })
    }

    /// A mutation whose response body the caller never consumes: the editor
    /// reconciles via a full refetch, so whatever the backend echoes back is
    /// deliberately dropped here.
    pub(crate) async fn send_json_discard<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
        what: &str,
    ) -> ApiResult<()> {
        self.send(self.request(method, path).json(body), what)
            .await
            .map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str, what: &str) -> ApiResult<()> {
        self.send(self.request(reqwest::Method::DELETE, path), what)
            .await
            .map(|_| ())
    }
}

/// Error payload shape the backend uses for non-2xx responses. Both fields
/// are optional in practice; an unreadable body falls back to the defaults.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Maps an HTTP status plus error body to the user-facing taxonomy.
///
/// 422 is always a validation failure. 400 counts as one only when the body
/// carries field-level detail; otherwise it lands in `Unexpected` with the
/// status attached.
fn error_for_status(status: u16, body: ErrorBody, what: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        403 => ApiError::Forbidden,
        404 => ApiError::NotFound(what.to_owned()),
        422 => ApiError::Validation {
            message: body
                .message
                .unwrap_or_else(|| "the submitted data is invalid".to_owned()),
            fields: body.errors,
        },
        400 if !body.errors.is_empty() => ApiError::Validation {
            message: body
                .message
                .unwrap_or_else(|| "the submitted data is invalid".to_owned()),
            fields: body.errors,
        },
        other => ApiError::Unexpected {
            status: Some(other),
            message: body
                .message
                .unwrap_or_else(|| "the server returned an error".to_owned()),
        },
    }
}

impl OdontogramApi for ApiClient {
    async fn fetch_odontogram(&self, id: Uuid) -> ApiResult<Odontogram> {
        self.get_json(&format!("odontograms/{id}"), "the dental chart")
            .await
    }

    async fn create_tooth_condition(
        &self,
        odontogram_id: Uuid,
        condition: &NewToothCondition,
    ) -> ApiResult<ToothCondition> {
        self.send_json(
            reqwest::Method::POST,
            &format!("odontograms/{odontogram_id}/teeth"),
            condition,
            "the dental chart",
        )
        .await
    }

    async fn update_tooth_condition(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        patch: &ToothConditionPatch,
    ) -> ApiResult<()> {
        self.send_json_discard(
            reqwest::Method::PATCH,
            &format!("odontograms/{odontogram_id}/teeth/{tooth}"),
            patch,
            "the tooth record",
        )
        .await
    }

    async fn create_treatment_plan(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        plan: &TreatmentPlan,
    ) -> ApiResult<TreatmentPlan> {
        self.send_json(
            reqwest::Method::POST,
            &format!("odontograms/{odontogram_id}/teeth/{tooth}/treatment-plan"),
            plan,
            "the tooth record",
        )
        .await
    }

    async fn update_treatment_plan(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        patch: &TreatmentPlanPatch,
    ) -> ApiResult<()> {
        self.send_json_discard(
            reqwest::Method::PATCH,
            &format!("odontograms/{odontogram_id}/teeth/{tooth}/treatment-plan"),
            patch,
            "the treatment plan",
        )
        .await
    }

    async fn delete_treatment_plan(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
    ) -> ApiResult<()> {
        self.delete(
            &format!("odontograms/{odontogram_id}/teeth/{tooth}/treatment-plan"),
            "the treatment plan",
        )
        .await
    }

    async fn update_periodontal(
        &self,
        odontogram_id: Uuid,
        assessment: &PeriodontalAssessment,
    ) -> ApiResult<()> {
        self.send_json_discard(
            reqwest::Method::PUT,
            &format!("odontograms/{odontogram_id}/periodontal"),
            assessment,
            "the dental chart",
        )
        .await
    }

    async fn update_general_notes(&self, odontogram_id: Uuid, notes: &str) -> ApiResult<()> {
        self.send_json_discard(
            reqwest::Method::PUT,
            &format!("odontograms/{odontogram_id}/notes"),
            &json!({ "general_notes": notes }),
            "the dental chart",
        )
        .await
    }

    async fn set_active(&self, odontogram_id: Uuid, active: bool) -> ApiResult<()> {
        // Dedicated status endpoint, like the other state-machine
        // transitions the backend exposes.
        self.send_json_discard(
            reqwest::Method::PATCH,
            &format!("odontograms/{odontogram_id}/status"),
            &json!({ "is_active": active }),
            "the dental chart",
        )
        .await
    }
}
