//! Generic client for the dashboard's CRUD resources.
//!
//! The non-chart screens (patients, services, payroll, subscriptions, lab
//! vendors) all consume the same endpoint family: paginated list, fetch by
//! id, create, PATCH, a dedicated status-transition endpoint, and delete.
//! [`ResourceClient`] captures that family once; the typed accessors on
//! [`ApiClient`] pin each resource path to its entity type.

use std::marker::PhantomData;

use chairside_core::error::ApiResult;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::http::ApiClient;
use crate::pagination::{ListQuery, Paginated};

/// Typed handle on one backend resource collection.
pub struct ResourceClient<'a, T> {
    api: &'a ApiClient,
    path: &'static str,
    /// Human-readable name used in "not found" messages.
    noun: &'static str,
    _entity: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> ResourceClient<'a, T> {
    fn new(api: &'a ApiClient, path: &'static str, noun: &'static str) -> Self {
        Self {
            api,
            path,
            noun,
            _entity: PhantomData,
        }
    }

    /// Fetches one page of the collection.
    pub async fn list(&self, query: &ListQuery) -> ApiResult<Paginated<T>> {
        self.api
            .get_json_with_query(self.path, &query.to_query(), self.noun)
            .await
    }

    pub async fn get(&self, id: Uuid) -> ApiResult<T> {
        self.api
            .get_json(&format!("{}/{id}", self.path), self.noun)
            .await
    }

    pub async fn create<B: Serialize>(&self, payload: &B) -> ApiResult<T> {
        self.api
            .send_json(reqwest::Method::POST, self.path, payload, self.noun)
            .await
    }

    /// Partial update; unset patch fields are left untouched server-side.
    pub async fn update<B: Serialize>(&self, id: Uuid, patch: &B) -> ApiResult<T> {
        self.api
            .send_json(
                reqwest::Method::PATCH,
                &format!("{}/{id}", self.path),
                patch,
                self.noun,
            )
            .await
    }

    /// State-machine transition via the resource's dedicated status endpoint
    /// (payroll approval, lead stage, subscription cancellation).
    pub async fn update_status(&self, id: Uuid, status: &str) -> ApiResult<()> {
        self.api
            .send_json_discard(
                reqwest::Method::PATCH,
                &format!("{}/{id}/status", self.path),
                &json!({ "status": status }),
                self.noun,
            )
            .await
    }

    pub async fn delete(&self, id: Uuid) -> ApiResult<()> {
        self.api
            .delete(&format!("{}/{id}", self.path), self.noun)
            .await
    }
}

impl ApiClient {
    pub fn patients(&self) -> ResourceClient<'_, Patient> {
        ResourceClient::new(self, "patients", "the patient")
    }

    pub fn services(&self) -> ResourceClient<'_, Service> {
        ResourceClient::new(self, "services", "the service")
    }

    pub fn payroll(&self) -> ResourceClient<'_, PayrollEntry> {
        ResourceClient::new(self, "payroll", "the payroll entry")
    }

    pub fn subscriptions(&self) -> ResourceClient<'_, Subscription> {
        ResourceClient::new(self, "subscriptions", "the subscription")
    }

    pub fn lab_vendors(&self) -> ResourceClient<'_, LabVendor> {
        ResourceClient::new(self, "lab-vendors", "the lab vendor")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub duration_minutes: Option<u32>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_amount: f64,
    pub net_amount: f64,
    pub status: PayrollStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStatus {
    Draft,
    Pending,
    Approved,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub current_period_end: DateTime<Utc>,
    pub cancel_at_period_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabVendor {
    pub id: Uuid,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
}
