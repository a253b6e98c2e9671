use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A planned or ongoing treatment for one tooth (at most one per tooth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentPlan {
    pub planned_treatment: String,
    pub priority: TreatmentPriority,
    pub status: TreatmentStatus,
    pub estimated_cost: f64,
    pub estimated_duration: Option<String>,
    pub planned_date: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Default for TreatmentPlan {
    /// Defaults for a brand-new plan: medium priority, planned, zero cost.
    fn default() -> Self {
        Self {
            planned_treatment: String::new(),
            priority: TreatmentPriority::Medium,
            status: TreatmentStatus::Planned,
            estimated_cost: 0.0,
            estimated_duration: None,
            planned_date: None,
            completed_date: None,
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl std::fmt::Display for TreatmentPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreatmentPriority::Low => write!(f, "low"),
            TreatmentPriority::Medium => write!(f, "medium"),
            TreatmentPriority::High => write!(f, "high"),
            TreatmentPriority::Urgent => write!(f, "urgent"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentStatus {
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TreatmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreatmentStatus::Planned => write!(f, "planned"),
            TreatmentStatus::InProgress => write!(f, "in_progress"),
            TreatmentStatus::Completed => write!(f, "completed"),
            TreatmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_plan_defaults_match_the_backend_contract() {
        let plan = TreatmentPlan::default();
        assert_eq!(plan.priority, TreatmentPriority::Medium);
        assert_eq!(plan.status, TreatmentStatus::Planned);
        assert_eq!(plan.estimated_cost, 0.0);
        assert!(plan.completed_date.is_none());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&TreatmentStatus::InProgress)
            .expect("serialize should succeed");
        assert_eq!(json, r#""in_progress""#);
    }
}
