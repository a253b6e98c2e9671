use chairside_types::{Grade, NumberingSystem, ProbingDepthMm, ToothNumber};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{PeriodontalAssessment, TreatmentPlan};

/// Whether the chart records a permanent, primary, or mixed dentition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientType {
    Adult,
    Child,
    Mixed,
}

/// The dental chart aggregate root as served by the backend.
///
/// Fetched whole on view-open and replaced whole after every mutation.
/// `version` is incremented server-side on each mutation;
/// `treatment_progress` and `treatment_summary` are server-computed rollups.
/// None of the three is ever derived client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Odontogram {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinic_id: Uuid,
    pub doctor_id: Uuid,
    pub numbering_system: NumberingSystem,
    pub patient_type: PatientType,
    pub examination_date: NaiveDate,
    pub is_active: bool,
    pub version: u64,
    #[serde(default)]
    pub teeth_conditions: Vec<ToothCondition>,
    pub periodontal_assessment: Option<PeriodontalAssessment>,
    pub general_notes: Option<String>,
    /// Completed share of planned treatments, 0–100.
    pub treatment_progress: u8,
    pub treatment_summary: TreatmentSummary,
}

impl Odontogram {
    /// Looks up the condition recorded for `tooth`, if any.
    ///
    /// At most one condition exists per tooth number per odontogram.
    pub fn tooth_condition(&self, tooth: ToothNumber) -> Option<&ToothCondition> {
        self.teeth_conditions
            .iter()
            .find(|c| c.tooth_number == tooth)
    }

    /// The recorded treatment plan for `tooth`, if any.
    pub fn treatment_plan(&self, tooth: ToothNumber) -> Option<&TreatmentPlan> {
        self.tooth_condition(tooth)
            .and_then(|c| c.treatment_plan.as_ref())
    }
}

/// Server-computed rollup of treatment counts and cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentSummary {
    pub total_treatments: u32,
    pub pending_treatments: u32,
    pub in_progress_treatments: u32,
    pub completed_treatments: u32,
    pub estimated_total_cost: f64,
}

/// Condition record for a single tooth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToothCondition {
    pub tooth_number: ToothNumber,
    pub overall_condition: OverallCondition,
    pub mobility: Grade,
    pub periodontal_pocket_depth: Option<PocketDepths>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceCondition>,
    pub treatment_plan: Option<TreatmentPlan>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub notes: Option<String>,
}

impl ToothCondition {
    /// A fresh healthy record for `tooth`, used when the first edit touches
    /// a tooth the chart has no entry for yet.
    pub fn healthy(tooth: ToothNumber) -> Self {
        Self {
            tooth_number: tooth,
            overall_condition: OverallCondition::Healthy,
            mobility: Grade::ZERO,
            periodontal_pocket_depth: None,
            surfaces: Vec::new(),
            treatment_plan: None,
            attachments: Vec::new(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallCondition {
    Healthy,
    Decayed,
    Filled,
    Crowned,
    Missing,
    Impacted,
    RootCanalTreated,
    NeedsExtraction,
}

impl std::fmt::Display for OverallCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OverallCondition::Healthy => "healthy",
            OverallCondition::Decayed => "decayed",
            OverallCondition::Filled => "filled",
            OverallCondition::Crowned => "crowned",
            OverallCondition::Missing => "missing",
            OverallCondition::Impacted => "impacted",
            OverallCondition::RootCanalTreated => "root_canal_treated",
            OverallCondition::NeedsExtraction => "needs_extraction",
        };
        write!(f, "{label}")
    }
}

/// Four-direction periodontal pocket measurements for one tooth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketDepths {
    pub mesial: ProbingDepthMm,
    pub distal: ProbingDepthMm,
    pub buccal: ProbingDepthMm,
    pub lingual: ProbingDepthMm,
}

/// A diagnosed condition on one surface of a tooth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceCondition {
    pub surface: ToothSurface,
    pub condition: OverallCondition,
    pub severity: Severity,
    pub date_diagnosed: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToothSurface {
    Mesial,
    Distal,
    Buccal,
    Lingual,
    Occlusal,
    Incisal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

/// A file attached to a tooth condition (radiograph, photo).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub file_name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chairside_types::NumberingSystem;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n, NumberingSystem::Universal).expect("valid universal tooth")
    }

    #[test]
    fn tooth_condition_lookup_finds_the_matching_tooth_only() {
        let mut chart = sample_odontogram();
        chart.teeth_conditions = vec![ToothCondition::healthy(tooth(9)), {
            let mut c = ToothCondition::healthy(tooth(14));
            c.overall_condition = OverallCondition::Decayed;
            c
        }];

        assert_eq!(
            chart
                .tooth_condition(tooth(14))
                .expect("tooth 14 should be recorded")
                .overall_condition,
            OverallCondition::Decayed
        );
        assert!(chart.tooth_condition(tooth(3)).is_none());
    }

    #[test]
    fn odontogram_round_trips_through_json() {
        let chart = sample_odontogram();
        let json = serde_json::to_string(&chart).expect("serialize should succeed");
        let back: Odontogram = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back.version, chart.version);
        assert_eq!(back.treatment_summary, chart.treatment_summary);
    }

    fn sample_odontogram() -> Odontogram {
        Odontogram {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            numbering_system: NumberingSystem::Universal,
            patient_type: PatientType::Adult,
            examination_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
            is_active: true,
            version: 7,
            teeth_conditions: Vec::new(),
            periodontal_assessment: None,
            general_notes: None,
            treatment_progress: 0,
            treatment_summary: TreatmentSummary::default(),
        }
    }
}
