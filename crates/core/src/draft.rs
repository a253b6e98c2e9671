//! Draft state for in-progress edits.
//!
//! While a chart section is being edited the server copy stays untouched and
//! the pending changes accumulate in a [`Draft`]: the server-truth `base`
//! plus a patch of `overrides`. [`Draft::resolve`] is the single place the
//! two are combined, so "what is actually being edited" is never ambiguous.
//! The patch is also exactly what gets PATCHed to the backend on save, which
//! keeps updates minimal and last-write-wins idempotent.

use chairside_types::Grade;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{
    OverallCondition, PeriodontalAssessment, PocketDepths, ToothCondition, TreatmentPlan,
    TreatmentPriority, TreatmentStatus,
};

/// An entity that can be partially overridden by a patch of its own fields.
pub trait Patchable: Clone {
    /// The partial-fields companion type; `Default` must mean "no changes".
    type Patch: Default + Clone + std::fmt::Debug;

    /// Returns a copy of `self` with every populated patch field applied.
    fn merged(&self, patch: &Self::Patch) -> Self;
}

/// A pending edit: server-truth base plus the fields changed so far.
#[derive(Debug, Clone)]
pub struct Draft<T: Patchable> {
    base: T,
    overrides: T::Patch,
}

impl<T: Patchable> Draft<T> {
    /// Starts a draft over `base` with no overrides yet.
    pub fn new(base: T) -> Self {
        Self {
            base,
            overrides: T::Patch::default(),
        }
    }

    /// The server-truth snapshot this draft was seeded from.
    pub fn base(&self) -> &T {
        &self.base
    }

    /// The accumulated changes, suitable for a partial update request.
    pub fn overrides(&self) -> &T::Patch {
        &self.overrides
    }

    /// The entity as the user currently sees it: base with overrides applied.
    pub fn resolve(&self) -> T {
        self.base.merged(&self.overrides)
    }
}

macro_rules! merge_field {
    ($patch:expr, $base:expr) => {
        $patch.clone().unwrap_or_else(|| $base.clone())
    };
}

/// Partial update for a [`TreatmentPlan`]. Unset fields are left untouched.
///
/// `None` here means "unchanged", never "clear the field": a patch cannot
/// reset an optional base field like `planned_date` or `notes` back to
/// nothing. The backend's PATCH contract reads absent keys the same way, so
/// "remove this value" is not expressible through a draft at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreatmentPlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_treatment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<TreatmentPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TreatmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planned_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Patchable for TreatmentPlan {
    type Patch = TreatmentPlanPatch;

    fn merged(&self, patch: &TreatmentPlanPatch) -> Self {
        TreatmentPlan {
            planned_treatment: merge_field!(patch.planned_treatment, self.planned_treatment),
            priority: patch.priority.unwrap_or(self.priority),
            status: patch.status.unwrap_or(self.status),
            estimated_cost: patch.estimated_cost.unwrap_or(self.estimated_cost),
            estimated_duration: patch
                .estimated_duration
                .clone()
                .or_else(|| self.estimated_duration.clone()),
            planned_date: patch.planned_date.or(self.planned_date),
            completed_date: patch.completed_date.or(self.completed_date),
            notes: patch.notes.clone().or_else(|| self.notes.clone()),
        }
    }
}

impl Draft<TreatmentPlan> {
    /// Records a status change.
    ///
    /// Moving to [`TreatmentStatus::Completed`] stamps `completed_date` with
    /// `now` in the same call when the resolved plan has none yet; an already
    /// present completion date is left untouched. The stamp and the status
    /// write land together so no intermediate state is ever observable.
    pub fn set_status(&mut self, status: TreatmentStatus, now: DateTime<Utc>) {
        if status == TreatmentStatus::Completed && self.resolve().completed_date.is_none() {
            self.overrides.completed_date = Some(now);
        }
        self.overrides.status = Some(status);
    }

    pub fn set_planned_treatment(&mut self, text: impl Into<String>) {
        self.overrides.planned_treatment = Some(text.into());
    }

    pub fn set_priority(&mut self, priority: TreatmentPriority) {
        self.overrides.priority = Some(priority);
    }

    pub fn set_estimated_cost(&mut self, cost: f64) {
        self.overrides.estimated_cost = Some(cost);
    }

    pub fn set_estimated_duration(&mut self, duration: impl Into<String>) {
        self.overrides.estimated_duration = Some(duration.into());
    }

    pub fn set_planned_date(&mut self, date: NaiveDate) {
        self.overrides.planned_date = Some(date);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.overrides.notes = Some(notes.into());
    }
}

/// Partial update for a [`PeriodontalAssessment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodontalPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bleeding_on_probing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculus_present: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plaque_index: Option<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gingival_index: Option<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_notes: Option<String>,
}

impl Patchable for PeriodontalAssessment {
    type Patch = PeriodontalPatch;

    fn merged(&self, patch: &PeriodontalPatch) -> Self {
        PeriodontalAssessment {
            bleeding_on_probing: patch
                .bleeding_on_probing
                .unwrap_or(self.bleeding_on_probing),
            calculus_present: patch.calculus_present.unwrap_or(self.calculus_present),
            plaque_index: patch.plaque_index.unwrap_or(self.plaque_index),
            gingival_index: patch.gingival_index.unwrap_or(self.gingival_index),
            general_notes: merge_field!(patch.general_notes, self.general_notes),
        }
    }
}

impl Draft<PeriodontalAssessment> {
    pub fn set_bleeding_on_probing(&mut self, value: bool) {
        self.overrides.bleeding_on_probing = Some(value);
    }

    pub fn set_calculus_present(&mut self, value: bool) {
        self.overrides.calculus_present = Some(value);
    }

    pub fn set_plaque_index(&mut self, grade: Grade) {
        self.overrides.plaque_index = Some(grade);
    }

    pub fn set_gingival_index(&mut self, grade: Grade) {
        self.overrides.gingival_index = Some(grade);
    }

    pub fn set_general_notes(&mut self, notes: impl Into<String>) {
        self.overrides.general_notes = Some(notes.into());
    }
}

/// Partial update for the per-tooth fields of a [`ToothCondition`].
///
/// Surfaces, attachments, and the nested treatment plan have their own edit
/// flows and are not part of this patch. As with every patch type here,
/// `None` means "unchanged", so optional fields cannot be cleared.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToothConditionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_condition: Option<OverallCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobility: Option<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodontal_pocket_depth: Option<PocketDepths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Patchable for ToothCondition {
    type Patch = ToothConditionPatch;

    fn merged(&self, patch: &ToothConditionPatch) -> Self {
        ToothCondition {
            tooth_number: self.tooth_number,
            overall_condition: patch.overall_condition.unwrap_or(self.overall_condition),
            mobility: patch.mobility.unwrap_or(self.mobility),
            periodontal_pocket_depth: patch
                .periodontal_pocket_depth
                .or(self.periodontal_pocket_depth),
            surfaces: self.surfaces.clone(),
            treatment_plan: self.treatment_plan.clone(),
            attachments: self.attachments.clone(),
            notes: patch.notes.clone().or_else(|| self.notes.clone()),
        }
    }
}

impl Draft<ToothCondition> {
    pub fn set_overall_condition(&mut self, condition: OverallCondition) {
        self.overrides.overall_condition = Some(condition);
    }

    pub fn set_mobility(&mut self, mobility: Grade) {
        self.overrides.mobility = Some(mobility);
    }

    pub fn set_pocket_depths(&mut self, depths: PocketDepths) {
        self.overrides.periodontal_pocket_depth = Some(depths);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.overrides.notes = Some(notes.into());
    }
}

/// The chart-wide free-text notes, wrapped so they fit the draft model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralNotes(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneralNotesPatch {
    pub text: Option<String>,
}

impl Patchable for GeneralNotes {
    type Patch = GeneralNotesPatch;

    fn merged(&self, patch: &GeneralNotesPatch) -> Self {
        GeneralNotes(merge_field!(patch.text, self.0))
    }
}

impl Draft<GeneralNotes> {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.overrides.text = Some(text.into());
    }
}
