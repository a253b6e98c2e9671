//! The chart editor: per-section edit sessions over a fetched aggregate,
//! reconciled against the backend after every mutation.
//!
//! The rule the whole module is built around: **the server is the source of
//! truth after any mutation**. Every successful save, delete, or toggle is
//! followed by an unconditional refetch of the full aggregate, and the
//! in-memory copy is replaced wholesale. The mutation's own response body is
//! never used to patch locally, even when it contains enough data to do so —
//! server-computed rollups (`version`, `treatment_progress`,
//! `treatment_summary`) would otherwise go stale. The extra round-trip is a
//! deliberate trade.
//!
//! Failure semantics:
//! - mutation fails → nothing changes; the draft stays editable for a retry
//! - mutation succeeds, refetch fails → the draft is already gone (the write
//!   landed) and the aggregate is flagged stale until the next reload

use std::collections::HashSet;

use chairside_types::{Grade, ToothNumber};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::draft::{Draft, GeneralNotes, ToothConditionPatch, TreatmentPlanPatch};
use crate::error::{ApiResult, EditorError, EditorResult};
use crate::model::{
    Odontogram, OverallCondition, PeriodontalAssessment, ToothCondition, TreatmentPlan,
};
use crate::session::EditSessionStore;

/// Payload for creating a tooth condition that does not exist yet, e.g. the
/// first treatment plan recorded against an untouched tooth.
#[derive(Debug, Clone, Serialize)]
pub struct NewToothCondition {
    pub tooth_number: ToothNumber,
    pub overall_condition: OverallCondition,
    pub mobility: Grade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<TreatmentPlan>,
}

/// The remote entity client for odontograms, as the editor consumes it.
///
/// Implementations translate each call into one HTTP request and surface
/// failures as [`crate::error::ApiError`]. No retries, caching, or batching;
/// partial updates are last-write-wins and idempotent from the caller's
/// perspective. The HTTP implementation lives in the client crate; tests use
/// an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait OdontogramApi {
    async fn fetch_odontogram(&self, id: Uuid) -> ApiResult<Odontogram>;

    async fn create_tooth_condition(
        &self,
        odontogram_id: Uuid,
        condition: &NewToothCondition,
    ) -> ApiResult<ToothCondition>;

    async fn update_tooth_condition(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        patch: &ToothConditionPatch,
    ) -> ApiResult<()>;

    async fn create_treatment_plan(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        plan: &TreatmentPlan,
    ) -> ApiResult<TreatmentPlan>;

    async fn update_treatment_plan(
        &self,
        odontogram_id: Uuid,
        tooth: ToothNumber,
        patch: &TreatmentPlanPatch,
    ) -> ApiResult<()>;

    async fn delete_treatment_plan(&self, odontogram_id: Uuid, tooth: ToothNumber)
        -> ApiResult<()>;

    /// Full replacement; also creates the assessment when none exists yet.
    async fn update_periodontal(
        &self,
        odontogram_id: Uuid,
        assessment: &PeriodontalAssessment,
    ) -> ApiResult<()>;

    async fn update_general_notes(&self, odontogram_id: Uuid, notes: &str) -> ApiResult<()>;

    async fn set_active(&self, odontogram_id: Uuid, active: bool) -> ApiResult<()>;
}

/// Identifies one independently editable chart section for the single-flight
/// save gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Treatment(ToothNumber),
    Condition(ToothNumber),
    Periodontal,
    Notes,
    Chart,
}

/// Owns one open chart view: the fetched aggregate, the edit sessions for
/// each section, and the reconciliation logic that keeps them honest.
///
/// The editor is exclusively owned by the open view; dropping it (or calling
/// [`close`](ChartEditor::close)) discards the aggregate and every draft, so
/// nothing can leak into a view opened later for a different patient.
pub struct ChartEditor<C: OdontogramApi> {
    client: C,
    aggregate: Odontogram,
    treatments: EditSessionStore<ToothNumber, TreatmentPlan>,
    conditions: EditSessionStore<ToothNumber, ToothCondition>,
    periodontal: Option<Draft<PeriodontalAssessment>>,
    notes: Option<Draft<GeneralNotes>>,
    in_flight: HashSet<SectionKey>,
    stale: bool,
}

enum TreatmentSave {
    Patch(TreatmentPlanPatch),
    CreatePlan(TreatmentPlan),
    CreateCondition(NewToothCondition),
}

impl<C: OdontogramApi> ChartEditor<C> {
    /// Opens the chart for `odontogram_id`, fetching the aggregate.
    pub async fn open(client: C, odontogram_id: Uuid) -> EditorResult<Self> {
        let aggregate = client.fetch_odontogram(odontogram_id).await?;
        info!(odontogram = %odontogram_id, version = aggregate.version, "chart opened");
        Ok(Self {
            client,
            aggregate,
            treatments: EditSessionStore::new(),
            conditions: EditSessionStore::new(),
            periodontal: None,
            notes: None,
            in_flight: HashSet::new(),
            stale: false,
        })
    }

    /// The last aggregate received from the backend.
    pub fn aggregate(&self) -> &Odontogram {
        &self.aggregate
    }

    /// True when a mutation landed but the follow-up refetch failed, so the
    /// aggregate on screen may be out of date. Cleared by the next
    /// successful [`refresh`](ChartEditor::refresh) or save.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// True while any save is between its mutation and refetch legs.
    pub fn is_busy(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_busy_section(&self, key: SectionKey) -> bool {
        self.in_flight.contains(&key)
    }

    /// Manually reloads the aggregate from the backend.
    pub async fn refresh(&mut self) -> EditorResult<()> {
        let fresh = self.client.fetch_odontogram(self.aggregate.id).await?;
        debug!(version = fresh.version, "chart refreshed");
        self.aggregate = fresh;
        self.stale = false;
        Ok(())
    }

    /// Closes the view, discarding the aggregate and every draft.
    pub fn close(self) {}

    // --- treatment plan sessions -------------------------------------------

    /// Begins editing the treatment plan for `tooth`.
    ///
    /// Seeds from the recorded plan when one exists, otherwise from the
    /// new-plan defaults (medium priority, planned, zero cost).
    pub fn start_treatment_edit(&mut self, tooth: ToothNumber) -> &mut Draft<TreatmentPlan> {
        let seed = self
            .aggregate
            .treatment_plan(tooth)
            .cloned()
            .unwrap_or_default();
        self.treatments.start_edit(tooth, seed)
    }

    pub fn treatment_draft(&self, tooth: ToothNumber) -> Option<&Draft<TreatmentPlan>> {
        self.treatments.draft(tooth)
    }

    pub fn treatment_draft_mut(&mut self, tooth: ToothNumber) -> Option<&mut Draft<TreatmentPlan>> {
        self.treatments.draft_mut(tooth)
    }

    pub fn is_editing_treatment(&self, tooth: ToothNumber) -> bool {
        self.treatments.is_editing(tooth)
    }

    /// Discards the treatment draft for `tooth`. Purely local.
    pub fn cancel_treatment_edit(&mut self, tooth: ToothNumber) {
        self.treatments.cancel_edit(tooth);
    }

    /// Saves the treatment draft for `tooth` and refetches the aggregate.
    ///
    /// Chooses the request shape from current server truth: a plan on record
    /// gets the accumulated patch, a bare tooth condition gets a full new
    /// plan, and an untouched tooth gets a new condition carrying the plan.
    pub async fn save_treatment(&mut self, tooth: ToothNumber) -> EditorResult<()> {
        let key = SectionKey::Treatment(tooth);
        self.ensure_idle(key)?;
        let draft = self
            .treatments
            .draft(tooth)
            .ok_or(EditorError::NoActiveEdit)?;

        let request = if self.aggregate.treatment_plan(tooth).is_some() {
            TreatmentSave::Patch(draft.overrides().clone())
        } else if self.aggregate.tooth_condition(tooth).is_some() {
            TreatmentSave::CreatePlan(draft.resolve())
        } else {
            TreatmentSave::CreateCondition(NewToothCondition {
                tooth_number: tooth,
                overall_condition: OverallCondition::Healthy,
                mobility: Grade::ZERO,
                notes: None,
                treatment_plan: Some(draft.resolve()),
            })
        };

        self.in_flight.insert(key);
        let id = self.aggregate.id;
        let outcome = match &request {
            TreatmentSave::Patch(patch) => {
                self.client.update_treatment_plan(id, tooth, patch).await
            }
            TreatmentSave::CreatePlan(plan) => self
                .client
                .create_treatment_plan(id, tooth, plan)
                .await
                .map(|_| ()),
            TreatmentSave::CreateCondition(condition) => self
                .client
                .create_tooth_condition(id, condition)
                .await
                .map(|_| ()),
        };

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(tooth = tooth.value(), error = %err, "treatment save failed, draft preserved");
            return Err(err.into());
        }

        info!(tooth = tooth.value(), "treatment saved");
        self.treatments.take(tooth);
        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    /// Deletes the treatment plan for `tooth` and refetches the aggregate.
    /// Any open draft for that tooth is discarded with it.
    pub async fn delete_treatment(&mut self, tooth: ToothNumber) -> EditorResult<()> {
        let key = SectionKey::Treatment(tooth);
        self.ensure_idle(key)?;

        self.in_flight.insert(key);
        let outcome = self
            .client
            .delete_treatment_plan(self.aggregate.id, tooth)
            .await;

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(tooth = tooth.value(), error = %err, "treatment delete failed");
            return Err(err.into());
        }

        self.treatments.cancel_edit(tooth);
        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    // --- tooth condition sessions ------------------------------------------

    /// Begins editing the per-tooth condition fields for `tooth`, seeding
    /// from the recorded condition or a healthy default.
    pub fn start_condition_edit(&mut self, tooth: ToothNumber) -> &mut Draft<ToothCondition> {
        let seed = self
            .aggregate
            .tooth_condition(tooth)
            .cloned()
            .unwrap_or_else(|| ToothCondition::healthy(tooth));
        self.conditions.start_edit(tooth, seed)
    }

    pub fn condition_draft_mut(&mut self, tooth: ToothNumber) -> Option<&mut Draft<ToothCondition>> {
        self.conditions.draft_mut(tooth)
    }

    pub fn is_editing_condition(&self, tooth: ToothNumber) -> bool {
        self.conditions.is_editing(tooth)
    }

    pub fn cancel_condition_edit(&mut self, tooth: ToothNumber) {
        self.conditions.cancel_edit(tooth);
    }

    /// Saves the condition draft for `tooth` and refetches the aggregate.
    pub async fn save_condition(&mut self, tooth: ToothNumber) -> EditorResult<()> {
        let key = SectionKey::Condition(tooth);
        self.ensure_idle(key)?;
        let draft = self
            .conditions
            .draft(tooth)
            .ok_or(EditorError::NoActiveEdit)?;

        let exists = self.aggregate.tooth_condition(tooth).is_some();
        let patch = draft.overrides().clone();
        let created = if exists {
            None
        } else {
            let resolved = draft.resolve();
            Some(NewToothCondition {
                tooth_number: tooth,
                overall_condition: resolved.overall_condition,
                mobility: resolved.mobility,
                notes: resolved.notes,
                treatment_plan: None,
            })
        };

        self.in_flight.insert(key);
        let id = self.aggregate.id;
        let outcome = match &created {
            Some(condition) => self
                .client
                .create_tooth_condition(id, condition)
                .await
                .map(|_| ()),
            None => self.client.update_tooth_condition(id, tooth, &patch).await,
        };

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(tooth = tooth.value(), error = %err, "condition save failed, draft preserved");
            return Err(err.into());
        }

        self.conditions.take(tooth);
        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    // --- periodontal session -----------------------------------------------

    /// Begins editing the periodontal assessment, seeding from the recorded
    /// one or the documented defaults when none exists yet.
    pub fn start_periodontal_edit(&mut self) -> &mut Draft<PeriodontalAssessment> {
        let seed = self
            .aggregate
            .periodontal_assessment
            .clone()
            .unwrap_or_default();
        self.periodontal = Some(Draft::new(seed));
        self.periodontal
            .as_mut()
            .expect("periodontal draft was just set")
    }

    pub fn periodontal_draft_mut(&mut self) -> Option<&mut Draft<PeriodontalAssessment>> {
        self.periodontal.as_mut()
    }

    pub fn is_editing_periodontal(&self) -> bool {
        self.periodontal.is_some()
    }

    pub fn cancel_periodontal_edit(&mut self) {
        self.periodontal = None;
    }

    /// Saves the periodontal draft (full replacement) and refetches.
    pub async fn save_periodontal(&mut self) -> EditorResult<()> {
        let key = SectionKey::Periodontal;
        self.ensure_idle(key)?;
        let assessment = self
            .periodontal
            .as_ref()
            .ok_or(EditorError::NoActiveEdit)?
            .resolve();

        self.in_flight.insert(key);
        let outcome = self
            .client
            .update_periodontal(self.aggregate.id, &assessment)
            .await;

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(error = %err, "periodontal save failed, draft preserved");
            return Err(err.into());
        }

        self.periodontal = None;
        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    // --- general notes session ---------------------------------------------

    /// Begins editing the chart-wide notes.
    pub fn start_notes_edit(&mut self) -> &mut Draft<GeneralNotes> {
        let seed = GeneralNotes(self.aggregate.general_notes.clone().unwrap_or_default());
        self.notes = Some(Draft::new(seed));
        self.notes.as_mut().expect("notes draft was just set")
    }

    pub fn notes_draft_mut(&mut self) -> Option<&mut Draft<GeneralNotes>> {
        self.notes.as_mut()
    }

    pub fn is_editing_notes(&self) -> bool {
        self.notes.is_some()
    }

    pub fn cancel_notes_edit(&mut self) {
        self.notes = None;
    }

    /// Saves the notes draft (full replacement) and refetches.
    pub async fn save_notes(&mut self) -> EditorResult<()> {
        let key = SectionKey::Notes;
        self.ensure_idle(key)?;
        let text = self
            .notes
            .as_ref()
            .ok_or(EditorError::NoActiveEdit)?
            .resolve()
            .0;

        self.in_flight.insert(key);
        let outcome = self
            .client
            .update_general_notes(self.aggregate.id, &text)
            .await;

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(error = %err, "notes save failed, draft preserved");
            return Err(err.into());
        }

        self.notes = None;
        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    // --- chart-level operations --------------------------------------------

    /// Toggles the chart's active flag and refetches.
    pub async fn set_active(&mut self, active: bool) -> EditorResult<()> {
        let key = SectionKey::Chart;
        self.ensure_idle(key)?;

        self.in_flight.insert(key);
        let outcome = self.client.set_active(self.aggregate.id, active).await;

        if let Err(err) = outcome {
            self.in_flight.remove(&key);
            warn!(error = %err, "active toggle failed");
            return Err(err.into());
        }

        let refreshed = self.refetch_after_mutation().await;
        self.in_flight.remove(&key);
        refreshed
    }

    // --- internals ----------------------------------------------------------

    fn ensure_idle(&self, key: SectionKey) -> EditorResult<()> {
        if self.in_flight.contains(&key) {
            return Err(EditorError::SaveInProgress);
        }
        Ok(())
    }

    /// Replaces the aggregate with a fresh fetch after a mutation landed.
    /// On fetch failure the aggregate is flagged stale; the caller's draft is
    /// already gone because the write itself succeeded.
    async fn refetch_after_mutation(&mut self) -> EditorResult<()> {
        match self.client.fetch_odontogram(self.aggregate.id).await {
            Ok(fresh) => {
                debug!(version = fresh.version, "aggregate reconciled after mutation");
                self.aggregate = fresh;
                self.stale = false;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "refetch after mutation failed, aggregate is stale");
                self.stale = true;
                Err(EditorError::StaleAfterSave(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::Patchable;
    use crate::error::ApiError;
    use crate::model::{PatientType, TreatmentSummary};
    use chairside_types::NumberingSystem;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n, NumberingSystem::Universal).expect("valid universal tooth")
    }

    fn network_error() -> ApiError {
        ApiError::Network("connection reset".into())
    }

    /// Scripted in-memory backend. Applies mutations to its own copy of the
    /// aggregate, bumps `version`, and recomputes the summary the way the
    /// real server would, so refetches observe every mutation's effect.
    struct FakeApi {
        state: RefCell<FakeState>,
    }

    struct FakeState {
        odontogram: Odontogram,
        fail_mutations: VecDeque<ApiError>,
        fail_fetches: VecDeque<ApiError>,
        fetch_count: usize,
        mutation_count: usize,
    }

    impl FakeApi {
        fn new(odontogram: Odontogram) -> Self {
            Self {
                state: RefCell::new(FakeState {
                    odontogram,
                    fail_mutations: VecDeque::new(),
                    fail_fetches: VecDeque::new(),
                    fetch_count: 0,
                    mutation_count: 0,
                }),
            }
        }

        fn fail_next_mutation(&self, err: ApiError) {
            self.state.borrow_mut().fail_mutations.push_back(err);
        }

        fn fail_next_fetch(&self, err: ApiError) {
            self.state.borrow_mut().fail_fetches.push_back(err);
        }

        fn fetch_count(&self) -> usize {
            self.state.borrow().fetch_count
        }

        fn mutation_count(&self) -> usize {
            self.state.borrow().mutation_count
        }

        fn server_version(&self) -> u64 {
            self.state.borrow().odontogram.version
        }

        fn server_summary(&self) -> TreatmentSummary {
            self.state.borrow().odontogram.treatment_summary.clone()
        }

        fn begin_mutation(&self) -> ApiResult<()> {
            let mut state = self.state.borrow_mut();
            if let Some(err) = state.fail_mutations.pop_front() {
                return Err(err);
            }
            state.mutation_count += 1;
            Ok(())
        }

        fn commit(&self, apply: impl FnOnce(&mut Odontogram)) {
            let mut state = self.state.borrow_mut();
            apply(&mut state.odontogram);
            state.odontogram.version += 1;
            recompute_summary(&mut state.odontogram);
        }
    }

    fn recompute_summary(chart: &mut Odontogram) {
        let mut summary = TreatmentSummary::default();
        for condition in &chart.teeth_conditions {
            if let Some(plan) = &condition.treatment_plan {
                summary.total_treatments += 1;
                summary.estimated_total_cost += plan.estimated_cost;
                match plan.status {
                    crate::model::TreatmentStatus::Planned => summary.pending_treatments += 1,
                    crate::model::TreatmentStatus::InProgress => {
                        summary.in_progress_treatments += 1
                    }
                    crate::model::TreatmentStatus::Completed => summary.completed_treatments += 1,
                    crate::model::TreatmentStatus::Cancelled => {}
                }
            }
        }
        chart.treatment_progress = if summary.total_treatments > 0 {
            (summary.completed_treatments * 100 / summary.total_treatments) as u8
        } else {
            0
        };
        chart.treatment_summary = summary;
    }

    impl OdontogramApi for &FakeApi {
        async fn fetch_odontogram(&self, _id: Uuid) -> ApiResult<Odontogram> {
            let mut state = self.state.borrow_mut();
            if let Some(err) = state.fail_fetches.pop_front() {
                return Err(err);
            }
            state.fetch_count += 1;
            Ok(state.odontogram.clone())
        }

        async fn create_tooth_condition(
            &self,
            _id: Uuid,
            condition: &NewToothCondition,
        ) -> ApiResult<ToothCondition> {
            self.begin_mutation()?;
            let mut created = ToothCondition::healthy(condition.tooth_number);
            created.overall_condition = condition.overall_condition;
            created.mobility = condition.mobility;
            created.notes = condition.notes.clone();
            created.treatment_plan = condition.treatment_plan.clone();
            let returned = created.clone();
            self.commit(|chart| {
                // Upsert keyed by tooth number, never a duplicate entry.
                chart
                    .teeth_conditions
                    .retain(|c| c.tooth_number != created.tooth_number);
                chart.teeth_conditions.push(created);
            });
            Ok(returned)
        }

        async fn update_tooth_condition(
            &self,
            _id: Uuid,
            tooth: ToothNumber,
            patch: &ToothConditionPatch,
        ) -> ApiResult<()> {
            self.begin_mutation()?;
            let patch = patch.clone();
            self.commit(|chart| {
                if let Some(condition) =
                    chart.teeth_conditions.iter_mut().find(|c| c.tooth_number == tooth)
                {
                    *condition = condition.merged(&patch);
                }
            });
            Ok(())
        }

        async fn create_treatment_plan(
            &self,
            _id: Uuid,
            tooth: ToothNumber,
            plan: &TreatmentPlan,
        ) -> ApiResult<TreatmentPlan> {
            self.begin_mutation()?;
            let plan = plan.clone();
            let returned = plan.clone();
            self.commit(|chart| {
                if let Some(condition) =
                    chart.teeth_conditions.iter_mut().find(|c| c.tooth_number == tooth)
                {
                    condition.treatment_plan = Some(plan);
                }
            });
            Ok(returned)
        }

        async fn update_treatment_plan(
            &self,
            _id: Uuid,
            tooth: ToothNumber,
            patch: &TreatmentPlanPatch,
        ) -> ApiResult<()> {
            self.begin_mutation()?;
            let patch = patch.clone();
            self.commit(|chart| {
                if let Some(plan) = chart
                    .teeth_conditions
                    .iter_mut()
                    .find(|c| c.tooth_number == tooth)
                    .and_then(|c| c.treatment_plan.as_mut())
                {
                    *plan = plan.merged(&patch);
                }
            });
            Ok(())
        }

        async fn delete_treatment_plan(&self, _id: Uuid, tooth: ToothNumber) -> ApiResult<()> {
            self.begin_mutation()?;
            self.commit(|chart| {
                if let Some(condition) =
                    chart.teeth_conditions.iter_mut().find(|c| c.tooth_number == tooth)
                {
                    condition.treatment_plan = None;
                }
            });
            Ok(())
        }

        async fn update_periodontal(
            &self,
            _id: Uuid,
            assessment: &PeriodontalAssessment,
        ) -> ApiResult<()> {
            self.begin_mutation()?;
            let assessment = assessment.clone();
            self.commit(|chart| {
                chart.periodontal_assessment = Some(assessment);
            });
            Ok(())
        }

        async fn update_general_notes(&self, _id: Uuid, notes: &str) -> ApiResult<()> {
            self.begin_mutation()?;
            let notes = notes.to_owned();
            self.commit(|chart| {
                chart.general_notes = Some(notes);
            });
            Ok(())
        }

        async fn set_active(&self, _id: Uuid, active: bool) -> ApiResult<()> {
            self.begin_mutation()?;
            self.commit(|chart| {
                chart.is_active = active;
            });
            Ok(())
        }
    }

    fn sample_chart() -> Odontogram {
        Odontogram {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            clinic_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            numbering_system: NumberingSystem::Universal,
            patient_type: PatientType::Adult,
            examination_date: NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date"),
            is_active: true,
            version: 1,
            teeth_conditions: Vec::new(),
            periodontal_assessment: None,
            general_notes: None,
            treatment_progress: 0,
            treatment_summary: TreatmentSummary::default(),
        }
    }

    fn chart_with_plan(tooth_n: u8, plan: TreatmentPlan) -> Odontogram {
        let mut chart = sample_chart();
        let mut condition = ToothCondition::healthy(tooth(tooth_n));
        condition.treatment_plan = Some(plan);
        chart.teeth_conditions = vec![condition];
        recompute_summary(&mut chart);
        chart
    }

    async fn open_editor(api: &FakeApi) -> ChartEditor<&FakeApi> {
        let id = api.state.borrow().odontogram.id;
        ChartEditor::open(api, id).await.expect("open should succeed")
    }

    #[tokio::test]
    async fn adding_a_plan_to_an_untouched_tooth_creates_the_condition() {
        // Scenario A: no condition for tooth 14 yet.
        let api = FakeApi::new(sample_chart());
        let mut editor = open_editor(&api).await;

        let draft = editor.start_treatment_edit(tooth(14));
        let seeded = draft.resolve();
        assert_eq!(seeded.priority, crate::model::TreatmentPriority::Medium);
        assert_eq!(seeded.status, crate::model::TreatmentStatus::Planned);
        assert_eq!(seeded.estimated_cost, 0.0);

        draft.set_planned_treatment("composite filling");
        editor
            .save_treatment(tooth(14))
            .await
            .expect("save should succeed");

        let chart = editor.aggregate();
        let condition = chart
            .tooth_condition(tooth(14))
            .expect("tooth 14 should now be recorded");
        assert_eq!(
            condition
                .treatment_plan
                .as_ref()
                .expect("plan should exist")
                .planned_treatment,
            "composite filling"
        );
        assert_eq!(chart.treatment_summary.pending_treatments, 1);
        assert!(!editor.is_editing_treatment(tooth(14)), "draft cleared on success");
    }

    #[tokio::test]
    async fn completing_a_plan_shows_the_stamp_before_save_and_survives_it() {
        // Scenario B: in-progress plan for tooth 9, no completion date.
        let plan = TreatmentPlan {
            status: crate::model::TreatmentStatus::InProgress,
            planned_treatment: "root canal".into(),
            ..TreatmentPlan::default()
        };
        let api = FakeApi::new(chart_with_plan(9, plan));
        let mut editor = open_editor(&api).await;

        let now = Utc
            .with_ymd_and_hms(2025, 6, 1, 10, 30, 0)
            .single()
            .expect("valid timestamp");
        let draft = editor.start_treatment_edit(tooth(9));
        draft.set_status(crate::model::TreatmentStatus::Completed, now);

        let pending = draft.resolve();
        assert_eq!(
            pending.completed_date,
            Some(now),
            "the stamp must be visible before save is clicked"
        );

        editor.save_treatment(tooth(9)).await.expect("save should succeed");

        let saved = editor
            .aggregate()
            .treatment_plan(tooth(9))
            .expect("plan should survive");
        assert_eq!(saved.status, crate::model::TreatmentStatus::Completed);
        assert_eq!(saved.completed_date, Some(now));
    }

    #[tokio::test]
    async fn failed_save_preserves_the_draft_and_skips_the_refetch() {
        // Scenario C: the mutation call rejects.
        let api = FakeApi::new(chart_with_plan(5, TreatmentPlan::default()));
        let mut editor = open_editor(&api).await;
        let fetches_after_open = api.fetch_count();

        let draft = editor.start_treatment_edit(tooth(5));
        draft.set_estimated_cost(480.0);
        api.fail_next_mutation(network_error());

        let err = editor
            .save_treatment(tooth(5))
            .await
            .expect_err("save should fail");
        assert!(matches!(err, EditorError::Api(ApiError::Network(_))));

        assert!(editor.is_editing_treatment(tooth(5)), "draft must survive the failure");
        let kept = editor
            .treatment_draft(tooth(5))
            .expect("draft exists")
            .resolve();
        assert_eq!(kept.estimated_cost, 480.0, "edits must be unchanged");
        assert_eq!(
            api.fetch_count(),
            fetches_after_open,
            "no refetch may happen when the mutation failed"
        );
        assert!(!editor.is_busy(), "busy gate must release on failure");
        assert!(!editor.is_stale());
    }

    #[tokio::test]
    async fn rendered_version_always_comes_from_the_refetch() {
        let api = FakeApi::new(chart_with_plan(9, TreatmentPlan::default()));
        let mut editor = open_editor(&api).await;
        let before = editor.aggregate().version;

        editor
            .start_treatment_edit(tooth(9))
            .set_priority(crate::model::TreatmentPriority::High);
        editor.save_treatment(tooth(9)).await.expect("save should succeed");

        assert_eq!(editor.aggregate().version, api.server_version());
        assert!(editor.aggregate().version > before);
    }

    #[tokio::test]
    async fn cancel_is_a_pure_local_operation() {
        let api = FakeApi::new(chart_with_plan(9, TreatmentPlan::default()));
        let mut editor = open_editor(&api).await;
        let fetches = api.fetch_count();
        let mutations = api.mutation_count();

        editor
            .start_treatment_edit(tooth(9))
            .set_planned_treatment("never sent");
        editor.cancel_treatment_edit(tooth(9));

        assert!(!editor.is_editing_treatment(tooth(9)));
        assert_eq!(api.fetch_count(), fetches, "cancel must not fetch");
        assert_eq!(api.mutation_count(), mutations, "cancel must not mutate");
        assert_eq!(
            editor
                .aggregate()
                .treatment_plan(tooth(9))
                .expect("plan exists")
                .planned_treatment,
            "",
            "read-only view reverts to server truth"
        );
    }

    #[tokio::test]
    async fn refetch_failure_after_a_landed_mutation_flags_the_chart_stale() {
        let api = FakeApi::new(chart_with_plan(9, TreatmentPlan::default()));
        let mut editor = open_editor(&api).await;

        editor
            .start_treatment_edit(tooth(9))
            .set_notes("post-op check in two weeks");
        api.fail_next_fetch(network_error());

        let err = editor
            .save_treatment(tooth(9))
            .await
            .expect_err("refetch failure must surface");
        assert!(matches!(err, EditorError::StaleAfterSave(_)));
        assert!(editor.is_stale(), "chart must be flagged out of date");
        assert!(
            !editor.is_editing_treatment(tooth(9)),
            "the write landed, so the draft is gone"
        );

        editor.refresh().await.expect("manual reload should succeed");
        assert!(!editor.is_stale(), "successful reload clears the flag");
        assert_eq!(editor.aggregate().version, api.server_version());
    }

    #[tokio::test]
    async fn save_without_an_active_edit_is_rejected() {
        let api = FakeApi::new(sample_chart());
        let mut editor = open_editor(&api).await;

        let err = editor
            .save_treatment(tooth(9))
            .await
            .expect_err("nothing is being edited");
        assert!(matches!(err, EditorError::NoActiveEdit));
    }

    #[tokio::test]
    async fn resending_an_identical_patch_reaches_the_same_end_state() {
        let api = FakeApi::new(chart_with_plan(9, TreatmentPlan::default()));
        let id = api.state.borrow().odontogram.id;

        let patch = TreatmentPlanPatch {
            estimated_cost: Some(250.0),
            status: Some(crate::model::TreatmentStatus::InProgress),
            ..TreatmentPlanPatch::default()
        };

        let client = &api;
        client
            .update_treatment_plan(id, tooth(9), &patch)
            .await
            .expect("first update should succeed");
        let after_first = api.server_summary();
        let teeth_after_first = api.state.borrow().odontogram.teeth_conditions.len();

        client
            .update_treatment_plan(id, tooth(9), &patch)
            .await
            .expect("second identical update should succeed");

        assert_eq!(api.server_summary(), after_first, "no counter may double-apply");
        assert_eq!(
            api.state.borrow().odontogram.teeth_conditions.len(),
            teeth_after_first,
            "no duplicate sub-entity may appear"
        );
    }

    #[tokio::test]
    async fn first_periodontal_save_fills_documented_defaults() {
        // Scenario D: assessment does not exist yet.
        let api = FakeApi::new(sample_chart());
        let mut editor = open_editor(&api).await;

        let draft = editor.start_periodontal_edit();
        draft.set_plaque_index(Grade::new(2).expect("2 is a valid grade"));
        editor.save_periodontal().await.expect("save should succeed");

        let assessment = editor
            .aggregate()
            .periodontal_assessment
            .as_ref()
            .expect("assessment should now exist");
        assert_eq!(assessment.plaque_index.value(), 2);
        assert!(!assessment.bleeding_on_probing);
        assert!(!assessment.calculus_present);
        assert_eq!(assessment.gingival_index.value(), 0);
        assert_eq!(assessment.general_notes, "");
    }

    #[tokio::test]
    async fn sections_edit_independently() {
        let mut chart = chart_with_plan(9, TreatmentPlan::default());
        let mut other = ToothCondition::healthy(tooth(14));
        other.treatment_plan = Some(TreatmentPlan {
            planned_treatment: "crown".into(),
            ..TreatmentPlan::default()
        });
        chart.teeth_conditions.push(other);
        recompute_summary(&mut chart);

        let api = FakeApi::new(chart);
        let mut editor = open_editor(&api).await;

        editor
            .start_treatment_edit(tooth(9))
            .set_planned_treatment("extraction");
        editor.start_notes_edit().set_text("patient anxious");

        // Tooth 14 stays read-only and untouched while 9 and the notes are
        // mid-edit.
        assert!(!editor.is_editing_treatment(tooth(14)));
        assert_eq!(
            editor
                .aggregate()
                .treatment_plan(tooth(14))
                .expect("plan exists")
                .planned_treatment,
            "crown"
        );

        editor.save_notes().await.expect("notes save should succeed");
        assert!(
            editor.is_editing_treatment(tooth(9)),
            "saving one section must not clear another section's draft"
        );
        assert_eq!(editor.aggregate().general_notes.as_deref(), Some("patient anxious"));
    }

    #[tokio::test]
    async fn delete_reconciles_and_discards_the_tooth_draft() {
        let api = FakeApi::new(chart_with_plan(9, TreatmentPlan::default()));
        let mut editor = open_editor(&api).await;

        editor.start_treatment_edit(tooth(9));
        editor.delete_treatment(tooth(9)).await.expect("delete should succeed");

        assert!(editor.aggregate().treatment_plan(tooth(9)).is_none());
        assert!(!editor.is_editing_treatment(tooth(9)));
        assert_eq!(editor.aggregate().treatment_summary.total_treatments, 0);
    }

    #[tokio::test]
    async fn toggle_active_refetches_like_any_other_mutation() {
        let api = FakeApi::new(sample_chart());
        let mut editor = open_editor(&api).await;
        let before = editor.aggregate().version;

        editor.set_active(false).await.expect("toggle should succeed");

        assert!(!editor.aggregate().is_active);
        assert_eq!(editor.aggregate().version, before + 1);
    }

    #[tokio::test]
    async fn condition_edit_for_a_new_tooth_creates_it_without_a_plan() {
        let api = FakeApi::new(sample_chart());
        let mut editor = open_editor(&api).await;

        let draft = editor.start_condition_edit(tooth(3));
        draft.set_overall_condition(OverallCondition::Decayed);
        draft.set_mobility(Grade::new(1).expect("1 is a valid grade"));

        editor.save_condition(tooth(3)).await.expect("save should succeed");

        let condition = editor
            .aggregate()
            .tooth_condition(tooth(3))
            .expect("tooth 3 should now be recorded");
        assert_eq!(condition.overall_condition, OverallCondition::Decayed);
        assert_eq!(condition.mobility.value(), 1);
        assert!(condition.treatment_plan.is_none());
    }
}
