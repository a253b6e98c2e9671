//! # chairside core
//!
//! Client-side core of the clinical-practice dashboard's dental chart view.
//!
//! This crate owns the pieces that must be correct regardless of transport:
//! - the domain model of the odontogram aggregate and its sub-entities
//!   ([`model`])
//! - per-section drafts over server truth ([`draft`], [`session`])
//! - the reconciliation controller that refetches the aggregate after every
//!   mutation ([`editor`])
//! - data-driven edit-form descriptors ([`forms`])
//!
//! **No transport concerns**: HTTP, authentication headers, and pagination
//! belong in the client crate, which implements [`editor::OdontogramApi`].

pub mod draft;
pub mod editor;
pub mod error;
pub mod forms;
pub mod model;
pub mod session;

pub use draft::{
    Draft, GeneralNotes, GeneralNotesPatch, Patchable, PeriodontalPatch, ToothConditionPatch,
    TreatmentPlanPatch,
};
pub use editor::{ChartEditor, NewToothCondition, OdontogramApi, SectionKey};
pub use error::{ApiError, ApiResult, EditorError, EditorResult, FieldError};
pub use model::{
    Odontogram, OverallCondition, PatientType, PeriodontalAssessment, Severity, SurfaceCondition,
    ToothCondition, ToothSurface, TreatmentPlan, TreatmentPriority, TreatmentStatus,
    TreatmentSummary,
};
pub use session::EditSessionStore;
