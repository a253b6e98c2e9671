//! Domain model for the dental chart aggregate.
//!
//! These types mirror the backend's JSON shapes. The aggregate root is
//! [`Odontogram`]; everything the backend computes (`version`,
//! `treatment_progress`, `treatment_summary`) is carried verbatim and never
//! recomputed on this side of the wire.

mod odontogram;
mod periodontal;
mod treatment;

pub use odontogram::{
    Attachment, Odontogram, OverallCondition, PatientType, PocketDepths, Severity,
    SurfaceCondition, ToothCondition, ToothSurface, TreatmentSummary,
};
pub use periodontal::PeriodontalAssessment;
pub use treatment::{TreatmentPlan, TreatmentPriority, TreatmentStatus};
