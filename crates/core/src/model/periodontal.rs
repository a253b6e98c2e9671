use chairside_types::Grade;
use serde::{Deserialize, Serialize};

/// Whole-mouth periodontal assessment (at most one per odontogram).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodontalAssessment {
    pub bleeding_on_probing: bool,
    pub calculus_present: bool,
    pub plaque_index: Grade,
    pub gingival_index: Grade,
    pub general_notes: String,
}

impl Default for PeriodontalAssessment {
    /// Defaults for a first assessment: no findings, grade 0, empty notes.
    fn default() -> Self {
        Self {
            bleeding_on_probing: false,
            calculus_present: false,
            plaque_index: Grade::ZERO,
            gingival_index: Grade::ZERO,
            general_notes: String::new(),
        }
    }
}
