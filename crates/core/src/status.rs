//! Patient status walk: `Registered → InConsultation → InTreatment → Discharged`.
//!
//! The walk is strictly linear. `Discharged` is terminal; advancing a discharged patient is a
//! valid no-op.

use crate::patient::PatientRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatientStatus {
    Registered,
    InConsultation,
    InTreatment,
    Discharged,
}

impl PatientStatus {
    /// The status after this one, or `None` for `Discharged`.
    pub fn next(self) -> Option<PatientStatus> {
        match self {
            PatientStatus::Registered => Some(PatientStatus::InConsultation),
            PatientStatus::InConsultation => Some(PatientStatus::InTreatment),
            PatientStatus::InTreatment => Some(PatientStatus::Discharged),
            PatientStatus::Discharged => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    pub fn label(self) -> &'static str {
        match self {
            PatientStatus::Registered => "registered",
            PatientStatus::InConsultation => "in consultation",
            PatientStatus::InTreatment => "in treatment",
            PatientStatus::Discharged => "discharged",
        }
    }
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Drives a patient record along the status walk.
pub struct StatusWalk;

impl StatusWalk {
    /// Moves the patient one step forward and returns the resulting status.
    ///
    /// A discharged patient keeps its status. A record with no status attached is left alone and
    /// `None` is returned.
    pub fn advance(patient: &mut PatientRecord) -> Option<PatientStatus> {
        let current = patient.status()?;

        match current.next() {
            Some(next) => {
                tracing::info!(
                    patient_id = patient.id(),
                    from = current.label(),
                    to = next.label(),
                    "patient {} is {}, moving on",
                    patient.name(),
                    current
                );
                patient.set_status(next);
                Some(next)
            }
            None => {
                tracing::info!(
                    patient_id = patient.id(),
                    "patient {} has been discharged, no further transitions",
                    patient.name()
                );
                Some(current)
            }
        }
    }
}
