//! Typed request and response records for the clinic operations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Look up a patient by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSearchRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub patient_id: String,
    pub name: String,
    pub dob: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceEligibilityRequest {
    pub patient_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceEligibilityResponse {
    pub patient_id: String,
    pub eligible: bool,
    pub provider: Option<String>,
}

/// Search window for open slots, inclusive on both ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlotRequest {
    pub specialty: String,
    pub date_range_start: NaiveDate,
    pub date_range_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSlot {
    pub slot_id: String,
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: String,
    pub slot_id: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentConfirmation {
    pub appointment_id: String,
    pub patient_id: String,
    pub specialty: String,
    pub date: NaiveDate,
    pub time: String,
}

/// Any record an operation can return
///
/// Serializes as the bare field mapping of the wrapped record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Patient(Patient),
    Eligibility(InsuranceEligibilityResponse),
    Slot(AppointmentSlot),
    Confirmation(AppointmentConfirmation),
}

impl From<Patient> for Record {
    fn from(value: Patient) -> Self {
        Record::Patient(value)
    }
}

impl From<InsuranceEligibilityResponse> for Record {
    fn from(value: InsuranceEligibilityResponse) -> Self {
        Record::Eligibility(value)
    }
}

impl From<AppointmentSlot> for Record {
    fn from(value: AppointmentSlot) -> Self {
        Record::Slot(value)
    }
}

impl From<AppointmentConfirmation> for Record {
    fn from(value: AppointmentConfirmation) -> Self {
        Record::Confirmation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_serializes_dob_as_iso_date() {
        let patient = Patient {
            patient_id: "PAT-123".to_string(),
            name: "Ravi Kumar".to_string(),
            dob: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap(),
        };

        let json = serde_json::to_value(&patient).unwrap();
        assert_eq!(json["dob"], "1985-06-15");
    }

    #[test]
    fn test_slot_request_parses_dates() {
        let req: AppointmentSlotRequest = serde_json::from_value(serde_json::json!({
            "specialty": "cardiology",
            "date_range_start": "2024-01-01",
            "date_range_end": "2024-01-07"
        }))
        .unwrap();

        assert_eq!(req.date_range_start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(req.date_range_end, NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    }

    #[test]
    fn test_record_serializes_untagged() {
        let record = Record::from(InsuranceEligibilityResponse {
            patient_id: "PAT-123".to_string(),
            eligible: true,
            provider: None,
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "patient_id": "PAT-123", "eligible": true, "provider": null })
        );
    }
}
