//! Clinic backend contract and the in-memory mock

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use log::debug;

use crate::schema::{
    AppointmentConfirmation, AppointmentSlot, AppointmentSlotRequest, BookAppointmentRequest,
    InsuranceEligibilityRequest, InsuranceEligibilityResponse, Patient, PatientSearchRequest,
};

/// Domain failures reported by a backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("No patient matches '{0}'")]
    PatientNotFound(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Swappable clinical/insurance backend behind the four operations
#[async_trait]
pub trait ClinicBackend: Send + Sync {
    async fn search_patient(&self, request: &PatientSearchRequest) -> Result<Patient, BackendError>;

    async fn check_insurance_eligibility(
        &self,
        request: &InsuranceEligibilityRequest,
    ) -> Result<InsuranceEligibilityResponse, BackendError>;

    async fn find_available_slots(
        &self,
        request: &AppointmentSlotRequest,
    ) -> Result<Vec<AppointmentSlot>, BackendError>;

    async fn book_appointment(&self, request: &BookAppointmentRequest) -> Result<AppointmentConfirmation, BackendError>;
}

const MOCK_PATIENT_ID: &str = "PAT-123";
const MOCK_PROVIDER: &str = "ABC Health Insurance";
const MOCK_SLOT_ID: &str = "SLOT-001";
const MOCK_SLOT_TIME: &str = "10:00 AM";

/// Fixture backend: one patient, always eligible, one slot per search
#[derive(Debug, Default)]
pub struct MockClinic {
    /// Slots handed out by `find_available_slots`, keyed by slot id
    offered: Mutex<HashMap<String, AppointmentSlot>>,
    /// Confirmations issued
    bookings: AtomicUsize,
}

impl MockClinic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bookings made so far
    pub fn booking_count(&self) -> usize {
        self.bookings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClinicBackend for MockClinic {
    async fn search_patient(&self, request: &PatientSearchRequest) -> Result<Patient, BackendError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(BackendError::PatientNotFound(request.name.clone()));
        }

        Ok(Patient {
            patient_id: MOCK_PATIENT_ID.to_string(),
            name: name.to_string(),
            dob: NaiveDate::from_ymd_opt(1985, 6, 15).unwrap_or_default(),
        })
    }

    async fn check_insurance_eligibility(
        &self,
        request: &InsuranceEligibilityRequest,
    ) -> Result<InsuranceEligibilityResponse, BackendError> {
        Ok(InsuranceEligibilityResponse {
            patient_id: request.patient_id.clone(),
            eligible: true,
            provider: Some(MOCK_PROVIDER.to_string()),
        })
    }

    async fn find_available_slots(
        &self,
        request: &AppointmentSlotRequest,
    ) -> Result<Vec<AppointmentSlot>, BackendError> {
        if request.date_range_start > request.date_range_end {
            return Err(BackendError::InvalidDateRange {
                start: request.date_range_start,
                end: request.date_range_end,
            });
        }

        let slot = AppointmentSlot {
            slot_id: MOCK_SLOT_ID.to_string(),
            date: request.date_range_start,
            time: MOCK_SLOT_TIME.to_string(),
        };

        let mut offered = self
            .offered
            .lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?;
        offered.insert(slot.slot_id.clone(), slot.clone());
        debug!("Offering {} slot {} on {}", request.specialty, slot.slot_id, slot.date);

        Ok(vec![slot])
    }

    async fn book_appointment(&self, request: &BookAppointmentRequest) -> Result<AppointmentConfirmation, BackendError> {
        let offered = self
            .offered
            .lock()
            .map_err(|e| BackendError::Unavailable(e.to_string()))?
            .get(&request.slot_id)
            .cloned();

        // Slots never offered book for today
        let (date, time) = match offered {
            Some(slot) => (slot.date, slot.time),
            None => (Local::now().date_naive(), MOCK_SLOT_TIME.to_string()),
        };

        self.bookings.fetch_add(1, Ordering::SeqCst);

        Ok(AppointmentConfirmation {
            appointment_id: uuid::Uuid::new_v4().to_string(),
            patient_id: request.patient_id.clone(),
            specialty: request.specialty.clone(),
            date,
            time,
        })
    }
}
