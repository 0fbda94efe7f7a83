//! book_appointment operation - terminates the workflow on success

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use super::{ClinicBackend, Operation, OperationError, OperationResult};
use crate::schema::{Cardinality, ValidatedRequest, operation_names};

pub struct BookAppointmentOperation {
    backend: Arc<dyn ClinicBackend>,
}

impl BookAppointmentOperation {
    pub fn new(backend: Arc<dyn ClinicBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Operation for BookAppointmentOperation {
    fn name(&self) -> &'static str {
        operation_names::BOOK_APPOINTMENT
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::Single
    }

    async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError> {
        let req = match request {
            ValidatedRequest::BookAppointment(req) => req,
            other => return Err(OperationError::request_mismatch(self.name(), &other)),
        };

        let confirmation = self.backend.book_appointment(&req).await?;
        info!(
            "Booked appointment {} for patient {}",
            confirmation.appointment_id, confirmation.patient_id
        );
        Ok(OperationResult::Single(confirmation.into()))
    }
}
