//! find_available_slots operation - list-valued

use std::sync::Arc;

use async_trait::async_trait;

use super::{ClinicBackend, Operation, OperationError, OperationResult};
use crate::schema::{Cardinality, Record, ValidatedRequest, operation_names};

pub struct FindSlotsOperation {
    backend: Arc<dyn ClinicBackend>,
}

impl FindSlotsOperation {
    pub fn new(backend: Arc<dyn ClinicBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Operation for FindSlotsOperation {
    fn name(&self) -> &'static str {
        operation_names::FIND_AVAILABLE_SLOTS
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::List
    }

    async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError> {
        let req = match request {
            ValidatedRequest::FindAvailableSlots(req) => req,
            other => return Err(OperationError::request_mismatch(self.name(), &other)),
        };

        let slots = self.backend.find_available_slots(&req).await?;
        Ok(OperationResult::List(slots.into_iter().map(Record::from).collect()))
    }
}
