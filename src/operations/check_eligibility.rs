//! check_insurance_eligibility operation

use std::sync::Arc;

use async_trait::async_trait;

use super::{ClinicBackend, Operation, OperationError, OperationResult};
use crate::schema::{Cardinality, ValidatedRequest, operation_names};

pub struct CheckEligibilityOperation {
    backend: Arc<dyn ClinicBackend>,
}

impl CheckEligibilityOperation {
    pub fn new(backend: Arc<dyn ClinicBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Operation for CheckEligibilityOperation {
    fn name(&self) -> &'static str {
        operation_names::CHECK_INSURANCE_ELIGIBILITY
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::Single
    }

    async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError> {
        let req = match request {
            ValidatedRequest::CheckInsuranceEligibility(req) => req,
            other => return Err(OperationError::request_mismatch(self.name(), &other)),
        };

        let eligibility = self.backend.check_insurance_eligibility(&req).await?;
        Ok(OperationResult::Single(eligibility.into()))
    }
}
