//! search_patient operation - identify the patient by name

use std::sync::Arc;

use async_trait::async_trait;

use super::{ClinicBackend, Operation, OperationError, OperationResult};
use crate::schema::{Cardinality, ValidatedRequest, operation_names};

pub struct SearchPatientOperation {
    backend: Arc<dyn ClinicBackend>,
}

impl SearchPatientOperation {
    pub fn new(backend: Arc<dyn ClinicBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Operation for SearchPatientOperation {
    fn name(&self) -> &'static str {
        operation_names::SEARCH_PATIENT
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::Single
    }

    async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError> {
        let req = match request {
            ValidatedRequest::SearchPatient(req) => req,
            other => return Err(OperationError::request_mismatch(self.name(), &other)),
        };

        let patient = self.backend.search_patient(&req).await?;
        Ok(OperationResult::Single(patient.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::MockClinic;
    use crate::schema::{InsuranceEligibilityRequest, PatientSearchRequest, Record};

    #[tokio::test]
    async fn test_search_patient_returns_single_record() {
        let op = SearchPatientOperation::new(Arc::new(MockClinic::new()));
        let result = op
            .execute(ValidatedRequest::SearchPatient(PatientSearchRequest {
                name: "Ravi Kumar".to_string(),
            }))
            .await
            .unwrap();

        match result {
            OperationResult::Single(Record::Patient(p)) => assert_eq!(p.patient_id, "PAT-123"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_patient_rejects_other_requests() {
        let op = SearchPatientOperation::new(Arc::new(MockClinic::new()));
        let result = op
            .execute(ValidatedRequest::CheckInsuranceEligibility(InsuranceEligibilityRequest {
                patient_id: "PAT-123".to_string(),
            }))
            .await;

        assert!(matches!(result, Err(OperationError::RequestMismatch { .. })));
    }
}
