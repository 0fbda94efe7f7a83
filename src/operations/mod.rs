//! Operation registry and executors
//!
//! Each operation adapts one `ClinicBackend` call to the uniform
//! `ValidatedRequest -> OperationResult` contract used by the agent loop.

mod backend;
mod book_appointment;
mod check_eligibility;
mod find_slots;
mod registry;
mod search_patient;

pub use backend::{BackendError, ClinicBackend, MockClinic};
pub use book_appointment::BookAppointmentOperation;
pub use check_eligibility::CheckEligibilityOperation;
pub use find_slots::FindSlotsOperation;
pub use registry::{OperationRegistry, ResolvedOperation};
pub use search_patient::SearchPatientOperation;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::schema::{Cardinality, Record, ValidatedRequest};

/// An executable operation bound to a name
#[async_trait]
pub trait Operation: Send + Sync {
    /// Operation name (matches the tool name advertised to the model)
    fn name(&self) -> &'static str;

    /// Whether the executor yields one record or a list
    fn cardinality(&self) -> Cardinality;

    /// Execute exactly once; no retries
    async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError>;
}

/// Output of an executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Single(Record),
    List(Vec<Record>),
}

impl OperationResult {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            OperationResult::Single(_) => Cardinality::Single,
            OperationResult::List(_) => Cardinality::List,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OperationResult::Single(_) => 1,
            OperationResult::List(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Canonical JSON form of a result under the declared cardinality
///
/// Single results become an object, list results an array of objects.
pub fn normalize(result: &OperationResult, cardinality: Cardinality) -> Result<Value, OperationError> {
    let value = match (cardinality, result) {
        (Cardinality::Single, OperationResult::Single(record)) => serde_json::to_value(record)?,
        (Cardinality::List, OperationResult::List(records)) => serde_json::to_value(records)?,
        (declared, other) => {
            return Err(OperationError::CardinalityMismatch {
                operation: format!("{:?} result", other.cardinality()),
                declared,
            });
        }
    };
    Ok(value)
}

/// Errors raised while resolving or executing an operation
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("No executor bound for operation: {0}")]
    MissingExecutor(String),

    #[error("Operation {operation} received a request for {received}")]
    RequestMismatch { operation: String, received: String },

    #[error("Operation {operation} does not match declared cardinality {declared:?}")]
    CardinalityMismatch { operation: String, declared: Cardinality },

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Could not serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl OperationError {
    pub(crate) fn request_mismatch(operation: &str, request: &ValidatedRequest) -> Self {
        OperationError::RequestMismatch {
            operation: operation.to_string(),
            received: request.operation().to_string(),
        }
    }
}
