//! Schema registry for the clinic operations
//!
//! Declares the typed request/response records for each operation, the
//! structural parameter schemas advertised to the model, and the coercion of
//! raw tool arguments into typed requests.

mod parameter;
mod records;
mod registry;

pub use parameter::{DATE_FORMAT, FieldSchema, FieldType, ParameterSchema};
pub use records::{
    AppointmentConfirmation, AppointmentSlot, AppointmentSlotRequest, BookAppointmentRequest,
    InsuranceEligibilityRequest, InsuranceEligibilityResponse, Patient, PatientSearchRequest, Record,
};
pub use registry::{Cardinality, Coercer, OperationDescriptor, SchemaRegistry, ValidatedRequest, operation_names};

/// Errors raised while describing or coercing operation arguments
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Duplicate operation: {0}")]
    DuplicateOperation(String),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} must be a {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("Field {field} is not a valid date: {value}")]
    InvalidDate { field: String, value: String },

    #[error("Could not build request: {0}")]
    Deserialize(#[source] serde_json::Error),
}
