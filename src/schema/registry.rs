//! Schema registry - operation descriptors and argument coercion

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SchemaError;
use super::parameter::{FieldSchema, FieldType, ParameterSchema};
use super::records::{
    AppointmentSlotRequest, BookAppointmentRequest, InsuranceEligibilityRequest, PatientSearchRequest,
};
use crate::llm::ToolDefinition;

/// Operation name constants
pub mod operation_names {
    pub const SEARCH_PATIENT: &str = "search_patient";
    pub const CHECK_INSURANCE_ELIGIBILITY: &str = "check_insurance_eligibility";
    pub const FIND_AVAILABLE_SLOTS: &str = "find_available_slots";
    pub const BOOK_APPOINTMENT: &str = "book_appointment";
}

/// Whether an operation returns one record or an ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    List,
}

/// Arguments coerced into an operation's typed request
///
/// Only produced by a successful coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidatedRequest {
    SearchPatient(PatientSearchRequest),
    CheckInsuranceEligibility(InsuranceEligibilityRequest),
    FindAvailableSlots(AppointmentSlotRequest),
    BookAppointment(BookAppointmentRequest),
}

impl ValidatedRequest {
    /// Name of the operation this request targets
    pub fn operation(&self) -> &'static str {
        match self {
            ValidatedRequest::SearchPatient(_) => operation_names::SEARCH_PATIENT,
            ValidatedRequest::CheckInsuranceEligibility(_) => operation_names::CHECK_INSURANCE_ELIGIBILITY,
            ValidatedRequest::FindAvailableSlots(_) => operation_names::FIND_AVAILABLE_SLOTS,
            ValidatedRequest::BookAppointment(_) => operation_names::BOOK_APPOINTMENT,
        }
    }
}

/// Typed deserialization step for one request type
pub type Coercer = fn(Value) -> Result<ValidatedRequest, serde_json::Error>;

/// Immutable description of one operation
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: ParameterSchema,
    pub cardinality: Cardinality,
    /// Success of this operation ends the workflow
    pub terminal: bool,
    coerce: Coercer,
}

impl OperationDescriptor {
    pub fn new(
        name: &'static str,
        description: &'static str,
        schema: ParameterSchema,
        cardinality: Cardinality,
        coerce: Coercer,
    ) -> Self {
        Self {
            name,
            description,
            schema,
            cardinality,
            terminal: false,
            coerce,
        }
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Tool definition advertised to the model
    pub fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name, self.description, self.schema.to_json_schema())
    }

    /// Structural check followed by typed deserialization
    pub fn coerce(&self, args: &Map<String, Value>) -> Result<ValidatedRequest, SchemaError> {
        self.schema.check(args)?;
        (self.coerce)(Value::Object(args.clone())).map_err(SchemaError::Deserialize)
    }
}

/// Read-only registry of operation descriptors, built once at start-up
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    descriptors: Vec<OperationDescriptor>,
}

impl SchemaRegistry {
    /// Build a registry from descriptors; names must be unique
    pub fn new(descriptors: Vec<OperationDescriptor>) -> Result<Self, SchemaError> {
        for (i, d) in descriptors.iter().enumerate() {
            if descriptors[..i].iter().any(|prev| prev.name == d.name) {
                return Err(SchemaError::DuplicateOperation(d.name.to_string()));
            }
        }
        Ok(Self { descriptors })
    }

    /// The four clinic workflow operations
    pub fn standard() -> Self {
        use operation_names::*;

        Self {
            descriptors: vec![
                OperationDescriptor::new(
                    SEARCH_PATIENT,
                    "Search for a patient by name",
                    ParameterSchema::new(vec![
                        FieldSchema::required("name", FieldType::String).with_description("Patient full name"),
                    ]),
                    Cardinality::Single,
                    |v| serde_json::from_value(v).map(ValidatedRequest::SearchPatient),
                ),
                OperationDescriptor::new(
                    CHECK_INSURANCE_ELIGIBILITY,
                    "Check insurance eligibility for a patient",
                    ParameterSchema::new(vec![
                        FieldSchema::required("patient_id", FieldType::String)
                            .with_description("Identifier returned by search_patient"),
                    ]),
                    Cardinality::Single,
                    |v| serde_json::from_value(v).map(ValidatedRequest::CheckInsuranceEligibility),
                ),
                OperationDescriptor::new(
                    FIND_AVAILABLE_SLOTS,
                    "Find available appointment slots",
                    ParameterSchema::new(vec![
                        FieldSchema::required("specialty", FieldType::String),
                        FieldSchema::required("date_range_start", FieldType::Date),
                        FieldSchema::required("date_range_end", FieldType::Date),
                    ]),
                    Cardinality::List,
                    |v| serde_json::from_value(v).map(ValidatedRequest::FindAvailableSlots),
                ),
                OperationDescriptor::new(
                    BOOK_APPOINTMENT,
                    "Book an appointment",
                    ParameterSchema::new(vec![
                        FieldSchema::required("patient_id", FieldType::String),
                        FieldSchema::required("slot_id", FieldType::String),
                        FieldSchema::required("specialty", FieldType::String),
                    ]),
                    Cardinality::Single,
                    |v| serde_json::from_value(v).map(ValidatedRequest::BookAppointment),
                )
                .terminal(),
            ],
        }
    }

    /// Parameter schema for an operation
    pub fn describe(&self, name: &str) -> Result<&ParameterSchema, SchemaError> {
        self.descriptor(name).map(|d| &d.schema)
    }

    pub fn descriptor(&self, name: &str) -> Result<&OperationDescriptor, SchemaError> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| SchemaError::UnknownOperation(name.to_string()))
    }

    pub fn descriptors(&self) -> &[OperationDescriptor] {
        &self.descriptors
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptors.iter().any(|d| d.name == name)
    }

    /// Coerce raw arguments into the named operation's request type
    pub fn coerce(&self, name: &str, args: &Map<String, Value>) -> Result<ValidatedRequest, SchemaError> {
        self.descriptor(name)?.coerce(args)
    }

    /// Tool definitions for every registered operation, in registration order
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.descriptors.iter().map(|d| d.tool_definition()).collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
