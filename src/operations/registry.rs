//! Operation registry - binds operation names to executors

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    BookAppointmentOperation, CheckEligibilityOperation, ClinicBackend, FindSlotsOperation, Operation,
    OperationError, OperationResult, SearchPatientOperation,
};
use crate::schema::{Cardinality, SchemaRegistry, ValidatedRequest};

/// A resolved operation: its executor and declared cardinality
pub struct ResolvedOperation<'a> {
    operation: &'a dyn Operation,
    pub cardinality: Cardinality,
}

impl ResolvedOperation<'_> {
    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    /// Run the executor once and check the result against the declared cardinality
    pub async fn execute(&self, request: ValidatedRequest) -> Result<OperationResult, OperationError> {
        let result = self.operation.execute(request).await?;
        if result.cardinality() != self.cardinality {
            return Err(OperationError::CardinalityMismatch {
                operation: self.name().to_string(),
                declared: self.cardinality,
            });
        }
        Ok(result)
    }
}

/// Read-only map from operation name to executor, built once at start-up
pub struct OperationRegistry {
    operations: HashMap<&'static str, Box<dyn Operation>>,
}

impl OperationRegistry {
    /// Bind the four clinic operations to `backend`
    pub fn standard(backend: Arc<dyn ClinicBackend>) -> Self {
        let mut operations: HashMap<&'static str, Box<dyn Operation>> = HashMap::new();

        let ops: Vec<Box<dyn Operation>> = vec![
            Box::new(SearchPatientOperation::new(backend.clone())),
            Box::new(CheckEligibilityOperation::new(backend.clone())),
            Box::new(FindSlotsOperation::new(backend.clone())),
            Box::new(BookAppointmentOperation::new(backend)),
        ];
        for op in ops {
            operations.insert(op.name(), op);
        }

        Self { operations }
    }

    /// Bind custom operations, checking them against the schema registry
    ///
    /// Every schema must have exactly one executor with the same cardinality.
    pub fn bind(schemas: &SchemaRegistry, ops: Vec<Box<dyn Operation>>) -> Result<Self, OperationError> {
        let mut operations: HashMap<&'static str, Box<dyn Operation>> = HashMap::new();

        for op in ops {
            let descriptor = schemas
                .descriptor(op.name())
                .map_err(|_| OperationError::UnknownOperation(op.name().to_string()))?;
            if descriptor.cardinality != op.cardinality() {
                return Err(OperationError::CardinalityMismatch {
                    operation: op.name().to_string(),
                    declared: descriptor.cardinality,
                });
            }
            operations.insert(op.name(), op);
        }

        if let Some(missing) = schemas
            .descriptors()
            .iter()
            .find(|d| !operations.contains_key(d.name))
        {
            return Err(OperationError::MissingExecutor(missing.name.to_string()));
        }

        Ok(Self { operations })
    }

    /// Look up the executor for an operation
    pub fn resolve(&self, name: &str) -> Result<ResolvedOperation<'_>, OperationError> {
        let operation = self
            .operations
            .get(name)
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string()))?;

        Ok(ResolvedOperation {
            operation: operation.as_ref(),
            cardinality: operation.cardinality(),
        })
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
