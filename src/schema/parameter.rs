//! Structural parameter schemas advertised to the model
//!
//! A schema is pure data: field name, type, whether it is required and an
//! optional nested shape. It renders to JSON Schema for the model and performs
//! the structural half of argument validation.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::SchemaError;

/// Accepted date format for date fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Type of a single field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Boolean,
    Integer,
    /// ISO-8601 calendar date carried as a string
    Date,
    Object(ParameterSchema),
}

impl FieldType {
    fn expected(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Date => "date string (YYYY-MM-DD)",
            FieldType::Object(_) => "object",
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Date => json!({ "type": "string", "format": "date" }),
            FieldType::Object(nested) => nested.to_json_schema(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            required: false,
            ..Self::required(name, field_type)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered set of fields making up an operation's input
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSchema {
    pub fields: Vec<FieldSchema>,
}

impl ParameterSchema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Render as a JSON Schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = field.field_type.to_json_schema();
            if let (Some(desc), Some(obj)) = (&field.description, prop.as_object_mut()) {
                obj.insert("description".to_string(), json!(desc));
            }
            properties.insert(field.name.clone(), prop);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Check an argument object against the schema
    ///
    /// Unknown fields are ignored. A required field that is missing or null is
    /// an error; an optional field may be null.
    pub fn check(&self, args: &Map<String, Value>) -> Result<(), SchemaError> {
        self.check_at(args, "")
    }

    fn check_at(&self, args: &Map<String, Value>, prefix: &str) -> Result<(), SchemaError> {
        for field in &self.fields {
            let path = if prefix.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", prefix, field.name)
            };

            match args.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(SchemaError::MissingField { field: path });
                }
                None | Some(Value::Null) => {}
                Some(value) => check_value(&field.field_type, value, &path)?,
            }
        }
        Ok(())
    }
}

fn check_value(field_type: &FieldType, value: &Value, path: &str) -> Result<(), SchemaError> {
    let wrong_type = || SchemaError::WrongType {
        field: path.to_string(),
        expected: field_type.expected(),
    };

    match field_type {
        FieldType::String => value.as_str().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Boolean => value.as_bool().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Integer => value.as_i64().map(|_| ()).ok_or_else(wrong_type),
        FieldType::Date => {
            let raw = value.as_str().ok_or_else(wrong_type)?;
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(|_| ())
                .map_err(|_| SchemaError::InvalidDate {
                    field: path.to_string(),
                    value: raw.to_string(),
                })
        }
        FieldType::Object(nested) => {
            let obj = value.as_object().ok_or_else(wrong_type)?;
            nested.check_at(obj, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_schema() -> ParameterSchema {
        ParameterSchema::new(vec![
            FieldSchema::required("specialty", FieldType::String).with_description("Medical specialty"),
            FieldSchema::required("date_range_start", FieldType::Date),
            FieldSchema::required("date_range_end", FieldType::Date),
            FieldSchema::optional("max_results", FieldType::Integer),
        ])
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_to_json_schema() {
        let schema = slot_schema().to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["specialty"]["type"], "string");
        assert_eq!(schema["properties"]["specialty"]["description"], "Medical specialty");
        assert_eq!(schema["properties"]["date_range_start"]["format"], "date");
        assert_eq!(
            schema["required"],
            json!(["specialty", "date_range_start", "date_range_end"])
        );
    }

    #[test]
    fn test_check_accepts_valid_args() {
        let result = slot_schema().check(&args(json!({
            "specialty": "cardiology",
            "date_range_start": "2024-01-01",
            "date_range_end": "2024-01-07",
            "extra": "ignored"
        })));
        assert!(result.is_ok());
    }

    #[test]
    fn test_check_missing_required() {
        let err = slot_schema()
            .check(&args(json!({ "specialty": "cardiology", "date_range_start": "2024-01-01" })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { ref field } if field == "date_range_end"));
    }

    #[test]
    fn test_check_null_required_is_missing() {
        let err = slot_schema()
            .check(&args(json!({
                "specialty": null,
                "date_range_start": "2024-01-01",
                "date_range_end": "2024-01-07"
            })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { .. }));
    }

    #[test]
    fn test_check_wrong_type() {
        let err = slot_schema()
            .check(&args(json!({
                "specialty": 42,
                "date_range_start": "2024-01-01",
                "date_range_end": "2024-01-07"
            })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { ref field, .. } if field == "specialty"));
    }

    #[test]
    fn test_check_invalid_date() {
        let err = slot_schema()
            .check(&args(json!({
                "specialty": "cardiology",
                "date_range_start": "next week",
                "date_range_end": "2024-01-07"
            })))
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDate { ref value, .. } if value == "next week"));
    }

    #[test]
    fn test_check_optional_may_be_absent_or_null() {
        let schema = slot_schema();
        let base = json!({
            "specialty": "cardiology",
            "date_range_start": "2024-01-01",
            "date_range_end": "2024-01-07",
            "max_results": null
        });
        assert!(schema.check(&args(base)).is_ok());
    }

    #[test]
    fn test_check_nested_object() {
        let schema = ParameterSchema::new(vec![FieldSchema::required(
            "patient",
            FieldType::Object(ParameterSchema::new(vec![FieldSchema::required(
                "patient_id",
                FieldType::String,
            )])),
        )]);

        assert!(schema.check(&args(json!({ "patient": { "patient_id": "PAT-1" } }))).is_ok());

        let err = schema.check(&args(json!({ "patient": {} }))).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { ref field } if field == "patient.patient_id"));

        let nested = schema.to_json_schema();
        assert_eq!(nested["properties"]["patient"]["properties"]["patient_id"]["type"], "string");
    }
}
