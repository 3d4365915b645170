//! Request validation
//!
//! Turns an untyped JSON body into a [`Sample`] or a list of field-level
//! violations. Nothing here touches the model.

use crate::dataset::FEATURE_NAMES;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Four measurements in centimeters, all non-negative
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

/// What was wrong with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    NotNumeric,
    NotFinite,
    Negative,
    InvalidBody,
}

/// A single validation failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// Violation for a body that could not be read as a JSON object at all
    pub fn body(message: impl Into<String>) -> Self {
        Self::new("body", ViolationKind::InvalidBody, message)
    }
}

impl Sample {
    /// Build a sample from measurements in feature order, checking each value
    pub fn new(
        sepal_length: f64,
        sepal_width: f64,
        petal_length: f64,
        petal_width: f64,
    ) -> Result<Self, Vec<FieldViolation>> {
        let values = [sepal_length, sepal_width, petal_length, petal_width];
        let violations: Vec<FieldViolation> = FEATURE_NAMES
            .iter()
            .zip(values)
            .filter_map(|(name, v)| check_measurement(name, v).err())
            .collect();

        if violations.is_empty() {
            Ok(Self::from_values(values))
        } else {
            Err(violations)
        }
    }

    fn from_values(values: [f64; 4]) -> Self {
        Self {
            sepal_length: values[0],
            sepal_width: values[1],
            petal_length: values[2],
            petal_width: values[3],
        }
    }

    /// Measurements in feature order
    pub fn to_array(&self) -> [f64; 4] {
        [self.sepal_length, self.sepal_width, self.petal_length, self.petal_width]
    }

    /// Single-row feature matrix for the model
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, FEATURE_NAMES.len()), |(_, j)| self.to_array()[j])
    }
}

fn check_measurement(field: &str, value: f64) -> Result<f64, FieldViolation> {
    if !value.is_finite() {
        return Err(FieldViolation::new(
            field,
            ViolationKind::NotFinite,
            "value must be a finite number",
        ));
    }
    if value < 0.0 {
        return Err(FieldViolation::new(
            field,
            ViolationKind::Negative,
            "ensure this value is greater than or equal to 0",
        ));
    }
    Ok(value)
}

/// Validate a prediction request body.
///
/// Every feature field is checked and all violations are returned together.
/// Unknown fields are ignored. Strings holding a number (`"5.1"`) are parsed
/// and checked like numbers.
pub fn validate_request(body: &Value) -> Result<Sample, Vec<FieldViolation>> {
    let object = match body.as_object() {
        Some(object) => object,
        None => return Err(vec![FieldViolation::body("request body must be a JSON object")]),
    };

    let mut values = [0.0; 4];
    let mut violations = Vec::new();

    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        let checked = match object.get(name) {
            None | Some(Value::Null) => Err(FieldViolation::new(
                name,
                ViolationKind::Missing,
                "field required",
            )),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) => check_measurement(name, v),
                None => Err(FieldViolation::new(
                    name,
                    ViolationKind::NotNumeric,
                    "value is not a valid float",
                )),
            },
            Some(Value::String(text)) => match text.trim().parse::<f64>() {
                Ok(v) => check_measurement(name, v),
                Err(_) => Err(FieldViolation::new(
                    name,
                    ViolationKind::NotNumeric,
                    "value is not a valid float",
                )),
            },
            Some(_) => Err(FieldViolation::new(
                name,
                ViolationKind::NotNumeric,
                "value is not a valid float",
            )),
        };

        match checked {
            Ok(v) => *slot = v,
            Err(violation) => violations.push(violation),
        }
    }

    if violations.is_empty() {
        Ok(Sample::from_values(values))
    } else {
        Err(violations)
    }
}
