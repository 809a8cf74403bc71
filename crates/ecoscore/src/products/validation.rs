use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::domain::{ProductSubmission, ScoreWeights};

const GENERAL_KEY: &str = "_schema";
const WEIGHT_KEYS: [&str; 3] = ["gwp", "circularity", "cost"];
const WEIGHT_TOLERANCE: f64 = 1e-6;
const KNOWN_FIELDS: [&str; 9] = [
    "product_name",
    "materials",
    "weight_grams",
    "transport",
    "packaging",
    "gwp",
    "cost",
    "circularity",
    "weights",
];

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const EMPTY: &str = "Field may not be empty.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_NUMBER: &str = "Not a valid number.";
const NOT_INTEGER: &str = "Not a valid integer.";
const NOT_LIST: &str = "Not a valid list.";
const NOT_MAPPING: &str = "Not a valid mapping type.";
const NOT_FINITE: &str = "Special numeric values (nan or infinity) are not permitted.";
const UNKNOWN_FIELD: &str = "Unknown field.";

pub const CIRCULARITY_RANGE: &str = "circularity must be between 0 and 100";
pub const WEIGHTS_INCOMPLETE: &str = "weights must include gwp, circularity, and cost";
pub const WEIGHTS_SUM: &str = "weights must sum to 1.0";

/// Field-level validation failures, keyed by field name.
///
/// Errors that do not belong to a single field are stored under `_schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_general(&mut self, message: impl Into<String>) {
        self.add(GENERAL_KEY, message);
    }

    pub fn single_general(message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add_general(message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn general(&self) -> Option<&[String]> {
        self.field(GENERAL_KEY)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid product payload")?;
        for (index, (field, messages)) in self.iter().enumerate() {
            let separator = if index == 0 { ": " } else { "; " };
            write!(f, "{separator}{field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a raw JSON payload into a [`ProductSubmission`].
///
/// Every rule is evaluated so the caller sees all failures at once. Nothing is
/// returned unless the whole payload is valid.
pub fn validate_product(payload: &Value) -> Result<ProductSubmission, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let Some(object) = payload.as_object() else {
        errors.add_general("Invalid input type.");
        return Err(errors);
    };

    for key in object.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            errors.add(key.clone(), UNKNOWN_FIELD);
        }
    }

    let product_name = required(object, "product_name", &mut errors, parse_name);
    let materials = required_materials(object, &mut errors);
    let weight_grams = optional(object, "weight_grams", &mut errors, parse_integer);
    let transport = optional(object, "transport", &mut errors, parse_string);
    let packaging = optional(object, "packaging", &mut errors, parse_string);
    let gwp = required(object, "gwp", &mut errors, parse_float);
    let cost = required(object, "cost", &mut errors, parse_float);
    let circularity = required(object, "circularity", &mut errors, parse_float);

    if let Some(value) = circularity {
        if !(0.0..=100.0).contains(&value) {
            errors.add("circularity", CIRCULARITY_RANGE);
        }
    }

    let weights = match object.get("weights") {
        None | Some(Value::Null) => None,
        Some(raw) => validate_weights(raw, &mut errors),
    };

    match (product_name, materials, gwp, cost, circularity) {
        (Some(product_name), Some(materials), Some(gwp), Some(cost), Some(circularity))
            if errors.is_empty() =>
        {
            Ok(ProductSubmission {
                product_name,
                materials,
                weight_grams,
                transport,
                packaging,
                gwp,
                cost,
                circularity,
                weights,
            })
        }
        _ => Err(errors),
    }
}

fn required<T>(
    object: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
    parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    match object.get(name) {
        None => {
            errors.add(name, MISSING);
            None
        }
        Some(Value::Null) => {
            errors.add(name, NULL);
            None
        }
        Some(value) => match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.add(name, message);
                None
            }
        },
    }
}

fn optional<T>(
    object: &Map<String, Value>,
    name: &str,
    errors: &mut ValidationErrors,
    parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    match object.get(name) {
        None | Some(Value::Null) => None,
        Some(value) => match parse(value) {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.add(name, message);
                None
            }
        },
    }
}

fn required_materials(
    object: &Map<String, Value>,
    errors: &mut ValidationErrors,
) -> Option<Vec<String>> {
    let items = match object.get("materials") {
        None => {
            errors.add("materials", MISSING);
            return None;
        }
        Some(Value::Null) => {
            errors.add("materials", NULL);
            return None;
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.add("materials", NOT_LIST);
            return None;
        }
    };

    let mut materials = Vec::with_capacity(items.len());
    let mut valid = true;
    for (index, item) in items.iter().enumerate() {
        match scalar_text(item) {
            Some(text) => materials.push(text),
            None => {
                errors.add("materials", format!("Item {index}: {NOT_STRING}"));
                valid = false;
            }
        }
    }

    valid.then_some(materials)
}

fn validate_weights(raw: &Value, errors: &mut ValidationErrors) -> Option<ScoreWeights> {
    let Some(map) = raw.as_object() else {
        errors.add("weights", NOT_MAPPING);
        return None;
    };

    let mut parsed = BTreeMap::new();
    let mut valid = true;
    for (key, value) in map {
        match parse_float(value) {
            Ok(weight) => {
                parsed.insert(key.as_str(), weight);
            }
            Err(message) => {
                errors.add("weights", format!("{key}: {message}"));
                valid = false;
            }
        }
    }
    if !valid {
        return None;
    }

    let (Some(&gwp), Some(&circularity), Some(&cost)) = (
        parsed.get(WEIGHT_KEYS[0]),
        parsed.get(WEIGHT_KEYS[1]),
        parsed.get(WEIGHT_KEYS[2]),
    ) else {
        errors.add_general(WEIGHTS_INCOMPLETE);
        return None;
    };

    let weights = ScoreWeights {
        gwp,
        circularity,
        cost,
    };
    if (weights.total() - 1.0).abs() > WEIGHT_TOLERANCE {
        errors.add_general(WEIGHTS_SUM);
        return None;
    }

    Some(weights)
}

fn parse_name(value: &Value) -> Result<String, &'static str> {
    let name = parse_string(value)?;
    if name.trim().is_empty() {
        return Err(EMPTY);
    }
    Ok(name)
}

fn parse_string(value: &Value) -> Result<String, &'static str> {
    value.as_str().map(str::to_string).ok_or(NOT_STRING)
}

fn parse_float(value: &Value) -> Result<f64, &'static str> {
    let number = match value {
        Value::Number(number) => number.as_f64().ok_or(NOT_NUMBER)?,
        Value::String(raw) => raw.trim().parse::<f64>().map_err(|_| NOT_NUMBER)?,
        _ => return Err(NOT_NUMBER),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(NOT_FINITE)
    }
}

fn parse_integer(value: &Value) -> Result<i64, &'static str> {
    match value {
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                return Ok(integer);
            }
            match number.as_f64() {
                Some(float)
                    if float.fract() == 0.0
                        && float >= i64::MIN as f64
                        && float <= i64::MAX as f64 =>
                {
                    Ok(float as i64)
                }
                _ => Err(NOT_INTEGER),
            }
        }
        Value::String(raw) => raw.trim().parse::<i64>().map_err(|_| NOT_INTEGER),
        _ => Err(NOT_INTEGER),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
