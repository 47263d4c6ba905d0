//! Field-level validation of recipe payloads.
//!
//! Each field's constraint is a row in [`RULES`]; [`validate`] walks the table
//! and collects every violation instead of stopping at the first one. The same
//! table serves creation (required fields enforced) and partial updates (only
//! fields present in the payload are checked).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{Level, NewRecipe, RecipePatch};

/// Field name to human-readable message, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        f.write_str(&parts.join("; "))
    }
}

/// Whether required fields must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

/// A constraint on a single field value.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// String that is not blank after trimming
    NonEmptyString { message: &'static str },
    /// String drawn from a fixed set
    OneOf {
        allowed: &'static [&'static str],
        label: &'static str,
    },
    StringArray { message: &'static str },
    String { message: &'static str },
    /// Finite number that is not negative
    NonNegativeNumber {
        type_message: &'static str,
        range_message: &'static str,
    },
    Boolean { message: &'static str },
    Timestamp { message: &'static str },
}

impl Check {
    fn check(&self, value: &Value) -> Result<(), String> {
        match *self {
            Check::NonEmptyString { message } => match value.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(()),
                _ => Err(message.to_string()),
            },
            Check::OneOf { allowed, label } => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err(format!("{} must be one of: {}", label, allowed.join(", "))),
            },
            Check::StringArray { message } => match value.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(()),
                _ => Err(message.to_string()),
            },
            Check::String { message } => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
            Check::NonNegativeNumber {
                type_message,
                range_message,
            } => match value.as_f64() {
                Some(n) if !n.is_finite() => Err(type_message.to_string()),
                Some(n) if n < 0.0 => Err(range_message.to_string()),
                Some(_) => Ok(()),
                None => Err(type_message.to_string()),
            },
            Check::Boolean { message } => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(message.to_string())
                }
            }
            Check::Timestamp { message } => parse_timestamp(value)
                .map(|_| ())
                .ok_or_else(|| message.to_string()),
        }
    }
}

/// Constraint for one recipe field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    /// Message reported when the field is absent; `None` for optional fields
    pub required: Option<&'static str>,
    pub check: Check,
}

pub const RULES: &[FieldRule] = &[
    FieldRule {
        field: "title",
        required: Some("Title is required"),
        check: Check::NonEmptyString {
            message: "Title is required",
        },
    },
    FieldRule {
        field: "instructions",
        required: Some("Instructions are required"),
        check: Check::NonEmptyString {
            message: "Instructions are required",
        },
    },
    FieldRule {
        field: "level",
        required: None,
        check: Check::OneOf {
            allowed: Level::ALLOWED,
            label: "Level",
        },
    },
    FieldRule {
        field: "ingredients",
        required: None,
        check: Check::StringArray {
            message: "Ingredients must be an array of strings",
        },
    },
    FieldRule {
        field: "image",
        required: None,
        check: Check::String {
            message: "Image must be a string",
        },
    },
    FieldRule {
        field: "duration",
        required: None,
        check: Check::NonNegativeNumber {
            type_message: "Duration must be a number",
            range_message: "Duration must be greater than or equal to 0",
        },
    },
    FieldRule {
        field: "isArchived",
        required: None,
        check: Check::Boolean {
            message: "isArchived must be a boolean",
        },
    },
    FieldRule {
        field: "created",
        required: None,
        check: Check::Timestamp {
            message: "Created must be a valid date",
        },
    },
];

/// Look up a field, treating JSON `null` as absent.
fn field<'a>(payload: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    payload.get(name).filter(|v| !v.is_null())
}

/// Check `payload` against [`RULES`], returning every violation.
///
/// A payload that is not a JSON object is treated as an empty object.
pub fn validate(payload: &Value, mode: Mode) -> FieldErrors {
    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);
    let mut errors = FieldErrors::new();

    for rule in RULES {
        match field(object, rule.field) {
            Some(value) => {
                if let Err(message) = rule.check.check(value) {
                    errors.insert(rule.field, message);
                }
            }
            None => {
                if let (Some(message), Mode::Create) = (rule.required, mode) {
                    errors.insert(rule.field, message);
                }
            }
        }
    }

    errors
}

/// Validate a create payload and build the typed record.
pub fn validate_new(payload: &Value) -> Result<NewRecipe, FieldErrors> {
    let errors = validate(payload, Mode::Create);
    if !errors.is_empty() {
        return Err(errors);
    }
    let patch = extract(payload);
    Ok(NewRecipe {
        title: patch.title.unwrap_or_default(),
        instructions: patch.instructions.unwrap_or_default(),
        level: patch.level,
        ingredients: patch.ingredients.unwrap_or_default(),
        image: patch.image,
        duration: patch.duration,
        is_archived: patch.is_archived,
        created: patch.created,
    })
}

/// Validate an update payload and build the typed patch.
pub fn validate_patch(payload: &Value) -> Result<RecipePatch, FieldErrors> {
    let errors = validate(payload, Mode::Update);
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(extract(payload))
}

/// Pull the known fields out of an already validated payload.
fn extract(payload: &Value) -> RecipePatch {
    let empty = Map::new();
    let object = payload.as_object().unwrap_or(&empty);
    let string = |name: &str| field(object, name).and_then(Value::as_str).map(str::to_string);

    RecipePatch {
        title: string("title"),
        instructions: string("instructions"),
        level: field(object, "level")
            .and_then(Value::as_str)
            .and_then(Level::from_name),
        ingredients: field(object, "ingredients")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
        image: string("image"),
        duration: field(object, "duration").and_then(Value::as_f64),
        is_archived: field(object, "isArchived").and_then(Value::as_bool),
        created: field(object, "created").and_then(parse_timestamp),
    }
}

/// Parse a timestamp given as a date string or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })?;
            DateTime::from_timestamp_millis(millis)
        }
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_minimal_payload() {
        let errors = validate(&json!({"title": "Tacos", "instructions": "Cook it"}), Mode::Create);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_title() {
        let errors = validate(&json!({"instructions": "Cook it"}), Mode::Create);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("title"), Some("Title is required"));
    }

    #[test]
    fn test_blank_and_non_string_title() {
        let blank = validate(&json!({"title": "   ", "instructions": "x"}), Mode::Create);
        assert_eq!(blank.get("title"), Some("Title is required"));

        let number = validate(&json!({"title": 7, "instructions": "x"}), Mode::Create);
        assert_eq!(number.get("title"), Some("Title is required"));
    }

    #[test]
    fn test_collects_every_violation() {
        let errors = validate(
            &json!({
                "level": "Master Chef",
                "ingredients": ["salt", 3],
                "image": false,
                "duration": -1,
                "isArchived": "no",
                "created": "yesterday-ish"
            }),
            Mode::Create,
        );
        assert_eq!(errors.len(), 8);
        assert_eq!(errors.get("instructions"), Some("Instructions are required"));
        assert_eq!(
            errors.get("level"),
            Some("Level must be one of: Easy Peasy, Amateur Chef, UltraPro Chef")
        );
        assert_eq!(
            errors.get("ingredients"),
            Some("Ingredients must be an array of strings")
        );
        assert_eq!(errors.get("image"), Some("Image must be a string"));
        assert_eq!(
            errors.get("duration"),
            Some("Duration must be greater than or equal to 0")
        );
        assert_eq!(errors.get("isArchived"), Some("isArchived must be a boolean"));
        assert_eq!(errors.get("created"), Some("Created must be a valid date"));
    }

    #[test]
    fn test_duration_type_and_range_messages_differ() {
        let wrong_type = validate(
            &json!({"title": "a", "instructions": "b", "duration": "ten"}),
            Mode::Create,
        );
        assert_eq!(wrong_type.get("duration"), Some("Duration must be a number"));

        let zero = validate(
            &json!({"title": "a", "instructions": "b", "duration": 0}),
            Mode::Create,
        );
        assert!(zero.is_empty());
    }

    #[test]
    fn test_null_optional_fields_are_absent() {
        let errors = validate(
            &json!({"title": "a", "instructions": "b", "level": null, "duration": null}),
            Mode::Create,
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_non_object_payload_reports_required_fields() {
        let errors = validate(&json!(["title"]), Mode::Create);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_update_mode_checks_present_fields_only() {
        assert!(validate(&json!({"duration": 42}), Mode::Update).is_empty());

        let errors = validate(&json!({"title": "", "duration": -3}), Mode::Update);
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert!(errors.get("duration").is_some());
        assert!(errors.get("instructions").is_none());
    }

    #[test]
    fn test_validate_new_builds_record() {
        let recipe = validate_new(&json!({
            "title": "Tacos",
            "instructions": "Cook it",
            "level": "Easy Peasy",
            "ingredients": ["tortilla", "beef"],
            "duration": 25,
            "isArchived": false,
            "created": "2024-05-01"
        }))
        .unwrap();
        assert_eq!(recipe.title, "Tacos");
        assert_eq!(recipe.level, Some(Level::EasyPeasy));
        assert_eq!(recipe.ingredients, vec!["tortilla", "beef"]);
        assert_eq!(recipe.duration, Some(25.0));
        assert_eq!(recipe.is_archived, Some(false));
        assert_eq!(
            recipe.created.unwrap().to_rfc3339(),
            "2024-05-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_validate_patch_ignores_unknown_fields() {
        let patch = validate_patch(&json!({"duration": 42, "chef": "me"})).unwrap();
        assert_eq!(patch.duration, Some(42.0));
        assert!(patch.title.is_none());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp(&json!("2024-05-01T10:00:00Z")).is_some());
        assert!(parse_timestamp(&json!("2024-05-01T10:00:00.123+02:00")).is_some());
        assert!(parse_timestamp(&json!("Wed, 01 May 2024 10:00:00 +0000")).is_some());
        assert!(parse_timestamp(&json!("2024-05-01T10:00:00")).is_some());
        assert!(parse_timestamp(&json!(1714557600000i64)).is_some());
        assert!(parse_timestamp(&json!("2024-13-40")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_field_errors_serialize_as_object() {
        let errors = FieldErrors::single("title", "Title is required");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"title": "Title is required"})
        );
    }
}
