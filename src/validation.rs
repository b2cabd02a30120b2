//! Field-level validation helpers shared by the request schemas.
//!
//! Request DTOs derive `validator::Validate`; the custom rules below cover the
//! checks `validator` has no built-in for (enum membership, ISO dates, UUIDs,
//! numeric query strings). `collect_field_errors` flattens a failed validation
//! into one `{field, message}` entry per invalid field, and `from_json_body`
//! reports wrong-typed JSON values the same way.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::models::{Role, SortField, SortOrder, TaskPriority, TaskStatus};

pub const MAX_PAGE_SIZE: i64 = 100;

/// A single invalid field, as reported to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Flattens `ValidationErrors` into one entry per invalid field, sorted by field name.
///
/// When a field breaks several rules, the first reported rule wins.
pub fn collect_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut collected: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, field_errors)| {
            let field = to_camel_case(field);
            field_errors.first().map(|error| FieldError {
                message: describe(&field, error),
                field,
            })
        })
        .collect();
    collected.sort_by(|a, b| a.field.cmp(&b.field));
    collected
}

fn describe(field: &str, error: &ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }

    match error.code.as_ref() {
        "required" => format!("\"{}\" is required", field),
        "length" => match error.params.get("min").and_then(|min| min.as_u64()) {
            Some(min) if min > 1 => format!(
                "\"{}\" length must be at least {} characters long",
                field, min
            ),
            _ => format!("\"{}\" is not allowed to be empty", field),
        },
        "email" => format!("\"{}\" must be a valid email", field),
        "iso_date" => format!("\"{}\" must be a valid ISO date", field),
        "uuid" => format!("\"{}\" must be a valid GUID", field),
        "role" => one_of(field, Role::ALL.iter().map(|r| r.as_str())),
        "priority" => one_of(field, TaskPriority::ALL.iter().map(|p| p.as_str())),
        "status" => one_of(field, TaskStatus::ALL.iter().map(|s| s.as_str())),
        "sort_by" => one_of(field, SortField::ALL.iter().map(|s| s.as_str())),
        "order" => one_of(field, SortOrder::ALL.iter().map(|o| o.as_str())),
        _ => format!("\"{}\" is invalid", field),
    }
}

fn one_of<'a>(field: &str, allowed: impl Iterator<Item = &'a str>) -> String {
    format!(
        "\"{}\" must be one of [{}]",
        field,
        allowed.collect::<Vec<_>>().join(", ")
    )
}

fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn invalid(code: &'static str) -> ValidationError {
    ValidationError::new(code)
}

fn invalid_with(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn single_error(field: &str, message: String) -> AppError {
    AppError::Validation(vec![FieldError {
        field: field.to_string(),
        message,
    }])
}

/// JSON type a body field must have when it is present and not `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    Boolean,
}

impl JsonKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            JsonKind::String => value.is_string(),
            JsonKind::Boolean => value.is_boolean(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            JsonKind::String => "string",
            JsonKind::Boolean => "boolean",
        }
    }
}

/// The JSON type of every field of a request body.
pub trait BodySchema {
    const FIELDS: &'static [(&'static str, JsonKind)];
}

/// Deserializes a JSON body into `T`, reporting wrong-typed values per field.
///
/// Values of the wrong JSON type are removed before deserializing. If any
/// were found, `T` is validated as well and the type errors are merged with
/// the rule failures of the remaining fields.
pub fn from_json_body<T>(body: Value) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate + BodySchema,
{
    let Value::Object(mut fields) = body else {
        return Err(single_error(
            "body",
            "\"body\" must be of type object".to_string(),
        ));
    };

    let mut errors = Vec::new();
    for (name, kind) in T::FIELDS {
        let mistyped = match fields.get(*name) {
            None | Some(Value::Null) => false,
            Some(value) => !kind.matches(value),
        };
        if mistyped {
            fields.remove(*name);
            errors.push(FieldError {
                field: name.to_string(),
                message: format!("\"{}\" must be a {}", name, kind.name()),
            });
        }
    }

    let request: T = serde_json::from_value(Value::Object(fields)).map_err(|e| {
        log::debug!("Request body rejected: {}", e);
        single_error("body", "\"body\" is invalid".to_string())
    })?;
    if errors.is_empty() {
        return Ok(request);
    }

    if let Err(rule_errors) = request.validate() {
        let mistyped: Vec<String> = errors.iter().map(|e| e.field.clone()).collect();
        errors.extend(
            collect_field_errors(&rule_errors)
                .into_iter()
                .filter(|e| !mistyped.contains(&e.field)),
        );
    }
    errors.sort_by(|a, b| a.field.cmp(&b.field));
    Err(AppError::Validation(errors))
}

/// Unwraps a field a schema has already marked `required`.
pub fn required_field<T>(field: &str, value: Option<T>) -> Result<T, AppError> {
    value.ok_or_else(|| single_error(field, format!("\"{}\" is required", field)))
}

/// Parses a field a schema has already checked.
pub fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, AppError> {
    value
        .parse()
        .map_err(|_| single_error(field, format!("\"{}\" is invalid", field)))
}

pub fn parse_iso_field(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    parse_iso_date(value)
        .ok_or_else(|| single_error(field, format!("\"{}\" must be a valid ISO date", field)))
}

/// Parses an ISO 8601 date or date-time. Naive values are taken as UTC.
pub fn parse_iso_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn validate_role(value: &str) -> Result<(), ValidationError> {
    value.parse::<Role>().map(|_| ()).map_err(|_| invalid("role"))
}

pub fn validate_priority(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskPriority>()
        .map(|_| ())
        .map_err(|_| invalid("priority"))
}

pub fn validate_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<TaskStatus>()
        .map(|_| ())
        .map_err(|_| invalid("status"))
}

pub fn validate_sort_by(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<SortField>()
        .map(|_| ())
        .map_err(|_| invalid("sort_by"))
}

pub fn validate_order(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<SortOrder>()
        .map(|_| ())
        .map_err(|_| invalid("order"))
}

pub fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value).map(|_| ()).ok_or_else(|| invalid("iso_date"))
}

pub fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value).map(|_| ()).map_err(|_| invalid("uuid"))
}

pub fn validate_limit(value: &str) -> Result<(), ValidationError> {
    match value.parse::<i64>() {
        Err(_) => Err(invalid_with("number", "\"limit\" must be a number")),
        Ok(limit) if limit < 1 => Err(invalid_with(
            "min",
            "\"limit\" must be greater than or equal to 1",
        )),
        Ok(limit) if limit > MAX_PAGE_SIZE => Err(invalid_with(
            "max",
            "\"limit\" must be less than or equal to 100",
        )),
        Ok(_) => Ok(()),
    }
}

pub fn validate_offset(value: &str) -> Result<(), ValidationError> {
    match value.parse::<i64>() {
        Err(_) => Err(invalid_with("number", "\"offset\" must be a number")),
        Ok(offset) if offset < 0 => Err(invalid_with(
            "min",
            "\"offset\" must be greater than or equal to 0",
        )),
        Ok(_) => Ok(()),
    }
}
