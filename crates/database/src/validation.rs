//! Input validation for administrator-managed records.

use std::fmt;
use std::str::FromStr;

use cron::Schedule;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty value where one is required.
    Empty(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// A keyword alternative already belongs to another rule.
    DuplicateKeyword(String),
    /// A schedule expression that does not parse.
    InvalidSchedule { expression: String, reason: String },
    /// An entity id that is not `domain.object`.
    InvalidEntityId(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::DuplicateKeyword(keyword) => {
                write!(f, "keyword '{}' is already used by another rule", keyword)
            }
            ValidationError::InvalidSchedule { expression, reason } => {
                write!(f, "invalid schedule '{}': {}", expression, reason)
            }
            ValidationError::InvalidEntityId(id) => {
                write!(f, "invalid entity id '{}': expected domain.object", id)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for prompts and keyword payloads.
pub const MAX_TEXT_LENGTH: usize = 4000;

/// Maximum allowed length for names, nicknames and patterns.
pub const MAX_NAME_LENGTH: usize = 200;

/// Require a non-blank value no longer than `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Bring a cron expression into the six-field form (seconds first).
///
/// Five-field expressions get a `0` seconds field prepended. Anything else
/// is returned with whitespace collapsed.
pub fn normalize_cron(expression: &str) -> String {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

/// Normalize and parse a cron expression.
pub fn parse_schedule(expression: &str) -> Result<Schedule, ValidationError> {
    let normalized = normalize_cron(expression);
    if normalized.is_empty() {
        return Err(ValidationError::Empty("schedule".to_string()));
    }

    Schedule::from_str(&normalized).map_err(|e| ValidationError::InvalidSchedule {
        expression: expression.trim().to_string(),
        reason: e.to_string(),
    })
}

/// Validate a canonical entity id such as `light.living_room`.
pub fn validate_entity_id(entity_id: &str) -> Result<(), ValidationError> {
    let entity_id = entity_id.trim();

    if entity_id.is_empty() {
        return Err(ValidationError::Empty("entity_id".to_string()));
    }

    let valid_chars = entity_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');

    let well_formed = match entity_id.split_once('.') {
        Some((domain, object)) => !domain.is_empty() && !object.is_empty() && !object.ends_with('.'),
        None => false,
    };

    if !valid_chars || !well_formed {
        return Err(ValidationError::InvalidEntityId(entity_id.to_string()));
    }

    Ok(())
}
