//! Error types for forms.

use std::collections::BTreeMap;
use thiserror::Error;

/// Form-specific errors.
#[derive(Debug, Error)]
pub enum FormError {
    /// Validation failed with errors.
    #[error("validation errors: {0}")]
    ValidationErrors(ValidationErrors),

    /// A rule string names a validator that does not exist.
    #[error("validator {0} does not exist")]
    UnknownValidator(String),

    /// The validator needs a parameter and none was given.
    #[error("validator {0} requires a parameter")]
    MissingParameter(String),

    /// The validator takes no parameter but one was given.
    #[error("validator {validator} does not take a parameter, {parameter:?} provided")]
    UnexpectedParameter { validator: String, parameter: String },

    /// Invalid parameter value.
    #[error("invalid parameter {parameter:?} for validator {validator}: {message}")]
    InvalidParameter {
        validator: String,
        parameter: String,
        message: String,
    },

    /// A length limit below 1.
    #[error("{0} length cannot be lesser than 1")]
    InvalidLimit(&'static str),

    /// Invalid regular expression.
    #[error("invalid regex: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Validation error codes by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Error codes keyed by field name.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates a new empty ValidationErrors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error for a field.
    pub fn add(&mut self, field: &str, code: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(code.into());
    }

    /// Returns whether there are any errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns errors for a specific field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Returns all errors as a flat list, ordered by field.
    pub fn all_errors(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .flat_map(|(field, codes)| codes.iter().map(move |code| (field.as_str(), code.as_str())))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let all = self.all_errors();
        for (i, (field, code)) in all.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {code}")?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        Self::ValidationErrors(errors)
    }
}

/// Result type alias for form operations.
pub type Result<T> = std::result::Result<T, FormError>;
