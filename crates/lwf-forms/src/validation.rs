//! Field validators.
//!
//! A validator checks one value and reports failure with a short error code
//! such as `"NotEmpty"` or `"Digits"`, which callers map to messages.

use std::fmt::Debug;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{FormError, Result};

/// A submitted value.
///
/// Multi-valued fields, such as a group of checkboxes, and rules spanning
/// several fields carry a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Every value, in order. A single value yields one item.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// The value of a single-valued field.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multiple(_) => None,
        }
    }

    /// Whitespace-only strings and empty lists are blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Single(value) => value.trim().is_empty(),
            Self::Multiple(values) => values.is_empty(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// Trait for field validators.
pub trait Validator: Send + Sync + Debug {
    /// Validates a value and returns the error code if invalid.
    fn validate(&self, value: &str) -> std::result::Result<(), String>;

    /// Returns the error code for this validator.
    fn code(&self) -> &str;

    /// Validates a submitted value. Single-value validators reject lists.
    fn validate_value(&self, value: &FieldValue) -> std::result::Result<(), String> {
        match value {
            FieldValue::Single(value) => self.validate(value),
            FieldValue::Multiple(_) => Err(self.code().to_string()),
        }
    }
}

fn check(valid: bool, code: &str) -> std::result::Result<(), String> {
    if valid {
        Ok(())
    } else {
        Err(code.to_string())
    }
}

static MAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static pattern compiles")
});
static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").expect("static pattern compiles")
});
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}:\d{1,2}").expect("static pattern compiles"));
static BELGIAN_TVA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)be\d{10}").expect("static pattern compiles"));
static BELGIAN_REGISTRE_NATIONAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{2}\.){2}\d{2}-\d{3}\.\d{2}$").expect("static pattern compiles")
});

/// Rejects blank values.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotEmptyValidator;

impl Validator for NotEmptyValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(!value.trim().is_empty(), self.code())
    }

    fn code(&self) -> &str {
        "NotEmpty"
    }

    fn validate_value(&self, value: &FieldValue) -> std::result::Result<(), String> {
        check(!value.is_blank(), self.code())
    }
}

/// Bounds the number of characters. A limit of 0 means no limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthValidator {
    max: usize,
    min: usize,
}

impl LengthValidator {
    pub const NO_LIMIT: usize = 0;

    pub fn new(max: usize, min: usize) -> Self {
        Self { max, min }
    }
}

impl Validator for LengthValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let length = value.chars().count();
        let too_long = self.max != Self::NO_LIMIT && length > self.max;
        let too_short = self.min != Self::NO_LIMIT && length < self.min;
        check(!too_long && !too_short, self.code())
    }

    fn code(&self) -> &str {
        "Length"
    }
}

/// Validator that enforces a maximum length.
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthValidator {
    max_length: usize,
}

impl MaxLengthValidator {
    /// Fails with [`FormError::InvalidLimit`] when `max_length` is 0.
    pub fn new(max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(FormError::InvalidLimit("max"));
        }
        Ok(Self { max_length })
    }
}

impl Validator for MaxLengthValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(value.chars().count() <= self.max_length, self.code())
    }

    fn code(&self) -> &str {
        "MaxLength"
    }
}

/// Validator that enforces a minimum length.
#[derive(Debug, Clone, Copy)]
pub struct MinLengthValidator {
    min_length: usize,
}

impl MinLengthValidator {
    /// Fails with [`FormError::InvalidLimit`] when `min_length` is 0.
    pub fn new(min_length: usize) -> Result<Self> {
        if min_length == 0 {
            return Err(FormError::InvalidLimit("min"));
        }
        Ok(Self { min_length })
    }
}

impl Validator for MinLengthValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(value.chars().count() >= self.min_length, self.code())
    }

    fn code(&self) -> &str {
        "MinLength"
    }
}

/// Accepts a non-empty run of ASCII digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigitsValidator;

impl Validator for DigitsValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(is_digits(value), self.code())
    }

    fn code(&self) -> &str {
        "Digits"
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts digits with any `.` or `,` separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatValidator;

impl Validator for FloatValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let digits: String = value.chars().filter(|c| !matches!(c, '.' | ',')).collect();
        check(is_digits(&digits), self.code())
    }

    fn code(&self) -> &str {
        "Float"
    }
}

/// Validator for email addresses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailValidator;

impl Validator for MailValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(MAIL.is_match(value), self.code())
    }

    fn code(&self) -> &str {
        "Mail"
    }
}

/// Accepts an existing calendar date.
///
/// The pattern must capture day, month and year in that order; the default
/// one reads `d/m/yyyy`.
#[derive(Debug, Clone)]
pub struct DateValidator {
    pattern: Regex,
}

impl DateValidator {
    pub fn new() -> Self {
        Self {
            pattern: DATE.clone(),
        }
    }

    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    fn parse(&self, value: &str) -> Option<NaiveDate> {
        let captures = self.pattern.captures(value)?;
        let day = captures.get(1)?.as_str().parse().ok()?;
        let month = captures.get(2)?.as_str().parse().ok()?;
        let year = captures.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

impl Default for DateValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for DateValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(self.parse(value).is_some(), self.code())
    }

    fn code(&self) -> &str {
        "Date"
    }
}

/// Looks for an `h:mm` time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeValidator;

impl Validator for TimeValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(TIME.is_match(value), self.code())
    }

    fn code(&self) -> &str {
        "Time"
    }
}

/// Requires the value to equal an expected one.
#[derive(Debug, Clone)]
pub struct EqualsValidator {
    expected: String,
}

impl EqualsValidator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
        }
    }
}

impl Validator for EqualsValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(value == self.expected, self.code())
    }

    fn code(&self) -> &str {
        "Equals"
    }
}

/// Accepts only listed values.
#[derive(Debug, Clone)]
pub struct WhiteListValidator {
    allowed: Vec<String>,
}

impl WhiteListValidator {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for WhiteListValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(self.allowed.iter().any(|allowed| allowed == value), self.code())
    }

    fn code(&self) -> &str {
        "WhiteList"
    }
}

/// Looks for a Belgian VAT number (`BE` and ten digits).
#[derive(Debug, Clone, Copy, Default)]
pub struct BelgianTvaValidator;

impl Validator for BelgianTvaValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(BELGIAN_TVA.is_match(value), self.code())
    }

    fn code(&self) -> &str {
        "BelgianTva"
    }
}

/// Belgian national register number, `yy.mm.dd-xxx.cc`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BelgianRegistreNationalValidator;

impl Validator for BelgianRegistreNationalValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(BELGIAN_REGISTRE_NATIONAL.is_match(value), self.code())
    }

    fn code(&self) -> &str {
        "BelgianRegistreNational"
    }
}

/// Validator using a custom regex pattern.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        check(self.pattern.is_match(value), self.code())
    }

    fn code(&self) -> &str {
        "Regex"
    }
}

/// Applies another validator to every value of a multi-valued field.
///
/// A single value counts as a one-element list. The first failing value
/// reports the inner validator's code.
#[derive(Debug, Clone)]
pub struct EachValidator {
    inner: Arc<dyn Validator>,
}

impl EachValidator {
    pub fn new(inner: impl Validator + 'static) -> Self {
        Self::from_shared(Arc::new(inner))
    }

    /// Wraps a validator that may be shared with other rules.
    pub fn from_shared(inner: Arc<dyn Validator>) -> Self {
        Self { inner }
    }

    /// Returns the first failure of the inner validator.
    pub fn validate_all<'a, I>(&self, values: I) -> std::result::Result<(), String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values
            .into_iter()
            .try_for_each(|value| self.inner.validate(value))
    }
}

impl Validator for EachValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        self.validate_all([value])
    }

    fn code(&self) -> &str {
        self.inner.code()
    }

    fn validate_value(&self, value: &FieldValue) -> std::result::Result<(), String> {
        self.validate_all(value.values())
    }
}
