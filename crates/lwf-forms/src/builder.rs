//! Builds a [`FormValidator`] from rule strings.
//!
//! Each field gets a `|`-separated list of rules:
//!
//! - `required` makes the field mandatory,
//! - `confirm:other` requires the field to equal field `other`,
//! - `Name` or `Name:parameter` applies the validator `Name`,
//! - `Each:Name[:parameter]` applies `Name` to every value of a
//!   multi-valued field.
//!
//! ```
//! use std::collections::HashMap;
//! use lwf_forms::FormValidatorBuilder;
//!
//! let form = FormValidatorBuilder::build([
//!     ("login", "required|MaxLength:20"),
//!     ("age", "Digits"),
//! ])
//! .unwrap();
//!
//! let data = HashMap::from([("login".to_string(), "alice".to_string())]);
//! assert!(form.validate(&data).is_ok());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{FormError, Result};
use crate::form::FormValidator;
use crate::validation::{
    BelgianRegistreNationalValidator, BelgianTvaValidator, DateValidator, DigitsValidator,
    EachValidator, EqualsValidator, FloatValidator, LengthValidator, MailValidator, MaxLengthValidator,
    MinLengthValidator, NotEmptyValidator, RegexValidator, TimeValidator, Validator,
    WhiteListValidator,
};

const REQUIRED: &str = "required";
const CONFIRM: &str = "confirm";

/// Parses rule strings into a [`FormValidator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormValidatorBuilder;

impl FormValidatorBuilder {
    /// Builds a validator from `(field, rules)` pairs.
    ///
    /// Fields without `required` are optional. Identical validator specs on
    /// several fields share one validator.
    pub fn build<I, K, V>(rules: I) -> Result<FormValidator>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = FormValidator::new();
        let mut instances: HashMap<String, Arc<dyn Validator>> = HashMap::new();

        for (field, spec) in rules {
            let field = field.as_ref();
            let mut required = false;
            for part in spec.as_ref().split('|').map(str::trim) {
                if part.is_empty() {
                    continue;
                }
                if part == REQUIRED {
                    required = true;
                } else if part.starts_with(CONFIRM) {
                    let other = part.split_once(':').map_or("", |(_, other)| other);
                    form.add_confirm(field, other);
                } else {
                    let validator = match instances.get(part) {
                        Some(validator) => Arc::clone(validator),
                        None => {
                            let validator = Self::validator(part)?;
                            instances.insert(part.to_string(), Arc::clone(&validator));
                            validator
                        }
                    };
                    form.add_rule(validator, [field]);
                }
            }
            if required {
                form.add_required_field(field);
            } else {
                form.add_optional_field(field);
            }
        }

        Ok(form)
    }

    /// Creates the validator described by `Name` or `Name:parameter`.
    pub fn validator(spec: &str) -> Result<Arc<dyn Validator>> {
        let (name, parameter) = match spec.split_once(':') {
            Some((name, parameter)) => (name, Some(parameter)),
            None => (spec, None),
        };

        let validator: Arc<dyn Validator> = match name {
            "Length" => {
                let max = parameter.map_or(Ok(LengthValidator::NO_LIMIT), |p| parse_limit(name, p))?;
                Arc::new(LengthValidator::new(max, LengthValidator::NO_LIMIT))
            }
            "MaxLength" => Arc::new(MaxLengthValidator::new(parse_limit(
                name,
                required_parameter(name, parameter)?,
            )?)?),
            "MinLength" => Arc::new(MinLengthValidator::new(parse_limit(
                name,
                required_parameter(name, parameter)?,
            )?)?),
            "Each" => Arc::new(EachValidator::from_shared(Self::validator(
                required_parameter(name, parameter)?,
            )?)),
            "Date" => match parameter {
                Some(pattern) => Arc::new(DateValidator::with_pattern(pattern)?),
                None => Arc::new(DateValidator::new()),
            },
            "Regex" => Arc::new(RegexValidator::new(required_parameter(name, parameter)?)?),
            "Equals" => Arc::new(EqualsValidator::new(required_parameter(name, parameter)?)),
            "WhiteList" => Arc::new(WhiteListValidator::new(
                required_parameter(name, parameter)?.split(','),
            )),
            _ => {
                let validator: Arc<dyn Validator> = match name {
                    "NotEmpty" => Arc::new(NotEmptyValidator),
                    "Digits" => Arc::new(DigitsValidator),
                    "Float" => Arc::new(FloatValidator),
                    "Mail" => Arc::new(MailValidator),
                    "Time" => Arc::new(TimeValidator),
                    "BelgianTva" => Arc::new(BelgianTvaValidator),
                    "BelgianRegistreNational" => Arc::new(BelgianRegistreNationalValidator),
                    _ => return Err(FormError::UnknownValidator(name.to_string())),
                };
                if let Some(parameter) = parameter {
                    return Err(FormError::UnexpectedParameter {
                        validator: name.to_string(),
                        parameter: parameter.to_string(),
                    });
                }
                validator
            }
        };
        Ok(validator)
    }
}

fn required_parameter<'a>(name: &str, parameter: Option<&'a str>) -> Result<&'a str> {
    parameter.ok_or_else(|| FormError::MissingParameter(name.to_string()))
}

fn parse_limit(name: &str, parameter: &str) -> Result<usize> {
    parameter
        .trim()
        .parse()
        .map_err(|err: std::num::ParseIntError| FormError::InvalidParameter {
            validator: name.to_string(),
            parameter: parameter.to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_required_and_optional() {
        let form = FormValidatorBuilder::build([("login", "required"), ("nick", "")]).unwrap();
        assert_eq!(form.is_required("login"), Some(true));
        assert_eq!(form.is_required("nick"), Some(false));
    }

    #[test]
    fn test_parameterized_validators() {
        let form = FormValidatorBuilder::build([
            ("login", "required|MaxLength:5"),
            ("color", "WhiteList:red,green"),
            ("code", "Regex:^[A-Z]{3}$"),
        ])
        .unwrap();

        let errors = form
            .validate(&data(&[("login", "toolong"), ("color", "blue"), ("code", "AB")]))
            .unwrap_err();
        assert_eq!(
            errors.all_errors(),
            [("code", "Regex"), ("color", "WhiteList"), ("login", "MaxLength")]
        );
    }

    #[test]
    fn test_confirm_rule() {
        let form = FormValidatorBuilder::build([
            ("password", "required|MinLength:8"),
            ("password_confirm", "required|confirm:password"),
        ])
        .unwrap();

        assert!(form
            .validate(&data(&[("password", "password1"), ("password_confirm", "password1")]))
            .is_ok());
        let errors = form
            .validate(&data(&[("password", "password1"), ("password_confirm", "password2")]))
            .unwrap_err();
        assert_eq!(errors.all_errors(), [("password_confirm", "Equals")]);
    }

    #[test]
    fn test_each_rule() {
        let validator = FormValidatorBuilder::validator("Each:MaxLength:3").unwrap();
        assert_eq!(validator.code(), "MaxLength");
        assert!(validator.validate_value(&vec!["abc", "de"].into()).is_ok());
        assert_eq!(
            validator.validate_value(&vec!["abc", "defg"].into()),
            Err("MaxLength".to_string())
        );

        assert!(matches!(
            FormValidatorBuilder::validator("Each"),
            Err(FormError::MissingParameter(name)) if name == "Each"
        ));
        assert!(matches!(
            FormValidatorBuilder::validator("Each:Nope"),
            Err(FormError::UnknownValidator(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_bad_rules() {
        assert!(matches!(
            FormValidatorBuilder::build([("a", "Nope")]),
            Err(FormError::UnknownValidator(name)) if name == "Nope"
        ));
        assert!(matches!(
            FormValidatorBuilder::build([("a", "MaxLength")]),
            Err(FormError::MissingParameter(_))
        ));
        assert!(matches!(
            FormValidatorBuilder::build([("a", "MaxLength:ten")]),
            Err(FormError::InvalidParameter { .. })
        ));
        assert!(matches!(
            FormValidatorBuilder::build([("a", "MaxLength:0")]),
            Err(FormError::InvalidLimit("max"))
        ));
        assert!(matches!(
            FormValidatorBuilder::build([("a", "Digits:3")]),
            Err(FormError::UnexpectedParameter { .. })
        ));
    }
}
