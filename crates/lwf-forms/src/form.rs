//! Whole-form validation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::ValidationErrors;
use crate::validation::{EqualsValidator, FieldValue, NotEmptyValidator, Validator};

/// Code recorded for a required field absent from the submitted data.
pub const MISSING: &str = "Missing";

/// What a rule is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Field(String),
    /// Several fields checked together as one list, reported under `name`.
    Group { name: String, fields: Vec<String> },
}

impl Target {
    fn key(&self) -> &str {
        match self {
            Self::Field(field) => field,
            Self::Group { name, .. } => name,
        }
    }
}

/// A validator applied to a list of targets.
#[derive(Debug, Clone)]
struct Rule {
    validator: Arc<dyn Validator>,
    targets: Vec<Target>,
}

/// Validates submitted form data.
///
/// Every field records at most one failure: the first check it fails, in
/// this order: presence, blankness, rules in the order they were added, then
/// confirmation against another field.
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: Vec<(String, bool)>,
    rules: Vec<Rule>,
    confirms: Vec<(String, String)>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn required(mut self, field: &str) -> Self {
        self.add_required_field(field);
        self
    }

    #[must_use]
    pub fn optional(mut self, field: &str) -> Self {
        self.add_optional_field(field);
        self
    }

    #[must_use]
    pub fn rule(mut self, validator: impl Validator + 'static, fields: &[&str]) -> Self {
        self.add_rule(Arc::new(validator), fields.iter().map(ToString::to_string));
        self
    }

    /// Checks `fields` together, see [`FormValidator::add_group_rule`].
    #[must_use]
    pub fn group_rule(
        mut self,
        validator: impl Validator + 'static,
        name: &str,
        fields: &[&str],
    ) -> Self {
        self.add_group_rule(Arc::new(validator), name, fields.iter().map(ToString::to_string));
        self
    }

    #[must_use]
    pub fn confirm(mut self, field: &str, other: &str) -> Self {
        self.add_confirm(field, other);
        self
    }

    /// Declares a required field. A field declared twice keeps its first
    /// position and its latest flag.
    pub fn add_required_field(&mut self, field: &str) {
        self.set_field(field, true);
    }

    pub fn add_optional_field(&mut self, field: &str) {
        self.set_field(field, false);
    }

    fn set_field(&mut self, field: &str, required: bool) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = required,
            None => self.fields.push((field.to_string(), required)),
        }
    }

    /// Applies a validator to some fields. The same validator instance added
    /// again extends its existing rule.
    pub fn add_rule<I, S>(&mut self, validator: Arc<dyn Validator>, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = fields.into_iter().map(|field| Target::Field(field.into()));
        self.push_targets(validator, targets);
    }

    /// Applies a validator to the values of several fields at once.
    ///
    /// The validator receives a list holding every value of `fields` in
    /// order, with an empty string for an absent field. A failure is
    /// recorded under `name`.
    pub fn add_group_rule<I, S>(&mut self, validator: Arc<dyn Validator>, name: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = Target::Group {
            name: name.to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
        };
        self.push_targets(validator, [target]);
    }

    fn push_targets<I>(&mut self, validator: Arc<dyn Validator>, targets: I)
    where
        I: IntoIterator<Item = Target>,
    {
        match self
            .rules
            .iter_mut()
            .find(|rule| Arc::ptr_eq(&rule.validator, &validator))
        {
            Some(rule) => {
                for target in targets {
                    if !rule.targets.contains(&target) {
                        rule.targets.push(target);
                    }
                }
            }
            None => self.rules.push(Rule {
                validator,
                targets: targets.into_iter().collect(),
            }),
        }
    }

    /// Requires `field` to repeat the value of `other`.
    pub fn add_confirm(&mut self, field: &str, other: &str) {
        self.confirms.push((field.to_string(), other.to_string()));
    }

    pub fn is_required(&self, field: &str) -> Option<bool> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, required)| *required)
    }

    /// Checks single-valued submitted data.
    pub fn validate(&self, data: &HashMap<String, String>) -> Result<(), ValidationErrors> {
        let values: HashMap<String, FieldValue> = data
            .iter()
            .map(|(field, value)| (field.clone(), FieldValue::from(value.as_str())))
            .collect();
        self.validate_values(&values)
    }

    /// Checks submitted data where a field may carry several values.
    pub fn validate_values(
        &self,
        data: &HashMap<String, FieldValue>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut skip: HashSet<&str> = HashSet::new();

        for (field, required) in &self.fields {
            match data.get(field) {
                None => {
                    if *required {
                        errors.add(field, MISSING);
                    }
                    skip.insert(field.as_str());
                }
                Some(value) => {
                    if let Err(code) = NotEmptyValidator.validate_value(value) {
                        if *required {
                            errors.add(field, code);
                        }
                        skip.insert(field.as_str());
                    }
                }
            }
        }

        for rule in &self.rules {
            for target in &rule.targets {
                let key = target.key();
                if skip.contains(key) {
                    continue;
                }
                let value = match target {
                    Target::Field(field) => match data.get(field) {
                        Some(value) => value.clone(),
                        None => continue,
                    },
                    Target::Group { fields, .. } => FieldValue::Multiple(
                        fields
                            .iter()
                            .flat_map(|field| {
                                data.get(field).map_or_else(
                                    || vec![String::new()],
                                    |value| value.values().into_iter().map(str::to_string).collect(),
                                )
                            })
                            .collect(),
                    ),
                };
                if let Err(code) = rule.validator.validate_value(&value) {
                    errors.add(key, code);
                    skip.insert(key);
                }
            }
        }

        for (field, other) in &self.confirms {
            if skip.contains(field.as_str()) {
                continue;
            }
            let Some(value) = data.get(field) else {
                continue;
            };
            let expected = data
                .get(other)
                .and_then(FieldValue::as_single)
                .unwrap_or_default();
            if let Err(code) = EqualsValidator::new(expected).validate_value(value) {
                errors.add(field, code);
                skip.insert(field.as_str());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(fields = errors.len(), "form rejected");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{
        DigitsValidator, EachValidator, MaxLengthValidator, RegexValidator, WhiteListValidator,
    };

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_and_blank_fields() {
        let form = FormValidator::new()
            .required("name")
            .required("email")
            .optional("phone")
            .rule(DigitsValidator, &["phone"]);

        let errors = form
            .validate(&data(&[("email", "  "), ("phone", "")]))
            .unwrap_err();
        assert_eq!(errors.get("name"), Some(&[MISSING.to_string()][..]));
        assert_eq!(errors.get("email"), Some(&["NotEmpty".to_string()][..]));
        assert!(!errors.has("phone"));
    }

    #[test]
    fn test_first_failing_rule_wins() {
        let form = FormValidator::new()
            .required("age")
            .rule(DigitsValidator, &["age"])
            .rule(MaxLengthValidator::new(2).unwrap(), &["age"]);

        let errors = form.validate(&data(&[("age", "abcdef")])).unwrap_err();
        assert_eq!(errors.get("age"), Some(&["Digits".to_string()][..]));

        let errors = form.validate(&data(&[("age", "123")])).unwrap_err();
        assert_eq!(errors.get("age"), Some(&["MaxLength".to_string()][..]));

        assert!(form.validate(&data(&[("age", "42")])).is_ok());
    }

    #[test]
    fn test_confirm() {
        let form = FormValidator::new()
            .required("password")
            .required("password_confirm")
            .confirm("password_confirm", "password");

        assert!(form
            .validate(&data(&[("password", "s3cret"), ("password_confirm", "s3cret")]))
            .is_ok());
        let errors = form
            .validate(&data(&[("password", "s3cret"), ("password_confirm", "other")]))
            .unwrap_err();
        assert_eq!(errors.all_errors(), [("password_confirm", "Equals")]);
    }

    #[test]
    fn test_shared_rule_instance() {
        let digits: Arc<dyn Validator> = Arc::new(DigitsValidator);
        let mut form = FormValidator::new().optional("a").optional("b");
        form.add_rule(Arc::clone(&digits), ["a"]);
        form.add_rule(digits, ["b", "a"]);
        assert_eq!(form.rules.len(), 1);
        assert_eq!(
            form.rules[0].targets,
            [Target::Field("a".into()), Target::Field("b".into())]
        );

        let errors = form.validate(&data(&[("a", "x"), ("b", "y")])).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_redeclared_field_keeps_latest_flag() {
        let mut form = FormValidator::new().required("name");
        form.add_optional_field("name");
        assert_eq!(form.is_required("name"), Some(false));
        assert_eq!(form.is_required("other"), None);
        assert!(form.validate(&HashMap::new()).is_ok());
    }

    #[test]
    fn test_multi_valued_field() {
        let form = FormValidator::new()
            .required("tags")
            .rule(EachValidator::new(WhiteListValidator::new(["rust", "web"])), &["tags"]);

        let submitted = HashMap::from([("tags".to_string(), FieldValue::from(vec!["rust", "web"]))]);
        assert!(form.validate_values(&submitted).is_ok());

        let submitted = HashMap::from([("tags".to_string(), FieldValue::from(vec!["rust", "php"]))]);
        let errors = form.validate_values(&submitted).unwrap_err();
        assert_eq!(errors.all_errors(), [("tags", "WhiteList")]);

        let submitted = HashMap::from([("tags".to_string(), FieldValue::Multiple(Vec::new()))]);
        let errors = form.validate_values(&submitted).unwrap_err();
        assert_eq!(errors.all_errors(), [("tags", "NotEmpty")]);
    }

    #[test]
    fn test_group_rule() {
        let form = FormValidator::new()
            .required("day")
            .required("month")
            .optional("year")
            .group_rule(EachValidator::new(DigitsValidator), "birth", &["day", "month", "year"])
            .group_rule(RegexValidator::new(r"^\d+$").unwrap(), "day_list", &["day"]);

        let errors = form
            .validate(&data(&[("day", "29"), ("month", "feb"), ("year", "2000")]))
            .unwrap_err();
        // a single-value validator rejects the list a group produces
        assert_eq!(
            errors.all_errors(),
            [("birth", "Digits"), ("day_list", "Regex")]
        );
        assert!(!errors.has("month"));

        // an absent field joins the list as an empty value
        let errors = form
            .validate(&data(&[("day", "29"), ("month", "2")]))
            .unwrap_err();
        assert!(errors.has("birth"));
    }
}
