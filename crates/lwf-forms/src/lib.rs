//! # lwf-forms
//!
//! Field validators and rule-based form validation.
//!
//! This crate provides:
//! - Single-value validators reporting short error codes
//! - `FormValidator` for required, optional and confirmed fields, with
//!   multi-valued fields and rules spanning several fields
//! - `FormValidatorBuilder` to declare rules as strings
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use lwf_forms::{FormValidator, validation::{DigitsValidator, MailValidator}};
//!
//! let form = FormValidator::new()
//!     .required("email")
//!     .optional("age")
//!     .rule(MailValidator, &["email"])
//!     .rule(DigitsValidator, &["age"]);
//!
//! let data = HashMap::from([
//!     ("email".to_string(), "not-a-mail".to_string()),
//!     ("age".to_string(), "12".to_string()),
//! ]);
//! let errors = form.validate(&data).unwrap_err();
//! assert_eq!(errors.all_errors(), [("email", "Mail")]);
//! ```

mod builder;
mod error;
mod form;
pub mod validation;

pub use builder::FormValidatorBuilder;
pub use error::{FormError, Result, ValidationErrors};
pub use form::{FormValidator, MISSING};
pub use validation::{FieldValue, Validator};
