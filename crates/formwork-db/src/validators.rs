//! Field validators for models.
//!
//! A [`Validator`] checks one value against one rule. [`FieldValidations`]
//! binds validators to field names and runs them over a model's field values,
//! appending every failure to an [`ErrorSet`]. Models typically keep one
//! `FieldValidations` per type and call it from `ModelAdapter::validate`.

use std::fmt;

use formwork_core::{ErrorSet, ValidationError};

use crate::value::Value;

/// A trait for validating field values.
///
/// # Examples
///
/// ```
/// use formwork_db::validators::{Length, Validator};
/// use formwork_db::value::Value;
///
/// let v = Length::between(2, 5);
/// assert!(v.validate(&Value::from("abc")).is_ok());
/// assert!(v.validate(&Value::from("a")).is_err());
/// ```
pub trait Validator: fmt::Debug {
    /// Validates the given value, returning an error if invalid.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// Requires a non-NULL, non-blank value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Presence;

impl Validator for Presence {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if value.is_blank() {
            return Err(ValidationError::new("can't be blank", "blank"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Presence"
    }
}

/// Constrains the character length of a string value.
///
/// NULL and non-string values pass; combine with [`Presence`] to require one.
#[derive(Debug, Clone, Copy, Default)]
pub struct Length {
    /// Minimum number of characters.
    pub min: Option<usize>,
    /// Maximum number of characters.
    pub max: Option<usize>,
    /// Exact number of characters.
    pub exact: Option<usize>,
}

impl Length {
    /// Length within `min..=max`.
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            exact: None,
        }
    }

    /// Length of exactly `n`.
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: None,
            max: None,
            exact: Some(n),
        }
    }

    /// Length of at most `n`.
    pub const fn at_most(n: usize) -> Self {
        Self {
            min: None,
            max: Some(n),
            exact: None,
        }
    }
}

impl Validator for Length {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();

        if let Some(n) = self.exact {
            if len != n {
                return Err(ValidationError::new(
                    format!("is the wrong length (should be {n} characters)"),
                    "wrong_length",
                )
                .with_param("count", n.to_string()));
            }
        }
        if let Some(min) = self.min {
            if len < min {
                return Err(ValidationError::new(
                    format!("is too short (minimum is {min} characters)"),
                    "too_short",
                )
                .with_param("count", min.to_string()));
            }
        }
        if let Some(max) = self.max {
            if len > max {
                return Err(ValidationError::new(
                    format!("is too long (maximum is {max} characters)"),
                    "too_long",
                )
                .with_param("count", max.to_string()));
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Length"
    }
}

/// Requires a string value to be one of a fixed set.
#[derive(Debug, Clone)]
pub struct Inclusion {
    allowed: Vec<String>,
    message: Option<String>,
}

impl Inclusion {
    /// Creates an inclusion rule over the given values.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Replaces the default "is not included in the list" message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Validator for Inclusion {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        if self.allowed.iter().any(|a| a == s) {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| "is not included in the list".to_string());
        Err(ValidationError::new(message, "inclusion").with_param("value", s))
    }

    fn name(&self) -> &str {
        "Inclusion"
    }
}

/// A named custom rule backed by a plain function.
pub struct Predicate {
    name: &'static str,
    code: &'static str,
    message: &'static str,
    check: fn(&Value) -> bool,
}

impl Predicate {
    /// Creates a rule that fails with `code`/`message` when `check` returns `false`.
    pub const fn new(
        name: &'static str,
        code: &'static str,
        message: &'static str,
        check: fn(&Value) -> bool,
    ) -> Self {
        Self {
            name,
            code,
            message,
            check,
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").field("name", &self.name).finish()
    }
}

impl Validator for Predicate {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        if (self.check)(value) {
            Ok(())
        } else {
            Err(ValidationError::new(self.message, self.code))
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// An ordered list of `(field, validator)` rules.
///
/// # Examples
///
/// ```
/// use formwork_core::ErrorSet;
/// use formwork_db::validators::{FieldValidations, Length, Presence};
/// use formwork_db::value::Value;
///
/// let rules = FieldValidations::new()
///     .rule("first_name", Presence)
///     .rule("first_name", Length::between(2, 254));
///
/// let mut errors = ErrorSet::new();
/// rules.run(&[("first_name", Value::from("A"))], &mut errors);
/// assert_eq!(errors.codes_for("first_name"), vec!["too_short"]);
/// ```
#[derive(Debug, Default)]
pub struct FieldValidations {
    rules: Vec<(&'static str, Box<dyn Validator>)>,
}

impl FieldValidations {
    /// Creates an empty rule list.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule for `field`.
    pub fn rule(mut self, field: &'static str, validator: impl Validator + 'static) -> Self {
        self.rules.push((field, Box::new(validator)));
        self
    }

    /// Returns the number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every rule in order and appends failures to `errors`.
    ///
    /// Fields missing from `values` are validated as NULL.
    pub fn run(&self, values: &[(&str, Value)], errors: &mut ErrorSet) {
        for (field, validator) in &self.rules {
            let value = values
                .iter()
                .find(|(name, _)| name == field)
                .map_or(Value::Null, |(_, v)| v.clone());
            if let Err(e) = validator.validate(&value) {
                errors.add_error(*field, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presence() {
        assert!(Presence.validate(&Value::from("x")).is_ok());
        let err = Presence.validate(&Value::from("  ")).unwrap_err();
        assert_eq!(err.code, "blank");
        assert!(Presence.validate(&Value::Null).is_err());
    }

    #[test]
    fn test_length_bounds() {
        let v = Length::between(2, 4);
        assert_eq!(v.validate(&Value::from("a")).unwrap_err().code, "too_short");
        assert_eq!(v.validate(&Value::from("abcde")).unwrap_err().code, "too_long");
        assert!(v.validate(&Value::from("abc")).is_ok());
        assert!(v.validate(&Value::Null).is_ok());
    }

    #[test]
    fn test_length_exact_counts_chars() {
        let v = Length::exactly(1);
        assert!(v.validate(&Value::from("é")).is_ok());
        let err = v.validate(&Value::from("mf")).unwrap_err();
        assert_eq!(err.code, "wrong_length");
        assert_eq!(err.params.get("count").unwrap(), "1");
    }

    #[test]
    fn test_inclusion_custom_message() {
        let v = Inclusion::new(["m", "f", "o"]).with_message("one of m, f, or o");
        assert!(v.validate(&Value::from("o")).is_ok());
        let err = v.validate(&Value::from("x")).unwrap_err();
        assert_eq!(err.message, "one of m, f, or o");
        assert_eq!(err.code, "inclusion");
    }

    #[test]
    fn test_predicate() {
        let positive = Predicate::new("positive", "not_positive", "must be positive", |v| {
            matches!(v, Value::Int(i) if *i > 0)
        });
        assert!(positive.validate(&Value::Int(3)).is_ok());
        assert_eq!(positive.validate(&Value::Int(0)).unwrap_err().code, "not_positive");
        assert_eq!(positive.name(), "positive");
    }

    #[test]
    fn test_field_validations_accumulate_in_rule_order() {
        let rules = FieldValidations::new()
            .rule("last_name", Presence)
            .rule("gender", Inclusion::new(["m", "f", "o"]))
            .rule("first_name", Presence);
        let mut errors = ErrorSet::new();
        rules.run(&[("gender", Value::from("x"))], &mut errors);
        assert_eq!(errors.keys(), vec!["last_name", "gender", "first_name"]);
        assert_eq!(rules.len(), 3);
    }
}
