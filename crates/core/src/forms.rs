//! Data-driven edit forms.
//!
//! Generic edit modals are configured by a list of [`FieldDescriptor`]s
//! rather than bespoke code per entity: each descriptor names the field, its
//! widget kind, and its constraints, and one validation pass checks a map of
//! entered values against the list. The kind is a tagged variant, so a
//! descriptor can never be half a select and half a number.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::error::FieldError;

/// Widget kind plus kind-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number { min: Option<f64>, max: Option<f64> },
    Select { options: Vec<String> },
    Switch,
    Date,
}

/// Value entered for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Switch(bool),
    Date(NaiveDate),
}

/// Describes one field of a generic edit form.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Extra per-field check run after the kind checks pass.
    pub validate: Option<fn(&FieldValue) -> Result<(), String>>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            validate: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validator(mut self, validate: fn(&FieldValue) -> Result<(), String>) -> Self {
        self.validate = Some(validate);
        self
    }

    fn check(&self, value: &FieldValue) -> Result<(), String> {
        match (&self.kind, value) {
            (FieldKind::Text, FieldValue::Text(text)) => {
                if self.required && text.trim().is_empty() {
                    return Err(format!("{} is required", self.label));
                }
            }
            (FieldKind::Number { min, max }, FieldValue::Number(n)) => {
                if let Some(min) = min {
                    if n < min {
                        return Err(format!("{} must be at least {min}", self.label));
                    }
                }
                if let Some(max) = max {
                    if n > max {
                        return Err(format!("{} must be at most {max}", self.label));
                    }
                }
            }
            (FieldKind::Select { options }, FieldValue::Text(choice)) => {
                if !options.iter().any(|o| o == choice) {
                    return Err(format!("{} has no option \"{choice}\"", self.label));
                }
            }
            (FieldKind::Switch, FieldValue::Switch(_)) => {}
            (FieldKind::Date, FieldValue::Date(_)) => {}
            _ => {
                return Err(format!("{} has the wrong value type", self.label));
            }
        }

        if let Some(validate) = self.validate {
            validate(value)?;
        }
        Ok(())
    }
}

/// Validates `values` against `descriptors`, collecting every field failure.
pub fn validate_form(
    descriptors: &[FieldDescriptor],
    values: &HashMap<String, FieldValue>,
) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    for descriptor in descriptors {
        match values.get(&descriptor.key) {
            Some(value) => {
                if let Err(message) = descriptor.check(value) {
                    errors.push(FieldError {
                        field: descriptor.key.clone(),
                        message,
                    });
                }
            }
            None if descriptor.required => {
                errors.push(FieldError {
                    field: descriptor.key.clone(),
                    message: format!("{} is required", descriptor.label),
                });
            }
            None => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
