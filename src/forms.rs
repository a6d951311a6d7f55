// src/forms.rs
//! Form input, validation, and the values derived from valid forms.
//!
//! Each form deserializes from urlencoded bodies with every field optional, so a
//! missing field surfaces as a field error rather than an extractor rejection.
//! `validate` returns either the typed command or the per-field error messages.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Person, PersonFields};

pub const MAX_LENGTH: usize = 200;

const REQUIRED: &str = "This field is required.";
const NOT_A_NUMBER: &str = "Enter a number.";
const BAD_EMAIL: &str = "Enter a valid email address.";
pub const DUPLICATE_EMAIL: &str = "My person with this Email already exists.";

/// Field name to error messages, ordered for stable output.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// A form as a template sees it: the submitted values plus their errors.
#[derive(Debug, Serialize)]
pub struct BoundForm<T> {
    pub data: T,
    pub errors: FormErrors,
}

impl<T: Default> BoundForm<T> {
    pub fn empty() -> Self {
        Self {
            data: T::default(),
            errors: FormErrors::default(),
        }
    }
}

impl<T> BoundForm<T> {
    pub fn new(data: T, errors: FormErrors) -> Self {
        Self { data, errors }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct HypotenuseForm {
    pub first_leg: Option<String>,
    pub second_leg: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Legs {
    pub first: f64,
    pub second: f64,
}

impl HypotenuseForm {
    pub fn validate(&self) -> Result<Legs, FormErrors> {
        let mut errors = FormErrors::default();
        let first = number_field(&mut errors, "first_leg", self.first_leg.as_deref());
        let second = number_field(&mut errors, "second_leg", self.second_leg.as_deref());

        match (first, second) {
            (Some(first), Some(second)) if errors.is_empty() => Ok(Legs { first, second }),
            _ => Err(errors),
        }
    }
}

impl Legs {
    /// Euclidean hypotenuse; `None` unless both legs are strictly positive.
    pub fn hypotenuse(&self) -> Option<f64> {
        if self.first <= 0.0 || self.second <= 0.0 {
            return None;
        }
        Some(self.first.hypot(self.second))
    }
}

fn number_field(errors: &mut FormErrors, field: &'static str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.add(field, NOT_A_NUMBER);
            None
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PersonForm {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl PersonForm {
    pub fn validate(&self) -> Result<PersonFields, FormErrors> {
        let mut errors = FormErrors::default();

        let email = text_field(&mut errors, "email", self.email.as_deref());
        if let Some(email) = &email {
            if !is_valid_email(email) {
                errors.add("email", BAD_EMAIL);
            }
        }
        let first_name = text_field(&mut errors, "first_name", self.first_name.as_deref());
        let last_name = text_field(&mut errors, "last_name", self.last_name.as_deref());

        match (email, first_name, last_name) {
            (Some(email), Some(first_name), Some(last_name)) if errors.is_empty() => {
                Ok(PersonFields {
                    email,
                    first_name,
                    last_name,
                })
            }
            _ => Err(errors),
        }
    }
}

impl From<&Person> for PersonForm {
    fn from(person: &Person) -> Self {
        Self {
            email: Some(person.email.clone()),
            first_name: Some(person.first_name.clone()),
            last_name: Some(person.last_name.clone()),
        }
    }
}

fn text_field(errors: &mut FormErrors, field: &'static str, raw: Option<&str>) -> Option<String> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }

    let len = value.chars().count();
    if len > MAX_LENGTH {
        errors.add(
            field,
            format!("Ensure this value has at most {MAX_LENGTH} characters (it has {len})."),
        );
        return None;
    }

    Some(value.to_string())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~-.".contains(c));

    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    local_ok && domain_ok
}
