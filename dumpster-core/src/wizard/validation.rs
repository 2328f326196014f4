//! Contact-step validation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::ContactInfo;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

/// Number of digits a phone number must reduce to.
pub const PHONE_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

impl ContactField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

/// Field-level validation messages, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactErrors(BTreeMap<ContactField, String>);

impl ContactErrors {
    pub fn get(
        &self,
        field: ContactField,
    ) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(
        &mut self,
        field: ContactField,
        message: &str,
    ) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for ContactErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(field, message)| format!("{}: {message}", field.as_str()))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// True when the number has exactly ten digits once punctuation is removed.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(char::is_ascii_digit).count() == PHONE_DIGITS
}

/// Validates every contact field and reports all failures at once.
pub fn validate_contact(contact: &ContactInfo) -> Result<(), ContactErrors> {
    let mut errors = ContactErrors::default();

    if contact.name.trim().is_empty() {
        errors.insert(ContactField::Name, "Name is required");
    }

    if contact.email.trim().is_empty() {
        errors.insert(ContactField::Email, "Email is required");
    } else if !is_valid_email(&contact.email) {
        errors.insert(ContactField::Email, "Invalid email");
    }

    if contact.phone.trim().is_empty() {
        errors.insert(ContactField::Phone, "Phone is required");
    } else if !is_valid_phone(&contact.phone) {
        errors.insert(ContactField::Phone, "Enter 10-digit phone");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
