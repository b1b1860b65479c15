//! Component domain models for the Partcode SKU engine.
//!
//! This module defines the bill-of-materials component record handed over by
//! the ingestion layer, the closed set of engineering domains, and the
//! validation rules a component must pass before a SKU is generated.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Cell values that spreadsheet exports emit for blank cells.
pub const PLACEHOLDER_VALUES: &[&str] = &["", "nan", "none", "null", "(vide)", "empty", "unnamed"];

/// Description stored when the BOM line carries none.
pub const DEFAULT_DESCRIPTION: &str = "Description non fournie";

/// Top-level engineering domain of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "ELEC")]
    Electrical,
    #[serde(rename = "MECA")]
    Mechanical,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown domain '{0}', expected ELEC or MECA")]
pub struct UnknownDomain(pub String);

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Electrical, Domain::Mechanical];

    /// Four-letter code used as the first SKU segment.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Electrical => "ELEC",
            Self::Mechanical => "MECA",
        }
    }

    /// Human label shown when decoding a SKU.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Electrical => "Électrique",
            Self::Mechanical => "Mécanique",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL.into_iter().find(|d| d.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// One bill-of-materials line, as extracted from a spreadsheet row.
///
/// `domain` stays raw text here because the ingestion layer cannot be trusted
/// to produce a valid code; validation rejects anything outside [`Domain`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct Component {
    #[validate(custom = "validate_identity_text")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(custom = "validate_domain_code")]
    pub domain: String,
    #[validate(custom = "validate_identity_text")]
    pub component_type: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub manufacturer_part: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub designator: Option<String>,
}

// Custom validation functions
fn validate_identity_text(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule_violation("missing", "value is empty or whitespace"));
    }
    if is_placeholder(value) {
        return Err(rule_violation(
            "placeholder",
            format!("'{}' is a placeholder, not a value", value.trim()),
        ));
    }
    Ok(())
}

fn validate_domain_code(value: &str) -> Result<(), ValidationError> {
    match Domain::from_code(value) {
        Some(_) => Ok(()),
        None => Err(rule_violation("unknown_domain", UnknownDomain(value.to_string()).to_string())),
    }
}

fn rule_violation(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// True for blank cells and the usual spreadsheet stand-ins ("nan", "(vide)", ...).
pub fn is_placeholder(value: &str) -> bool {
    let lowered = value.trim().to_lowercase();
    PLACEHOLDER_VALUES.contains(&lowered.as_str())
}

fn meaningful(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !is_placeholder(v))
        .map(str::to_string)
}

// Utility methods for Component
impl Component {
    /// Creates a component with the three mandatory fields.
    pub fn new(name: impl Into<String>, domain: Domain, component_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: domain.code().to_string(),
            component_type: component_type.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>, part: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self.manufacturer_part = Some(part.into());
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_designator(mut self, designator: impl Into<String>) -> Self {
        self.designator = Some(designator.into());
        self
    }

    /// Parses the raw domain text.
    pub fn parsed_domain(&self) -> Result<Domain, UnknownDomain> {
        self.domain.parse()
    }

    /// Description to store and fingerprint; blank descriptions fall back to
    /// [`DEFAULT_DESCRIPTION`].
    pub fn effective_description(&self) -> &str {
        match self.description.as_deref().map(str::trim) {
            Some(text) if !is_placeholder(text) => text,
            _ => DEFAULT_DESCRIPTION,
        }
    }

    /// Returns a copy with mandatory fields trimmed, the default description
    /// substituted and placeholder optional fields cleared.
    pub fn cleaned(&self) -> Component {
        Component {
            name: self.name.trim().to_string(),
            description: Some(self.effective_description().to_string()),
            domain: self.domain.trim().to_uppercase(),
            component_type: self.component_type.trim().to_string(),
            manufacturer: meaningful(&self.manufacturer),
            manufacturer_part: meaningful(&self.manufacturer_part),
            quantity: self.quantity.filter(|q| q.is_finite()),
            designator: meaningful(&self.designator),
        }
    }
}
