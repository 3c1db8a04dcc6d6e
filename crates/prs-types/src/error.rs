use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::settings::SettingKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Presence,
    Integer,
    Range,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::Presence => "presence",
            ValidationKind::Integer => "integer",
            ValidationKind::Range => "range",
        }
    }

    pub(crate) fn to_garde(self) -> garde::Error {
        garde::Error::new(self.as_str())
    }
}

impl Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presence" => Ok(ValidationKind::Presence),
            "integer" => Ok(ValidationKind::Integer),
            "range" => Ok(ValidationKind::Range),
            other => Err(format!("Unknown validation kind {other}")),
        }
    }
}

/// Invalid input on review or feedback creation, names the first offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("Invalid {field}: {kind}")]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    pub fn presence(field: impl Into<String>) -> Self {
        Self::new(field, ValidationKind::Presence)
    }
}

impl From<garde::Report> for ValidationError {
    fn from(report: garde::Report) -> Self {
        match report.iter().next() {
            Some((path, error)) => {
                // built-in garde rules (length, range) carry their own messages
                let kind = error
                    .message()
                    .parse::<ValidationKind>()
                    .unwrap_or(ValidationKind::Range);
                ValidationError::new(path.to_string(), kind)
            }
            None => ValidationError::new("", ValidationKind::Presence),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Setting {key} expects {expected} value")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
    },

    #[error("Invalid value for setting {key}: {value}")]
    InvalidValue { key: SettingKey, value: String },
}
