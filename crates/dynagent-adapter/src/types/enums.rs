/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Agent persona selecting the system prompt used server-side.
///
/// The backend coerces unknown values to `general`; clients that parse
/// free-form input should do the same via [`PersonaType::from_str_lenient`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaType {
    Financial,
    Legal,
    #[default]
    General,
}

impl PersonaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaType::Financial => "financial",
            PersonaType::Legal => "legal",
            PersonaType::General => "general",
        }
    }

    /// Parse a persona string, falling back to `General` for unknown values
    /// the way the backend does.
    pub fn from_str_lenient(value: &str) -> Self {
        value.parse().unwrap_or(PersonaType::General)
    }
}

impl fmt::Display for PersonaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persona string matches no known persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPersona {
    pub value: String,
}

impl fmt::Display for UnknownPersona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown persona type: {}", self.value)
    }
}

impl std::error::Error for UnknownPersona {}

impl FromStr for PersonaType {
    type Err = UnknownPersona;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "financial" => Ok(PersonaType::Financial),
            "legal" => Ok(PersonaType::Legal),
            "general" => Ok(PersonaType::General),
            _ => Err(UnknownPersona {
                value: value.to_string(),
            }),
        }
    }
}
