//! Adjustable device attributes.

use serde::{Deserialize, Serialize};

use super::Colour;

/// A new value for one variant-specific attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Brightness(i64),
    Temperature(i64),
    Colour(Colour),
}

impl Attribute {
    #[must_use]
    pub const fn name(self) -> AttributeName {
        match self {
            Self::Brightness(_) => AttributeName::Brightness,
            Self::Temperature(_) => AttributeName::Temperature,
            Self::Colour(_) => AttributeName::Colour,
        }
    }
}

/// Attribute names, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeName {
    Brightness,
    Temperature,
    Colour,
}

impl std::fmt::Display for AttributeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Brightness => f.write_str("brightness"),
            Self::Temperature => f.write_str("temperature"),
            Self::Colour => f.write_str("colour"),
        }
    }
}
