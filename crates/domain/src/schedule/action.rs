//! Action — the state change a scheduled job performs.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An operation the executor can apply to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    On,
    Off,
    SetBrightness,
    SetTemperature,
    SetColour,
}

/// An action name outside [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported action: {name}")]
pub struct UnknownAction {
    pub name: String,
}

impl Action {
    pub const ALL: [Self; 5] = [
        Self::On,
        Self::Off,
        Self::SetBrightness,
        Self::SetTemperature,
        Self::SetColour,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::SetBrightness => "set_brightness",
            Self::SetTemperature => "set_temperature",
            Self::SetColour => "set_colour",
        }
    }

    /// Whether the action needs a value to act on.
    #[must_use]
    pub const fn takes_value(self) -> bool {
        !matches!(self, Self::On | Self::Off)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| UnknownAction {
                name: s.to_string(),
            })
    }
}
