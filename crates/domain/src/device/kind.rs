//! Device kind — the closed set of supported device variants.

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Colour;
use crate::error::UnsupportedDeviceType;

/// Valid brightness for every light.
pub const BRIGHTNESS_RANGE: RangeInclusive<i64> = 0..=100;

/// Brightness used when a light record has none stored.
pub const DEFAULT_BRIGHTNESS: i64 = 50;

/// One of the closed set of device variants.
///
/// The variant name doubles as the persisted type tag (`"BasicLight"`,
/// `"DoorLock"`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    BasicLight,
    ColourLight,
    Thermostat,
    Kettle,
    Boiler,
    Camera,
    DoorLock,
    Appliance,
}

impl DeviceKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::BasicLight,
        Self::ColourLight,
        Self::Thermostat,
        Self::Kettle,
        Self::Boiler,
        Self::Camera,
        Self::DoorLock,
        Self::Appliance,
    ];

    /// The persisted type tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasicLight => "BasicLight",
            Self::ColourLight => "ColourLight",
            Self::Thermostat => "Thermostat",
            Self::Kettle => "Kettle",
            Self::Boiler => "Boiler",
            Self::Camera => "Camera",
            Self::DoorLock => "DoorLock",
            Self::Appliance => "Appliance",
        }
    }

    #[must_use]
    pub const fn is_light(self) -> bool {
        matches!(self, Self::BasicLight | Self::ColourLight)
    }

    #[must_use]
    pub const fn supports_brightness(self) -> bool {
        self.is_light()
    }

    /// Both lights carry a colour; only [`ColourLight`](Self::ColourLight)
    /// lets it change (see [`colour_allowed`](Self::colour_allowed)).
    #[must_use]
    pub const fn supports_colour(self) -> bool {
        self.is_light()
    }

    #[must_use]
    pub const fn supports_temperature(self) -> bool {
        matches!(self, Self::Thermostat | Self::Kettle | Self::Boiler)
    }

    /// Whether this kind accepts `colour` as its colour setting.
    #[must_use]
    pub fn colour_allowed(self, colour: Colour) -> bool {
        match self {
            Self::BasicLight => colour == Colour::Default,
            Self::ColourLight => true,
            _ => false,
        }
    }

    /// Inclusive temperature bounds, for kinds with a temperature.
    #[must_use]
    pub const fn temperature_range(self) -> Option<RangeInclusive<i64>> {
        match self {
            Self::Thermostat => Some(10..=30),
            Self::Kettle => Some(60..=100),
            Self::Boiler => Some(40..=60),
            _ => None,
        }
    }

    /// Temperature used when a record has none stored.
    #[must_use]
    pub const fn default_temperature(self) -> Option<i64> {
        match self {
            Self::Thermostat => Some(20),
            Self::Kettle => Some(100),
            Self::Boiler => Some(50),
            _ => None,
        }
    }

    /// Power draw in watts while switched on.
    #[must_use]
    pub const fn wattage(self) -> u32 {
        match self {
            Self::BasicLight | Self::ColourLight => 5,
            Self::Thermostat | Self::Boiler => 50,
            Self::Kettle => 20,
            Self::Camera | Self::Appliance => 10,
            Self::DoorLock => 2,
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = UnsupportedDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnsupportedDeviceType { tag: s.to_string() })
    }
}
