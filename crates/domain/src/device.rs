//! Device taxonomy — typed devices with per-kind attribute rules.
//!
//! A [`Device`] is an ephemeral, validated view of a [`DeviceRecord`]. It is
//! built on demand with [`Device::materialize`], mutated through
//! [`Device::set_attribute`] and the on/off switches, and written back as
//! [`DeviceChanges`]. The store's record stays the source of truth.

mod attribute;
mod colour;
mod kind;
mod record;

pub use attribute::{Attribute, AttributeName};
pub use colour::{Colour, UnknownColour};
pub use kind::{BRIGHTNESS_RANGE, DEFAULT_BRIGHTNESS, DeviceKind};
pub use record::{DeviceChanges, DeviceRecord, NewDevice, NewDeviceBuilder};

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::error::{SmartHubError, ValidationError};

/// Variant-specific state of a typed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum DeviceVariant {
    BasicLight { brightness: i64 },
    ColourLight { brightness: i64, colour: Colour },
    Thermostat { temperature: i64 },
    Kettle { temperature: i64 },
    Boiler { temperature: i64 },
    Camera,
    DoorLock,
    Appliance,
}

impl DeviceVariant {
    /// The variant for `kind`, filled with its defaults.
    #[must_use]
    pub fn default_for(kind: DeviceKind) -> Self {
        let temperature = kind.default_temperature().unwrap_or_default();
        match kind {
            DeviceKind::BasicLight => Self::BasicLight {
                brightness: DEFAULT_BRIGHTNESS,
            },
            DeviceKind::ColourLight => Self::ColourLight {
                brightness: DEFAULT_BRIGHTNESS,
                colour: Colour::Default,
            },
            DeviceKind::Thermostat => Self::Thermostat { temperature },
            DeviceKind::Kettle => Self::Kettle { temperature },
            DeviceKind::Boiler => Self::Boiler { temperature },
            DeviceKind::Camera => Self::Camera,
            DeviceKind::DoorLock => Self::DoorLock,
            DeviceKind::Appliance => Self::Appliance,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> DeviceKind {
        match self {
            Self::BasicLight { .. } => DeviceKind::BasicLight,
            Self::ColourLight { .. } => DeviceKind::ColourLight,
            Self::Thermostat { .. } => DeviceKind::Thermostat,
            Self::Kettle { .. } => DeviceKind::Kettle,
            Self::Boiler { .. } => DeviceKind::Boiler,
            Self::Camera => DeviceKind::Camera,
            Self::DoorLock => DeviceKind::DoorLock,
            Self::Appliance => DeviceKind::Appliance,
        }
    }
}

/// A typed, validated device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    name: String,
    status: bool,
    #[serde(flatten)]
    variant: DeviceVariant,
}

impl Device {
    /// A switched-off device of `kind` with default attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            name: name.into(),
            status: false,
            variant: DeviceVariant::default_for(kind),
        }
    }

    /// Rebuild a typed device from a stored record.
    ///
    /// Missing attributes take the kind's defaults and the colour is
    /// resolved leniently. Stored values still pass through the same
    /// range checks as [`set_attribute`](Self::set_attribute).
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::UnsupportedDeviceType`] when the type tag is
    /// unknown, or [`SmartHubError::Validation`] when a stored attribute is
    /// outside the kind's bounds.
    pub fn materialize(record: &DeviceRecord) -> Result<Self, SmartHubError> {
        let kind: DeviceKind = record.device_type.parse()?;
        let mut device = Self::new(record.name.clone(), kind);
        device.status = record.status;

        if kind.supports_brightness() {
            let brightness = record.brightness.unwrap_or(DEFAULT_BRIGHTNESS);
            device.set_attribute(Attribute::Brightness(brightness))?;
        }
        if let Some(temperature) = record.temperature.filter(|_| kind.supports_temperature()) {
            device.set_attribute(Attribute::Temperature(temperature))?;
        }
        // A basic light always shows the default colour, whatever is stored.
        if kind == DeviceKind::ColourLight {
            let colour = Colour::resolve(record.colour.as_deref());
            device.set_attribute(Attribute::Colour(colour))?;
        }

        Ok(device)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> DeviceKind {
        self.variant.kind()
    }

    #[must_use]
    pub fn is_on(&self) -> bool {
        self.status
    }

    pub fn turn_on(&mut self) {
        self.status = true;
    }

    pub fn turn_off(&mut self) {
        self.status = false;
    }

    pub fn toggle(&mut self) {
        self.status = !self.status;
    }

    #[must_use]
    pub fn brightness(&self) -> Option<i64> {
        match self.variant {
            DeviceVariant::BasicLight { brightness }
            | DeviceVariant::ColourLight { brightness, .. } => Some(brightness),
            _ => None,
        }
    }

    #[must_use]
    pub fn temperature(&self) -> Option<i64> {
        match self.variant {
            DeviceVariant::Thermostat { temperature }
            | DeviceVariant::Kettle { temperature }
            | DeviceVariant::Boiler { temperature } => Some(temperature),
            _ => None,
        }
    }

    #[must_use]
    pub fn colour(&self) -> Option<Colour> {
        match self.variant {
            DeviceVariant::BasicLight { .. } => Some(Colour::Default),
            DeviceVariant::ColourLight { colour, .. } => Some(colour),
            _ => None,
        }
    }

    /// Change one variant-specific attribute.
    ///
    /// On failure the device is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::OutOfRange`] when the value is outside the kind's bounds
    /// - [`ValidationError::ColourNotAllowed`] when the kind rejects the colour
    /// - [`ValidationError::AttributeNotSupported`] when the kind has no such attribute
    pub fn set_attribute(&mut self, attribute: Attribute) -> Result<(), ValidationError> {
        let kind = self.kind();
        match (&mut self.variant, attribute) {
            (
                DeviceVariant::BasicLight { brightness }
                | DeviceVariant::ColourLight { brightness, .. },
                Attribute::Brightness(value),
            ) => {
                check_range(attribute, value, &BRIGHTNESS_RANGE)?;
                *brightness = value;
            }
            (
                DeviceVariant::Thermostat { temperature }
                | DeviceVariant::Kettle { temperature }
                | DeviceVariant::Boiler { temperature },
                Attribute::Temperature(value),
            ) => {
                if let Some(range) = kind.temperature_range() {
                    check_range(attribute, value, &range)?;
                }
                *temperature = value;
            }
            (DeviceVariant::BasicLight { .. }, Attribute::Colour(colour)) => {
                if !kind.colour_allowed(colour) {
                    return Err(ValidationError::ColourNotAllowed { kind, colour });
                }
            }
            (DeviceVariant::ColourLight { colour: current, .. }, Attribute::Colour(colour)) => {
                *current = colour;
            }
            (_, attribute) => {
                return Err(ValidationError::AttributeNotSupported {
                    kind,
                    attribute: attribute.name(),
                });
            }
        }
        Ok(())
    }

    /// Power draw in watts: the kind's wattage while on, zero while off.
    #[must_use]
    pub fn energy_usage(&self) -> u32 {
        if self.status { self.kind().wattage() } else { 0 }
    }

    /// Full snapshot of status and variant attributes, for writing back to
    /// the store.
    #[must_use]
    pub fn to_changes(&self) -> DeviceChanges {
        DeviceChanges {
            name: None,
            status: Some(self.status),
            temperature: self.temperature(),
            brightness: self.brightness(),
            colour: self.colour(),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.status { "On" } else { "Off" };
        write!(f, "{} ({state})", self.name)
    }
}

fn check_range(
    attribute: Attribute,
    value: i64,
    range: &RangeInclusive<i64>,
) -> Result<(), ValidationError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            attribute: attribute.name(),
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}
