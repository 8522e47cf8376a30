//! Device records — the persisted shape of a device.
//!
//! A record is deliberately loose: its type tag is raw text and its
//! attributes are unchecked. Ranges are only enforced when a record is
//! materialized into a [`Device`].

use serde::{Deserialize, Serialize};

use super::{Attribute, Colour, Device, DeviceKind};
use crate::error::{SmartHubError, ValidationError};
use crate::id::DeviceId;

/// A stored device row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: DeviceId,
    pub name: String,
    /// Type tag; expected to name a [`DeviceKind`].
    #[serde(rename = "type")]
    pub device_type: String,
    pub status: bool,
    pub temperature: Option<i64>,
    pub brightness: Option<i64>,
    pub colour: Option<String>,
}

/// Fields for a device that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub kind: DeviceKind,
    pub status: bool,
    pub temperature: Option<i64>,
    pub brightness: Option<i64>,
    pub colour: Option<Colour>,
}

impl NewDevice {
    /// Create a builder for constructing a [`NewDevice`].
    #[must_use]
    pub fn builder() -> NewDeviceBuilder {
        NewDeviceBuilder::default()
    }

    /// Check the name and every supplied attribute against the kind's rules.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for a blank name, or the
    /// taxonomy error for the first attribute that does not fit the kind.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let mut device = Device::new(self.name.clone(), self.kind);
        for attribute in self.attributes() {
            device.set_attribute(attribute)?;
        }
        Ok(())
    }

    /// The record this device becomes once the store assigns `id`.
    #[must_use]
    pub fn into_record(self, id: DeviceId) -> DeviceRecord {
        DeviceRecord {
            id,
            name: self.name,
            device_type: self.kind.as_str().to_string(),
            status: self.status,
            temperature: self.temperature,
            brightness: self.brightness,
            colour: self.colour.map(|c| c.as_str().to_string()),
        }
    }

    fn attributes(&self) -> Vec<Attribute> {
        let mut out = Vec::new();
        if let Some(value) = self.brightness {
            out.push(Attribute::Brightness(value));
        }
        if let Some(value) = self.temperature {
            out.push(Attribute::Temperature(value));
        }
        if let Some(colour) = self.colour {
            out.push(Attribute::Colour(colour));
        }
        out
    }
}

/// Step-by-step builder for [`NewDevice`].
#[derive(Debug, Default)]
pub struct NewDeviceBuilder {
    name: Option<String>,
    kind: Option<DeviceKind>,
    status: Option<bool>,
    temperature: Option<i64>,
    brightness: Option<i64>,
    colour: Option<Colour>,
}

impl NewDeviceBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: DeviceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn status(mut self, on: bool) -> Self {
        self.status = Some(on);
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: i64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn brightness(mut self, brightness: i64) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub fn colour(mut self, colour: Colour) -> Self {
        self.colour = Some(colour);
        self
    }

    /// Consume the builder, validate, and return a [`NewDevice`].
    ///
    /// A missing kind defaults to [`DeviceKind::Appliance`].
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] if the name is missing or an
    /// attribute does not fit the kind.
    pub fn build(self) -> Result<NewDevice, SmartHubError> {
        let device = NewDevice {
            name: self.name.unwrap_or_default(),
            kind: self.kind.unwrap_or(DeviceKind::Appliance),
            status: self.status.unwrap_or(false),
            temperature: self.temperature,
            brightness: self.brightness,
            colour: self.colour,
        };
        device.validate()?;
        Ok(device)
    }
}

/// A partial update of a stored record. `None` leaves a field untouched.
///
/// There is no type field: a device never changes kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub status: Option<bool>,
    pub temperature: Option<i64>,
    pub brightness: Option<i64>,
    pub colour: Option<Colour>,
}

impl DeviceChanges {
    /// Changes that only set the on/off status.
    #[must_use]
    pub fn status(on: bool) -> Self {
        Self {
            status: Some(on),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge these changes into `record`.
    pub fn apply_to(&self, record: &mut DeviceRecord) {
        if let Some(name) = &self.name {
            record.name.clone_from(name);
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(temperature) = self.temperature {
            record.temperature = Some(temperature);
        }
        if let Some(brightness) = self.brightness {
            record.brightness = Some(brightness);
        }
        if let Some(colour) = self.colour {
            record.colour = Some(colour.as_str().to_string());
        }
    }

    /// Whether any variant attribute is set, as opposed to name or status only.
    #[must_use]
    pub fn touches_attributes(&self) -> bool {
        self.temperature.is_some() || self.brightness.is_some() || self.colour.is_some()
    }

    /// Check that applying these changes to `record` yields a valid device.
    ///
    /// The same taxonomy rules apply here as to scheduled actions. Name and
    /// status changes never look at the stored type tag, like a toggle.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] for an empty name or an
    /// attribute the kind rejects, and
    /// [`SmartHubError::UnsupportedDeviceType`] if an attribute change meets
    /// a corrupt stored tag.
    pub fn validate_against(&self, record: &DeviceRecord) -> Result<(), SmartHubError> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.touches_attributes() {
            return Ok(());
        }
        let mut merged = record.clone();
        self.apply_to(&mut merged);
        let mut device = Device::materialize(&merged)?;
        if let Some(value) = self.brightness {
            device.set_attribute(Attribute::Brightness(value))?;
        }
        if let Some(value) = self.temperature {
            device.set_attribute(Attribute::Temperature(value))?;
        }
        if let Some(colour) = self.colour {
            device.set_attribute(Attribute::Colour(colour))?;
        }
        Ok(())
    }
}
