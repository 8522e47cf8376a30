//! Action executor — applies one action to one stored device.
//!
//! The executor loads the record, materializes the typed device, dispatches
//! the action and writes the full snapshot back. Malformed values (a
//! non-integer level, an unknown colour name) and capabilities the device
//! lacks are logged and dropped without touching the store. Range and
//! colour violations are returned to the caller.

use smarthub_domain::device::{Attribute, Colour, Device};
use smarthub_domain::error::{NotFoundError, SmartHubError};
use smarthub_domain::id::DeviceId;
use smarthub_domain::schedule::Action;

use crate::ports::DeviceRepository;

/// What happened to an action handed to the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action changed the device and the record was written.
    Applied,
    /// The action was logged and dropped; the record was not written.
    Dropped,
}

/// Applies [`Action`]s to devices held by a [`DeviceRepository`].
pub struct ActionExecutor<R> {
    repo: R,
}

impl<R: DeviceRepository> ActionExecutor<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Apply `action` with its optional textual `value` to the device `id`.
    ///
    /// `set_brightness` and `set_colour` also switch the device on;
    /// `set_temperature` leaves the status alone.
    ///
    /// # Errors
    ///
    /// - [`SmartHubError::NotFound`] when the device does not exist
    /// - [`SmartHubError::UnsupportedDeviceType`] when its stored type tag is corrupt
    /// - [`SmartHubError::Validation`] when the value is outside the kind's
    ///   bounds or the colour is not allowed
    /// - a storage error from the repository
    #[tracing::instrument(skip(self, id, action), fields(device_id = %id, action = %action))]
    pub async fn execute(
        &self,
        id: DeviceId,
        action: Action,
        value: Option<&str>,
    ) -> Result<Outcome, SmartHubError> {
        let record = self
            .repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let mut device = Device::materialize(&record)?;

        if !dispatch(&mut device, action, value)? {
            return Ok(Outcome::Dropped);
        }

        self.repo
            .update(id, device.to_changes())
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::debug!(device = %device, "action applied");
        Ok(Outcome::Applied)
    }
}

/// Apply `action` to `device` in memory. Returns `false` when the action was
/// dropped.
fn dispatch(device: &mut Device, action: Action, value: Option<&str>) -> Result<bool, SmartHubError> {
    if action.takes_value() && value.is_none() {
        tracing::warn!("action needs a value, dropping action");
        return Ok(false);
    }
    let kind = device.kind();
    match action {
        Action::On => device.turn_on(),
        Action::Off => device.turn_off(),
        Action::SetBrightness => {
            if !kind.supports_brightness() {
                tracing::warn!(%kind, "device has no brightness, dropping action");
                return Ok(false);
            }
            let Some(level) = parse_level(value) else {
                tracing::warn!(?value, "brightness is not an integer, dropping action");
                return Ok(false);
            };
            device.set_attribute(Attribute::Brightness(level))?;
            device.turn_on();
        }
        Action::SetTemperature => {
            if !kind.supports_temperature() {
                tracing::warn!(%kind, "device has no temperature, dropping action");
                return Ok(false);
            }
            let Some(level) = parse_level(value) else {
                tracing::warn!(?value, "temperature is not an integer, dropping action");
                return Ok(false);
            };
            device.set_attribute(Attribute::Temperature(level))?;
        }
        Action::SetColour => {
            if !kind.supports_colour() {
                tracing::warn!(%kind, "device has no colour, dropping action");
                return Ok(false);
            }
            let Some(colour) = value.and_then(|v| v.parse::<Colour>().ok()) else {
                tracing::warn!(?value, "unknown colour, dropping action");
                return Ok(false);
            };
            device.set_attribute(Attribute::Colour(colour))?;
            device.turn_on();
        }
    }
    Ok(true)
}

fn parse_level(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}

fn not_found(id: DeviceId) -> NotFoundError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
}
