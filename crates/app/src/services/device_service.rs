//! Device service — use-cases for managing devices.

use std::collections::BTreeMap;

use serde::Serialize;

use smarthub_domain::device::{Attribute, Device, DeviceChanges, DeviceRecord, NewDevice};
use smarthub_domain::error::{NotFoundError, SmartHubError};
use smarthub_domain::group::DeviceGroup;
use smarthub_domain::id::DeviceId;

use crate::ports::DeviceRepository;

/// A device together with its current power draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceUsage {
    #[serde(flatten)]
    pub record: DeviceRecord,
    /// Watts drawn; `None` when the record could not be materialized.
    pub energy_usage: Option<u32>,
}

/// Every device with its energy usage, grouped by type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub devices: Vec<DeviceUsage>,
    pub by_type: BTreeMap<String, Vec<DeviceId>>,
    pub total_energy: u64,
}

/// Application service for device CRUD and immediate edits.
pub struct DeviceService<R> {
    repo: R,
}

impl<R: DeviceRepository> DeviceService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// List all devices in creation order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_all(&self) -> Result<Vec<DeviceRecord>, SmartHubError> {
        self.repo.get_all().await
    }

    /// Look up a device by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] when no device with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: DeviceId) -> Result<DeviceRecord, SmartHubError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Create a new device after validating it against its kind.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] if the name is empty or an
    /// attribute does not fit the kind, or a storage error propagated from
    /// the repository.
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name, kind = %device.kind))]
    pub async fn create(&self, device: NewDevice) -> Result<DeviceRecord, SmartHubError> {
        device.validate()?;
        let record = self.repo.create(device).await?;
        tracing::info!(device_id = %record.id, "device created");
        Ok(record)
    }

    /// Apply a partial update to an existing device.
    ///
    /// Only the supplied fields change. When an attribute changes, the merged
    /// record must still be a valid device of its kind; name and status
    /// changes apply even to a record whose type tag is corrupt.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] if the device does not exist,
    /// [`SmartHubError::Validation`] if the result would be invalid, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> Result<DeviceRecord, SmartHubError> {
        let record = self.get(id).await?;
        if changes.is_empty() {
            return Ok(record);
        }
        changes.validate_against(&record)?;
        self.repo
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Delete a device by id.
    ///
    /// Pending jobs that target the device stay queued and fail with
    /// [`SmartHubError::NotFound`] when they fire.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] if the device does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: DeviceId) -> Result<(), SmartHubError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(not_found(id).into())
        }
    }

    /// Number of stored devices.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn count(&self) -> Result<u64, SmartHubError> {
        self.repo.count().await
    }

    /// Flip the on/off status of a device.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] if the device does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, id: DeviceId) -> Result<DeviceRecord, SmartHubError> {
        let record = self.get(id).await?;
        self.repo
            .update(id, DeviceChanges::status(!record.status))
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Give a device a new name.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] for a blank name, and otherwise
    /// the same errors as [`update`](Self::update).
    pub async fn rename(
        &self,
        id: DeviceId,
        name: impl Into<String>,
    ) -> Result<DeviceRecord, SmartHubError> {
        let changes = DeviceChanges {
            name: Some(name.into()),
            ..DeviceChanges::default()
        };
        self.update(id, changes).await
    }

    /// Change one variant attribute right away, with the same checks a
    /// scheduled action goes through. The on/off status is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::Validation`] when the value is out of range,
    /// the colour is not allowed or the kind has no such attribute, and
    /// otherwise the same errors as [`update`](Self::update).
    pub async fn set_attribute(
        &self,
        id: DeviceId,
        attribute: Attribute,
    ) -> Result<DeviceRecord, SmartHubError> {
        let record = self.get(id).await?;
        let mut device = Device::materialize(&record)?;
        device.set_attribute(attribute)?;

        let mut changes = DeviceChanges::default();
        match attribute {
            Attribute::Brightness(value) => changes.brightness = Some(value),
            Attribute::Temperature(value) => changes.temperature = Some(value),
            Attribute::Colour(colour) => changes.colour = Some(colour),
        }
        self.repo
            .update(id, changes)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Switch every member of `group` to the group's target status.
    ///
    /// Records with a corrupt type tag are skipped. Returns the number of
    /// devices whose status changed.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn apply_group(&self, group: DeviceGroup) -> Result<usize, SmartHubError> {
        let target = group.target_status();
        let mut changed = 0;
        for record in self.repo.get_all().await? {
            let Ok(kind) = record.device_type.parse() else {
                tracing::warn!(device_id = %record.id, tag = %record.device_type, "skipping device with unknown type");
                continue;
            };
            if !group.includes(kind) || record.status == target {
                continue;
            }
            if self
                .repo
                .update(record.id, DeviceChanges::status(target))
                .await?
                .is_some()
            {
                changed += 1;
            }
        }
        tracing::info!(changed, "group applied");
        Ok(changed)
    }

    /// Every device with its energy usage, devices grouped by type and the
    /// total usage.
    ///
    /// A record that cannot be materialized is reported without a usage and
    /// does not count towards the total.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn overview(&self) -> Result<Overview, SmartHubError> {
        let records = self.repo.get_all().await?;
        let mut by_type: BTreeMap<String, Vec<DeviceId>> = BTreeMap::new();
        let mut devices = Vec::with_capacity(records.len());
        let mut total_energy = 0_u64;

        for record in records {
            by_type
                .entry(record.device_type.clone())
                .or_default()
                .push(record.id);
            let energy_usage = match Device::materialize(&record) {
                Ok(device) => Some(device.energy_usage()),
                Err(err) => {
                    tracing::warn!(device_id = %record.id, %err, "cannot compute energy usage");
                    None
                }
            };
            total_energy += u64::from(energy_usage.unwrap_or_default());
            devices.push(DeviceUsage {
                record,
                energy_usage,
            });
        }

        Ok(Overview {
            devices,
            by_type,
            total_energy,
        })
    }
}

fn not_found(id: DeviceId) -> NotFoundError {
    NotFoundError {
        entity: "Device",
        id: id.to_string(),
    }
}
