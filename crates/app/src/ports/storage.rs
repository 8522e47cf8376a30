//! Storage port — repository traits for persistence.

use std::future::Future;

use smarthub_domain::device::{DeviceChanges, DeviceRecord, NewDevice};
use smarthub_domain::error::SmartHubError;
use smarthub_domain::id::DeviceId;
use smarthub_domain::schedule::{JobKey, ScheduledJob};
use smarthub_domain::time::Timestamp;

/// Persistent store of device records.
///
/// Records are stored as-is: the repository never validates attributes
/// against the taxonomy, that is the caller's job.
pub trait DeviceRepository: Send + Sync {
    /// Insert a device and return its record with the freshly assigned id.
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceRecord, SmartHubError>> + Send;

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send;

    /// Every record, in creation order.
    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, SmartHubError>> + Send;

    /// Merge `changes` into the stored record as one atomic read-merge-write.
    ///
    /// Returns `None` when no record with `id` exists.
    fn update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send;

    /// Remove a record. Returns whether a record was removed.
    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<bool, SmartHubError>> + Send;

    fn count(&self) -> impl Future<Output = Result<u64, SmartHubError>> + Send;
}

/// Durable queue of pending jobs, keyed by the textual job id.
pub trait JobRepository: Send + Sync {
    /// Insert a job, replacing any pending job with the same key.
    fn upsert(&self, job: ScheduledJob) -> impl Future<Output = Result<(), SmartHubError>> + Send;

    /// Every pending job, ordered by run time.
    fn get_all(&self) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send;

    /// Pending jobs whose run time is at or before `now`, ordered by run time.
    fn due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send;

    /// Remove a job. Returns whether a job was removed.
    fn delete(&self, key: &JobKey) -> impl Future<Output = Result<bool, SmartHubError>> + Send;
}
