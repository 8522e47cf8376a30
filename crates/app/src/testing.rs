//! In-memory port implementations shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};

use smarthub_domain::device::{DeviceChanges, DeviceKind, DeviceRecord, NewDevice};
use smarthub_domain::error::SmartHubError;
use smarthub_domain::id::DeviceId;
use smarthub_domain::schedule::{JobKey, ScheduledJob};
use smarthub_domain::time::Timestamp;

use crate::ports::{DeviceRepository, JobRepository};

/// Clones share the same store.
#[derive(Clone, Default)]
pub struct InMemoryDeviceRepo {
    store: Arc<Mutex<BTreeMap<DeviceId, DeviceRecord>>>,
    writes: Arc<Mutex<usize>>,
}

impl InMemoryDeviceRepo {
    /// Store a record verbatim, bypassing validation.
    pub fn insert_raw(&self, record: DeviceRecord) {
        self.store.lock().unwrap().insert(record.id, record);
    }

    /// Store a default device of `kind` and return its record.
    pub fn seed(&self, name: &str, kind: DeviceKind) -> DeviceRecord {
        let mut store = self.store.lock().unwrap();
        let id = DeviceId::new(store.keys().last().map_or(1, |id| id.get() + 1));
        let record = NewDevice::builder()
            .name(name)
            .kind(kind)
            .build()
            .unwrap()
            .into_record(id);
        store.insert(id, record.clone());
        record
    }

    pub fn record(&self, id: DeviceId) -> Option<DeviceRecord> {
        self.store.lock().unwrap().get(&id).cloned()
    }

    /// Number of `update` calls that hit a stored record.
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl DeviceRepository for InMemoryDeviceRepo {
    fn create(
        &self,
        device: NewDevice,
    ) -> impl Future<Output = Result<DeviceRecord, SmartHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let id = DeviceId::new(store.keys().last().map_or(1, |id| id.get() + 1));
        let record = device.into_record(id);
        store.insert(id, record.clone());
        async { Ok(record) }
    }

    fn get_by_id(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send {
        let result = self.store.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<DeviceRecord>, SmartHubError>> + Send {
        let result: Vec<DeviceRecord> = self.store.lock().unwrap().values().cloned().collect();
        async { Ok(result) }
    }

    fn update(
        &self,
        id: DeviceId,
        changes: DeviceChanges,
    ) -> impl Future<Output = Result<Option<DeviceRecord>, SmartHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let result = store.get_mut(&id).map(|record| {
            changes.apply_to(record);
            record.clone()
        });
        if result.is_some() {
            *self.writes.lock().unwrap() += 1;
        }
        async { Ok(result) }
    }

    fn delete(&self, id: DeviceId) -> impl Future<Output = Result<bool, SmartHubError>> + Send {
        let removed = self.store.lock().unwrap().remove(&id).is_some();
        async move { Ok(removed) }
    }

    fn count(&self) -> impl Future<Output = Result<u64, SmartHubError>> + Send {
        let count = self.store.lock().unwrap().len() as u64;
        async move { Ok(count) }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryJobRepo {
    store: Arc<Mutex<HashMap<String, ScheduledJob>>>,
}

impl InMemoryJobRepo {
    fn sorted(&self, filter: impl Fn(&ScheduledJob) -> bool) -> Vec<ScheduledJob> {
        let mut jobs: Vec<ScheduledJob> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|job| filter(job))
            .cloned()
            .collect();
        jobs.sort_by_key(|job| (job.key.run_at(), job.key.id()));
        jobs
    }
}

impl JobRepository for InMemoryJobRepo {
    fn upsert(&self, job: ScheduledJob) -> impl Future<Output = Result<(), SmartHubError>> + Send {
        self.store.lock().unwrap().insert(job.key.id(), job);
        async { Ok(()) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send {
        let result = self.sorted(|_| true);
        async { Ok(result) }
    }

    fn due(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<ScheduledJob>, SmartHubError>> + Send {
        let result = self.sorted(|job| job.is_due(now));
        async { Ok(result) }
    }

    fn delete(&self, key: &JobKey) -> impl Future<Output = Result<bool, SmartHubError>> + Send {
        let removed = self.store.lock().unwrap().remove(&key.id()).is_some();
        async move { Ok(removed) }
    }
}
