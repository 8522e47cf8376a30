//! Deferred action scheduler — a durable queue of one-shot jobs.
//!
//! Jobs live in a [`JobRepository`] so they survive restarts. A job is
//! identified by its parameters ([`JobKey`]), so scheduling identical
//! parameters twice replaces the first job. Each job fires at most once:
//! it is removed from the queue before its action runs, and a failing
//! action is logged, never retried.
//!
//! [`Scheduler::start`] spawns the firing loop on the tokio runtime. The
//! loop wakes every poll interval, and immediately after a job is scheduled.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use smarthub_domain::error::{NotFoundError, SmartHubError};
use smarthub_domain::schedule::{JobKey, ScheduledJob};
use smarthub_domain::time::{self, Timestamp};

use crate::executor::{ActionExecutor, Outcome};
use crate::ports::{DeviceRepository, JobRepository};

/// Schedules jobs and fires them through an [`ActionExecutor`].
pub struct Scheduler<J, R> {
    jobs: J,
    executor: ActionExecutor<R>,
    wake: Notify,
    misfire_grace: Option<TimeDelta>,
}

impl<J, R> Scheduler<J, R>
where
    J: JobRepository,
    R: DeviceRepository,
{
    /// Create a scheduler over the given job queue and executor.
    pub fn new(jobs: J, executor: ActionExecutor<R>) -> Self {
        Self {
            jobs,
            executor,
            wake: Notify::new(),
            misfire_grace: None,
        }
    }

    /// Discard jobs that are overdue by more than `grace` instead of firing
    /// them late.
    #[must_use]
    pub fn with_misfire_grace(mut self, grace: Duration) -> Self {
        self.misfire_grace = Some(TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX));
        self
    }

    /// Queue a job and return its key.
    ///
    /// A run time in the past is accepted; the job fires on the next tick.
    /// A pending job with the same key is replaced.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    #[tracing::instrument(skip(self, key), fields(job_id = %key))]
    pub async fn schedule(&self, key: JobKey) -> Result<JobKey, SmartHubError> {
        self.jobs.upsert(ScheduledJob::new(key.clone())).await?;
        self.wake.notify_one();
        tracing::info!(run_at = %time::format(key.run_at()), "job scheduled");
        Ok(key)
    }

    /// All pending jobs, ordered by run time.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list(&self) -> Result<Vec<ScheduledJob>, SmartHubError> {
        self.jobs.get_all().await
    }

    /// Remove a pending job.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::NotFound`] if no such job is pending (it was
    /// never scheduled, already cancelled, or already fired), or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, key), fields(job_id = %key))]
    pub async fn cancel(&self, key: &JobKey) -> Result<(), SmartHubError> {
        if !self.jobs.delete(key).await? {
            return Err(NotFoundError {
                entity: "Job",
                id: key.id(),
            }
            .into());
        }
        tracing::info!("job cancelled");
        Ok(())
    }

    /// Replace a pending job with a new one.
    ///
    /// If the old job cannot be cancelled the new one is not scheduled.
    ///
    /// # Errors
    ///
    /// Same as [`cancel`](Self::cancel) and [`schedule`](Self::schedule).
    pub async fn edit(&self, key: &JobKey, replacement: JobKey) -> Result<JobKey, SmartHubError> {
        self.cancel(key).await?;
        self.schedule(replacement).await
    }

    /// [`cancel`](Self::cancel) by textual job id.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::InvalidJobFormat`] if `job_id` does not
    /// decompose into its four fields, and otherwise the same errors as
    /// [`cancel`](Self::cancel).
    pub async fn cancel_str(&self, job_id: &str) -> Result<(), SmartHubError> {
        let key: JobKey = job_id.parse()?;
        self.cancel(&key).await
    }

    /// [`edit`](Self::edit) by textual job id.
    ///
    /// # Errors
    ///
    /// Returns [`SmartHubError::InvalidJobFormat`] if `job_id` does not
    /// decompose into its four fields, and otherwise the same errors as
    /// [`edit`](Self::edit).
    pub async fn edit_str(
        &self,
        job_id: &str,
        replacement: JobKey,
    ) -> Result<JobKey, SmartHubError> {
        let key: JobKey = job_id.parse()?;
        self.edit(&key, replacement).await
    }

    /// Fire every job due at `now`, in run-time order, and return how many
    /// actions were run.
    ///
    /// Each job is claimed by removing it from the queue first; a job that
    /// was cancelled in the meantime is skipped. Action failures are logged
    /// and do not stop the remaining jobs.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the queue itself cannot be read or updated.
    pub async fn run_due(&self, now: Timestamp) -> Result<usize, SmartHubError> {
        let mut fired = 0;
        for job in self.jobs.due(now).await? {
            let key = job.key;
            if !self.jobs.delete(&key).await? {
                continue;
            }
            if let Some(grace) = self.misfire_grace {
                let late_by = now - key.run_at();
                if late_by > grace {
                    tracing::warn!(job_id = %key, late_by_secs = late_by.num_seconds(), "job missed its run time, discarding");
                    continue;
                }
            }
            fired += 1;
            match self
                .executor
                .execute(key.device_id(), key.action(), key.value())
                .await
            {
                Ok(Outcome::Applied) => tracing::info!(job_id = %key, "job fired"),
                Ok(Outcome::Dropped) => tracing::info!(job_id = %key, "job fired, action dropped"),
                Err(err) => tracing::error!(job_id = %key, %err, "job failed"),
            }
        }
        Ok(fired)
    }
}

impl<J, R> Scheduler<J, R>
where
    J: JobRepository + 'static,
    R: DeviceRepository + 'static,
{
    /// Spawn the firing loop on the current tokio runtime.
    #[must_use]
    pub fn start(self: &Arc<Self>, poll_interval: Duration) -> SchedulerHandle {
        let task = tokio::spawn(Arc::clone(self).run(poll_interval));
        SchedulerHandle { task }
    }

    async fn run(self: Arc<Self>, poll_interval: Duration) {
        loop {
            if let Err(err) = self.run_due(time::now()).await {
                tracing::warn!(%err, "scheduler tick failed, retrying next interval");
            }
            tokio::select! {
                () = tokio::time::sleep(poll_interval) => {}
                () = self.wake.notified() => {}
            }
        }
    }
}

/// Handle on the spawned firing loop.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the firing loop and wait for it to wind down.
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;
        tracing::info!("scheduler stopped");
    }
}
