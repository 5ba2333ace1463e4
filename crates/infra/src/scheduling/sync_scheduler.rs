//! Cron-driven ledger sync scheduler.
//!
//! Fires one reconciliation cycle per cron tick (every five minutes by
//! default). Each cycle runs under a timeout and its outcome is logged
//! here; failures never leave the job, the next tick simply tries again.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledgersync_infra::scheduling::{
//!     SchedulerResult, SyncJob, SyncScheduler, SyncSchedulerConfig,
//! };
//!
//! # async fn example(job: Arc<dyn SyncJob>) -> SchedulerResult<()> {
//! let mut scheduler = SyncScheduler::with_config(SyncSchedulerConfig::default(), job).await?;
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ledgersync_core::{RecordReconciler, SyncError};
use ledgersync_domain::{SyncConfig, SyncOutcome};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// One unit of scheduled sync work.
#[async_trait]
pub trait SyncJob: Send + Sync {
    /// Execute a single cycle.
    async fn run(&self) -> Result<SyncOutcome, SyncError>;
}

#[async_trait]
impl SyncJob for RecordReconciler {
    async fn run(&self) -> Result<SyncOutcome, SyncError> {
        self.sync().await
    }
}

/// Configuration for the sync scheduler.
#[derive(Debug, Clone)]
pub struct SyncSchedulerConfig {
    /// Six-field cron expression (seconds first).
    pub cron_expression: String,
    /// Timeout applied to a single sync cycle.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for SyncSchedulerConfig {
    fn default() -> Self {
        Self {
            cron_expression: ledgersync_domain::constants::DEFAULT_SYNC_CRON.into(),
            job_timeout: Duration::from_secs(
                ledgersync_domain::constants::DEFAULT_SYNC_JOB_TIMEOUT_SECS,
            ),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SyncConfig> for SyncSchedulerConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            cron_expression: config.cron_expression.clone(),
            job_timeout: Duration::from_secs(config.job_timeout_seconds),
            ..Self::default()
        }
    }
}

/// Run one cycle under `timeout` and log how it ended.
///
/// The result is returned for callers that want it (startup sync, tests);
/// the scheduler itself discards it after logging.
pub async fn run_cycle(
    job: &dyn SyncJob,
    timeout: Duration,
) -> Result<SyncOutcome, SyncError> {
    let started = Instant::now();

    let result = match tokio::time::timeout(timeout, job.run()).await {
        Ok(result) => result,
        Err(_) => Err(SyncError::Timeout(timeout)),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match &result {
        Ok(SyncOutcome::Completed { fetched, upserted }) => {
            info!(fetched, upserted, elapsed_ms, "Ledger sync finished");
        }
        Ok(SyncOutcome::Skipped) => {
            debug!("Ledger sync skipped; previous cycle still running");
        }
        Err(err @ SyncError::Timeout(_)) => {
            warn!(timeout_secs = timeout.as_secs(), error = %err, "Ledger sync timed out");
        }
        Err(err) => {
            error!(
                category = ?err.category(),
                transient = err.is_transient(),
                error = %err,
                elapsed_ms,
                "Ledger sync failed"
            );
        }
    }

    result
}

/// Sync scheduler with explicit lifecycle management.
pub struct SyncScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    config: SyncSchedulerConfig,
    job_id: Uuid,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    job: Arc<dyn SyncJob>,
}

impl SyncScheduler {
    /// Create a scheduler with a custom configuration.
    ///
    /// # Errors
    ///
    /// Fails with [`SchedulerError::JobRegistrationFailed`] when the cron
    /// expression does not parse.
    pub async fn with_config(
        config: SyncSchedulerConfig,
        job: Arc<dyn SyncJob>,
    ) -> SchedulerResult<Self> {
        let raw_scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed { source })?;

        let mut scheduler = Self {
            scheduler: Arc::new(RwLock::new(raw_scheduler)),
            config,
            job_id: Uuid::nil(),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            job,
        };

        scheduler.job_id = scheduler.register_sync_job().await?;
        Ok(scheduler)
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler = self.scheduler.clone();
        let start_timeout = self.config.start_timeout;
        let start_result = tokio::time::timeout(start_timeout, async move {
            let guard = scheduler.write().await;
            guard.start().await
        })
        .await
        .map_err(|source| SchedulerError::Timeout { duration: start_timeout, source })?;

        start_result.map_err(|source| SchedulerError::StartFailed { source })?;

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(cron = %self.config.cron_expression, "Sync scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let scheduler = self.scheduler.clone();
        let stop_timeout = self.config.stop_timeout;
        let stop_result = tokio::time::timeout(stop_timeout, async move {
            let mut guard = scheduler.write().await;
            guard.shutdown().await
        })
        .await
        .map_err(|source| SchedulerError::Timeout { duration: stop_timeout, source })?;

        stop_result.map_err(|source| SchedulerError::StopFailed { source })?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|source| SchedulerError::Timeout { duration: join_timeout, source })??
        }

        info!("Sync scheduler stopped");
        Ok(())
    }

    /// Returns true when the monitor task is active.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn register_sync_job(&mut self) -> SchedulerResult<Uuid> {
        if self.job_id != Uuid::nil() {
            return Ok(self.job_id);
        }

        let job = self.job.clone();
        let job_timeout = self.config.job_timeout;

        let job_definition =
            Job::new_async(self.config.cron_expression.as_str(), move |_id, _lock| {
                let job = job.clone();
                Box::pin(async move {
                    debug!("Cron tick; starting ledger sync");
                    // Outcome is logged inside; nothing propagates past the job.
                    let _ = run_cycle(job.as_ref(), job_timeout).await;
                })
            })
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        let job_id = job_definition.guid();
        let scheduler = self.scheduler.write().await;
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed { source })?;

        debug!(cron = %self.config.cron_expression, job_id = %job_id, "Registered ledger sync job");
        Ok(job_id)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Sync scheduler monitor cancelled");
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("SyncScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}
