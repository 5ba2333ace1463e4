//! Application context - dependency injection container

use std::sync::Arc;

use ledgersync_core::{RecordReconciler, ReportAggregator};
use ledgersync_domain::{Config, LedgerSyncError, Result};
use ledgersync_infra::api::{upstream_http_client, ApiClient, ApiClientConfig, TokenCache};
use ledgersync_infra::database::{DbManager, SqliteRecordRepository};
use ledgersync_infra::scheduling::{run_cycle, SyncJob, SyncScheduler, SyncSchedulerConfig};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub records: Arc<SqliteRecordRepository>,
    pub reconciler: Arc<RecordReconciler>,
    pub reports: Arc<ReportAggregator>,

    // `None` when periodic sync is disabled.
    sync_scheduler: Mutex<Option<SyncScheduler>>,
}

impl AppContext {
    /// Wire every service from `config`.
    ///
    /// Opens (and migrates) the database and registers the sync job, but
    /// starts nothing; call [`AppContext::start_sync`] for that.
    ///
    /// # Errors
    ///
    /// Fails if the database cannot be opened, the upstream HTTP client
    /// cannot be built, or the cron expression is invalid.
    pub async fn new_with_config(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let http = upstream_http_client(&config.upstream)?;
        let tokens = Arc::new(TokenCache::from_config(http.clone(), &config.upstream));
        let source = Arc::new(ApiClient::new(
            ApiClientConfig::from_upstream(&config.upstream),
            http,
            tokens,
        ));

        let records = Arc::new(SqliteRecordRepository::new(db.clone()));
        let reconciler = Arc::new(RecordReconciler::new(source, records.clone()));
        let reports = Arc::new(ReportAggregator::new(records.clone()));

        let sync_scheduler = if config.sync.enabled {
            let job: Arc<dyn SyncJob> = reconciler.clone();
            let scheduler_config = SyncSchedulerConfig::from(&config.sync);
            let scheduler = SyncScheduler::with_config(scheduler_config, job).await.map_err(|err| {
                tracing::error!(error = %err, "failed to construct SyncScheduler");
                LedgerSyncError::from(err)
            })?;
            Some(scheduler)
        } else {
            info!("Periodic sync disabled by configuration");
            None
        };

        Ok(Self {
            config,
            db,
            records,
            reconciler,
            reports,
            sync_scheduler: Mutex::new(sync_scheduler),
        })
    }

    /// Start the cron trigger and, if configured, kick off one cycle right away.
    ///
    /// The startup cycle runs in the background; its outcome is only logged.
    ///
    /// # Errors
    ///
    /// Fails if the scheduler cannot be started.
    pub async fn start_sync(&self) -> Result<()> {
        if let Some(scheduler) = self.sync_scheduler.lock().await.as_mut() {
            scheduler.start().await.map_err(|err| {
                tracing::error!(error = %err, "failed to start SyncScheduler");
                LedgerSyncError::from(err)
            })?;
        }

        if self.config.sync.run_on_startup {
            let reconciler = self.reconciler.clone();
            let timeout = SyncSchedulerConfig::from(&self.config.sync).job_timeout;
            tokio::spawn(async move {
                let _ = run_cycle(&*reconciler, timeout).await;
            });
        }

        Ok(())
    }

    /// Stop the cron trigger if it is running.
    pub async fn shutdown(&self) {
        if let Some(scheduler) = self.sync_scheduler.lock().await.as_mut() {
            if !scheduler.is_running() {
                return;
            }
            if let Err(err) = scheduler.stop().await {
                warn!(error = %err, "SyncScheduler did not stop cleanly");
            }
        }
    }

    /// Whether the cron trigger is active.
    pub async fn is_sync_running(&self) -> bool {
        self.sync_scheduler.lock().await.as_ref().is_some_and(SyncScheduler::is_running)
    }
}
