use std::{
    convert::Infallible, num::NonZeroUsize, path::PathBuf, sync::Arc, time::Duration,
};

use tokio::{
    sync::Semaphore,
    task::JoinSet,
    time::{Instant, MissedTickBehavior},
};

use super::{
    error::DiscoveryError,
    output::{encode_targets, write_targets},
    runtime::RuntimeClient,
    target::{BuildOutcome, TargetRecord, inspect_target},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySettings {
    /// File the target set is written to.
    pub file: PathBuf,
    /// Time between the start of two ticks.
    pub interval: Duration,
    /// Upper bound on in-flight inspections; unbounded when `None`.
    pub max_concurrent_inspections: Option<NonZeroUsize>,
    /// Deadline for a single inspection; none when `None`.
    pub inspect_timeout: Option<Duration>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("targets.json"),
            interval: Duration::from_secs(30),
            max_concurrent_inspections: None,
            inspect_timeout: None,
        }
    }
}

pub struct Discoverer<C> {
    client: Arc<C>,
    settings: DiscoverySettings,
}

impl<C: RuntimeClient> Discoverer<C> {
    pub fn new(client: C, settings: DiscoverySettings) -> Self {
        Self {
            client: Arc::new(client),
            settings,
        }
    }

    /// Poll, build and write forever.
    ///
    /// The first tick runs immediately. Only a fatal error ends the loop.
    pub async fn run(&self) -> Result<Infallible, DiscoveryError> {
        log::info!(
            "Writing to '{}' every {:?}",
            self.settings.file.display(),
            self.settings.interval
        );

        let mut interval = tokio::time::interval(self.settings.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let tick_start = Instant::now();
            let written = self.tick().await?;
            log::debug!(
                "Wrote {} targets in {:?}",
                written,
                tick_start.elapsed()
            );
        }
    }

    /// Run a single poll-build-write cycle and return the number of targets written.
    pub async fn tick(&self) -> Result<usize, DiscoveryError> {
        let targets = self.collect_targets().await?;
        let data = encode_targets(&targets)?;
        write_targets(&self.settings.file, &data).await?;
        Ok(targets.len())
    }

    /// List every container and build targets for the running ones.
    ///
    /// Targets come back in the order their inspections finished.
    pub async fn collect_targets(&self) -> Result<Vec<TargetRecord>, DiscoveryError> {
        let ids = self.client.list_ids().await?;
        log::debug!("Found {} containers", ids.len());

        let semaphore = self
            .settings
            .max_concurrent_inspections
            .map(|limit| Arc::new(Semaphore::new(limit.get())));
        let timeout = self.settings.inspect_timeout;

        let mut join_set = JoinSet::new();
        for id in ids {
            let client = Arc::clone(&self.client);
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                // The semaphore is never closed, so acquiring only waits.
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                inspect_target(client.as_ref(), &id, timeout).await
            });
        }

        let mut targets = Vec::with_capacity(join_set.len());
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok(BuildOutcome::Target(target)) => targets.push(target),
                Ok(BuildOutcome::NotRunning { id, status }) => {
                    log::trace!("Skipping container '{id}' with status '{status}'");
                }
                Ok(BuildOutcome::InspectFailed { id, error }) => {
                    log::warn!("Failed to inspect '{id}'. Results may be incomplete: {error}");
                }
                Err(e) => {
                    log::warn!("Inspection task failed. Results may be incomplete: {e}");
                }
            }
        }

        Ok(targets)
    }
}
