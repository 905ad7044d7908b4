use crate::snapshot::SnapshotStore;
use tokio::sync::watch;
use tokio::time::{interval, Duration, MissedTickBehavior};
use triex_core::{DispatcherHandle, Result, TrieXError};

/// Periodic snapshot writer.
///
/// Snapshots are requested through the dispatcher queue, so they are ordered
/// with respect to every mutation; the disk write happens off the dispatcher
/// on a blocking thread.
pub struct Autosaver {
    handle: DispatcherHandle,
    store: SnapshotStore,
    period: Duration,
    shutdown: watch::Receiver<bool>,
    saves: u64,
}

impl Autosaver {
    pub fn new(
        handle: DispatcherHandle,
        store: SnapshotStore,
        period: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            handle,
            store,
            period,
            shutdown,
            saves: 0,
        }
    }

    /// Ticks until shutdown is signalled. Returns the number of snapshots written.
    ///
    /// A failed save is logged and retried on the next tick. A zero period
    /// disables autosave.
    pub async fn run(mut self) -> u64 {
        if self.period.is_zero() {
            tracing::info!("Autosaver: disabled");
            self.wait_for_shutdown().await;
            return 0;
        }

        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing has changed yet.
        timer.tick().await;

        tracing::info!("Autosaver: saving every {:?} to {}", self.period, self.store.dir().display());
        loop {
            tokio::select! {
                _ = timer.tick() => {
                    match self.save_once().await {
                        Ok(()) => {}
                        Err(TrieXError::DispatcherClosed) => {
                            tracing::warn!("Autosaver: dispatcher gone, stopping");
                            break;
                        }
                        Err(e) => tracing::warn!("Autosaver: save failed, retrying next tick: {}", e),
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Autosaver: stopped after {} snapshots", self.saves);
        self.saves
    }

    /// Takes one snapshot and writes it.
    pub async fn save_once(&mut self) -> Result<()> {
        let snapshot = self.handle.snapshot().await?;
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.save(&snapshot))
            .await
            .map_err(|e| TrieXError::Snapshot(format!("snapshot writer panicked: {}", e)))??;
        self.saves += 1;
        Ok(())
    }

    async fn wait_for_shutdown(&mut self) {
        while !*self.shutdown.borrow() {
            if self.shutdown.changed().await.is_err() {
                return;
            }
        }
    }
}
