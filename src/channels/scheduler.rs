use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::connection::Frame;
use super::error::SchedulerError;
use super::ChannelManager;
use crate::codec::pack;

impl ChannelManager {
    /// Start the periodic broadcast task. Each tick packs every world's
    /// buffered records and flushes the pack to that world's state
    /// subscribers. Starting an already-running scheduler is a no-op.
    pub fn start_broadcast(self: &Arc<Self>) {
        let mut slot = self.lock_broadcast_task();
        if slot.is_some() {
            tracing::warn!("Broadcast scheduler already running");
            return;
        }

        let cancel = CancellationToken::new();
        *slot = Some(cancel.clone());
        drop(slot);

        // A weak handle keeps the task from pinning the manager alive:
        // dropping the last external handle ends the task on its next tick.
        let manager = Arc::downgrade(self);
        let period = self.broadcast_period;
        tokio::spawn(async move {
            tracing::info!(period_ms = period.as_millis() as u64, "Broadcast scheduler started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(manager) = manager.upgrade() else {
                            break;
                        };
                        manager.broadcast_tick();
                    }
                }
            }
            tracing::info!("Broadcast scheduler stopped");
        });
    }

    /// Stop the broadcast task. Fails with [`SchedulerError::NotRunning`]
    /// when the scheduler was not started.
    pub fn stop_broadcast(&self) -> Result<(), SchedulerError> {
        match self.lock_broadcast_task().take() {
            Some(cancel) => {
                cancel.cancel();
                Ok(())
            }
            None => Err(SchedulerError::NotRunning),
        }
    }

    #[must_use]
    pub fn broadcast_running(&self) -> bool {
        self.lock_broadcast_task().is_some()
    }

    /// One scheduler tick, normally driven by [`start_broadcast`]
    /// (public so tests can tick deterministically). Buffers are not cleared
    /// after a tick: every still-buffered client's last known state is
    /// re-sent each tick until it updates or its state connection is
    /// removed, trading update-count fidelity for a bounded per-tick payload.
    pub fn broadcast_tick(&self) {
        for entry in self.buffers.iter() {
            let world = *entry.key();
            let buffer = entry.value();
            if buffer.is_empty() {
                continue;
            }

            let snapshot = buffer.snapshot();
            let payload = pack(snapshot.iter());
            let Some(channels) = self.worlds.get(&world) else {
                continue;
            };
            for conn in channels.state.iter() {
                conn.value().send(Frame::Binary(payload.clone()));
            }
            tracing::trace!(
                world,
                records = snapshot.len(),
                subscribers = channels.state.len(),
                "State pack flushed"
            );
        }
    }
}
