//! Timed delivery cycle
//!
//! The delivery scheduler is a two-state machine, IDLE and RUNNING. RUNNING
//! is one spawned task per cycle: release the next unreleased message to all
//! subscribers, wait the release interval, repeat until drained. A publish
//! while a cycle is running never spawns a second one; it only extends the
//! running cycle's workload.
//!
//! Cancellation is epoch-based. Clear bumps the hub epoch under the lock; a
//! cycle that wakes from its wait and observes a mismatched epoch exits
//! without delivering, so a stale pre-clear message can never follow the
//! clear sentinel.

use std::sync::Arc;

use tokio::time::sleep;

use super::MessageHub;
use crate::protocol::Event;

/// Start a RUNNING cycle for the given epoch
pub(super) fn spawn_cycle(hub: Arc<MessageHub>, epoch: u64) {
    tokio::spawn(run_cycle(hub, epoch));
}

async fn run_cycle(hub: Arc<MessageHub>, epoch: u64) {
    tracing::debug!(epoch, "Delivery cycle started");

    loop {
        {
            let mut state = hub.state();

            if state.epoch != epoch {
                tracing::debug!(epoch, "Delivery cycle cancelled by clear");
                return;
            }

            let message = match state.queue.next_unreleased() {
                Some(message) => message.clone(),
                None => {
                    state.cycle_active = false;
                    tracing::debug!(
                        epoch,
                        released = state.queue.released_count(),
                        "Delivery cycle drained"
                    );
                    return;
                }
            };

            // One release step: cursor advance and fan-out share the
            // critical section, so nothing can interleave between them.
            state.queue.mark_released();
            let delivered = state.subscribers.broadcast(Event::Message(message.clone()).encode());

            tracing::debug!(
                message_id = %message.id,
                delivered,
                released = state.queue.released_count(),
                "Message released"
            );
        }

        sleep(hub.release_interval()).await;
    }
}
