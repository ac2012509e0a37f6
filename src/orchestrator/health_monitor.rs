//! Supervisor health-check loop (§4.3): periodically heartbeats every
//! registered child, then asks the supervisor which ones have gone quiet
//! and restarts whatever it says needs restarting.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::warn;

// Layer 3: Internal module imports
use crate::actor::AgentRuntime;
use crate::circuit_breaker::CircuitBreaker;
use crate::message::{Message, MessageKind, Payload};

use super::Inner;

pub(super) fn spawn(inner: Arc<Inner>, interval_ms: i64) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(Duration::from_millis(interval_ms.max(0) as u64)).await;

            let children = inner.registry.ids();
            for &id in &children {
                let ping = Message::new(Some(inner.supervisor_id), id, MessageKind::Heartbeat, Payload::Empty);
                let _ = inner.registry.route(ping).await;
            }

            let now = inner.clock.now_ms();
            let unhealthy = inner.supervisor.lock().await.unhealthy_children(now);
            for failed in unhealthy {
                let to_restart = inner
                    .supervisor
                    .lock()
                    .await
                    .on_failure(failed, "heartbeat timeout", now);
                for id in to_restart {
                    restart_agent(&inner, id, now).await;
                }
            }
        }
    })
}

async fn restart_agent(inner: &Arc<Inner>, id: crate::ids::AgentId, now: i64) {
    let Some(handle) = inner.registry.get(id) else {
        return;
    };
    let role = handle.role().to_string();
    let slot = inner.registry.slot_of(id);

    let _ = handle.shutdown().await;
    inner.registry.unregister(id);
    inner.supervisor.lock().await.remove_child(id);

    let new_id = crate::ids::AgentId::new();
    let circuit_breaker = Arc::new(CircuitBreaker::new(
        inner.config.failure_threshold,
        inner.config.success_threshold,
        inner.config.open_timeout_ms,
        Arc::clone(&inner.clock),
    ));
    let (runtime, new_handle, _sender) = AgentRuntime::with_supervision(
        new_id,
        role,
        inner.config.mailbox_capacity,
        Arc::clone(&inner.monitor),
        inner.outbound.clone(),
        now,
        circuit_breaker,
        Some(inner.supervisor_id),
    );

    if inner.registry.register(new_handle, slot).is_err() {
        warn!(agent = %id, "could not re-register restarted agent, slot in use");
        return;
    }

    inner
        .supervisor
        .lock()
        .await
        .add_child(new_id, now, inner.config.default_agent_timeout_ms);

    tokio::spawn(runtime.run());
}
