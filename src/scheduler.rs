//! Periodic and on-demand batch send loop.
//!
//! Three cooperating tasks sharing a `DrainScheduler`: a tick task firing a
//! flush signal every `SendInterval`, intake handlers coalescing on-demand
//! flush signals into the same channel, and a drain task that actually
//! submits eligible messages through the session pool.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::pool::SessionPool;
use crate::store::{MessageStore, MessageStatus};

/// Messages attempted per drain pass.
pub const MESSAGES_PER_INTERVAL: u32 = 30;
/// Period between periodic ticks.
pub const SEND_INTERVAL: Duration = Duration::from_secs(60);
/// Startup delay before the first periodic tick.
const STARTUP_DELAY: Duration = Duration::from_secs(2);

/// Flush-signal sender handed to intake handlers; `try_send` on a
/// capacity-1 channel gives the same "coalesce bursts, never block the
/// caller" semantics as a non-blocking send over an unbuffered channel —
/// Tokio's `mpsc` can't be constructed with zero capacity, so capacity-1
/// plus `try_send` is the closest equivalent.
#[derive(Clone)]
pub struct FlushSignal {
    tx: mpsc::Sender<()>,
}

impl FlushSignal {
    /// Requests a drain. Dropped (not queued) if one is already pending or
    /// in progress — the next periodic tick catches any residue.
    pub fn signal(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Drives the three scheduler tasks against a session pool and a message
/// store. `send_disabled` mirrors the config flag of the same name.
pub struct DrainScheduler<S: MessageStore> {
    store: Arc<S>,
    pool: Arc<SessionPool>,
    send_disabled: bool,
}

impl<S: MessageStore + 'static> DrainScheduler<S> {
    pub fn new(store: Arc<S>, pool: Arc<SessionPool>, send_disabled: bool) -> Self {
        Self {
            store,
            pool,
            send_disabled,
        }
    }

    /// Spawns the tick and drain tasks and returns the [`FlushSignal`] intake
    /// handlers should call after every `queueSend`.
    pub fn spawn(self: Arc<Self>) -> FlushSignal {
        let (tx, rx) = mpsc::channel(1);

        let drain_scheduler = Arc::clone(&self);
        tokio::spawn(async move { drain_scheduler.drain_loop(rx).await });

        let tick_tx = tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(STARTUP_DELAY).await;
            loop {
                let _ = tick_tx.try_send(());
                tokio::time::sleep(SEND_INTERVAL).await;
            }
        });

        FlushSignal { tx }
    }

    async fn drain_loop(self: Arc<Self>, mut signal: mpsc::Receiver<()>) {
        while signal.recv().await.is_some() {
            self.drain_once().await;
        }
    }

    /// One drain pass: selects up to `MESSAGES_PER_INTERVAL` eligible rows
    /// and attempts to submit each.
    pub async fn drain_once(&self) {
        let batch = match self.store.select_eligible(MESSAGES_PER_INTERVAL).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "failed to select eligible messages");
                return;
            }
        };
        info!(count = batch.len(), "messages in queue");

        if self.send_disabled {
            warn!("send disabled by config, batch not submitted");
            return;
        }

        for mut message in batch {
            let session = match self.pool.pick() {
                Ok(session) => session,
                Err(e) => {
                    // Pool may recover for a later row or the next tick; do
                    // not abort the whole batch on this alone.
                    warn!(error = %e, id = message.id, "no session available, skipping row");
                    continue;
                }
            };

            match session.submit(&message.from, &message.phone, &message.text).await {
                Ok(message_id) => {
                    message.message_id = message_id;
                    message.status = MessageStatus::Sent;
                    if let Err(e) = self.store.save(&message).await {
                        warn!(error = %e, id = message.id, "failed to persist sent message");
                    } else {
                        info!(id = message.id, from = %message.from, dest = %message.phone, "submit ok");
                    }
                }
                Err(e) => {
                    message.status = MessageStatus::Errored;
                    message.try_count += 1;
                    message.last_error = e.to_string();
                    if let Err(save_err) = self.store.save(&message).await {
                        warn!(error = %save_err, id = message.id, "failed to persist errored message");
                    }
                    warn!(error = %e, id = message.id, from = %message.from, dest = %message.phone, "submit failed, aborting batch");
                    // A submit failure usually signals a session/network
                    // problem; continuing would burn quota on the rest of
                    // this tick's rows. No sleep: the next tick alone
                    // provides the backoff.
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryMessageStore, MAX_TRY};

    #[tokio::test]
    async fn empty_pool_leaves_new_messages_untouched() {
        let store = Arc::new(InMemoryMessageStore::new());
        store.insert("ACME", "+71234567890", "hi").await.unwrap();
        let pool = Arc::new(SessionPool::new(vec![]));
        let scheduler = DrainScheduler::new(store.clone(), pool, false);

        scheduler.drain_once().await;

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::New);
    }

    #[tokio::test]
    async fn send_disabled_selects_but_does_not_submit() {
        let store = Arc::new(InMemoryMessageStore::new());
        store.insert("ACME", "+71234567890", "hi").await.unwrap();
        let pool = Arc::new(SessionPool::new(vec![]));
        let scheduler = DrainScheduler::new(store.clone(), pool, true);

        scheduler.drain_once().await;

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::New);
    }

    #[tokio::test]
    async fn max_retries_makes_a_row_terminal() {
        let store = Arc::new(InMemoryMessageStore::new());
        let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();

        // Simulate MAX_TRY consecutive transient failures directly against
        // the store (no live pool needed to exercise the terminal-count
        // invariant: tryCount monotonic, bounded by MAX_TRY).
        for _ in 0..MAX_TRY {
            let mut m = store.all().into_iter().find(|m| m.id == id).unwrap();
            m.status = MessageStatus::Errored;
            m.try_count += 1;
            store.save(&m).await.unwrap();
        }

        let terminal = store.select_terminal_errors().await.unwrap();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].try_count, MAX_TRY);
    }

    #[tokio::test]
    async fn flush_signal_coalesces_rapid_sends() {
        let store = Arc::new(InMemoryMessageStore::new());
        let pool = Arc::new(SessionPool::new(vec![]));
        let scheduler = Arc::new(DrainScheduler::new(store, pool, true));
        let flush = scheduler.spawn();

        for _ in 0..100 {
            flush.signal();
        }
        // try_send on a capacity-1 channel means at most one signal is ever
        // queued regardless of how many callers raced to send it.
    }
}
