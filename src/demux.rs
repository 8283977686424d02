//! Delivery receipt demultiplexer.
//!
//! Single long-lived consumer of the receipt channel fed by every session.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::session::{ReceiptEvent, decode_smpp_status};
use crate::store::{MAX_TRY, MessageStore, MessageStatus};

/// Runs the demultiplexer loop until the receipt channel closes (i.e. every
/// session has shut down). Intended to be spawned as the one long-lived demux
/// task.
pub async fn run<S: MessageStore>(store: &S, mut receipts: mpsc::Receiver<ReceiptEvent>) {
    while let Some(event) = receipts.recv().await {
        if let Err(e) = handle_receipt(store, &event).await {
            warn!(id = %event.id, error = %e, "failed to apply delivery receipt");
        }
    }
}

/// Applies a single [`ReceiptEvent`] to the store: correlate by
/// carrier-assigned id, map `DELIVRD`/`REJECTD` to a status transition, and
/// persist the result.
pub async fn handle_receipt<S: MessageStore>(
    store: &S,
    event: &ReceiptEvent,
) -> Result<(), crate::error::GatewayError> {
    let Some(mut message) = store.find_sent_by_message_id(&event.id).await? else {
        info!(id = %event.id, "no sent message matches delivery receipt, dropping");
        return Ok(());
    };

    match event.stat.as_str() {
        "DELIVRD" => {
            message.status = MessageStatus::Delivered;
        }
        "REJECTD" => {
            message.status = MessageStatus::Errored;
            message.last_error = decode_smpp_status(&event.err);
            // Promotes to terminal: find_sent_by_message_id only ever
            // matches a `sent` row, so a `delivered` message can never be
            // reached here and downgraded.
            message.try_count = MAX_TRY;
        }
        other => {
            info!(id = %event.id, stat = other, "unrecognized receipt status, leaving row unchanged");
            return Ok(());
        }
    }

    store.save(&message).await?;
    info!(id = %event.id, status = message.status.as_str(), "delivery receipt applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryMessageStore, MessageStatus};

    async fn seed_sent(store: &InMemoryMessageStore, message_id: &str) -> i64 {
        let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();
        let mut m = store.all().into_iter().find(|m| m.id == id).unwrap();
        m.status = MessageStatus::Sent;
        m.message_id = message_id.to_string();
        store.save(&m).await.unwrap();
        id
    }

    #[tokio::test]
    async fn delivrd_marks_delivered() {
        let store = InMemoryMessageStore::new();
        seed_sent(&store, "abc123").await;

        handle_receipt(
            &store,
            &ReceiptEvent {
                id: "abc123".into(),
                stat: "DELIVRD".into(),
                err: String::new(),
            },
        )
        .await
        .unwrap();

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::Delivered);
    }

    #[tokio::test]
    async fn rejectd_marks_terminal_error_with_decoded_status() {
        let store = InMemoryMessageStore::new();
        seed_sent(&store, "abc123").await;

        handle_receipt(
            &store,
            &ReceiptEvent {
                id: "abc123".into(),
                stat: "REJECTD".into(),
                err: "00000008".into(),
            },
        )
        .await
        .unwrap();

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::Errored);
        assert_eq!(m.try_count, MAX_TRY);
        assert!(!m.last_error.is_empty());
    }

    #[tokio::test]
    async fn unmatched_receipt_is_dropped_not_fatal() {
        let store = InMemoryMessageStore::new();
        let result = handle_receipt(
            &store,
            &ReceiptEvent {
                id: "no-such-id".into(),
                stat: "DELIVRD".into(),
                err: String::new(),
            },
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unknown_stat_leaves_row_unchanged() {
        let store = InMemoryMessageStore::new();
        seed_sent(&store, "abc123").await;

        handle_receipt(
            &store,
            &ReceiptEvent {
                id: "abc123".into(),
                stat: "ENROUTE".into(),
                err: String::new(),
            },
        )
        .await
        .unwrap();

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::Sent);
    }

    #[tokio::test]
    async fn delivered_is_never_downgraded_by_a_later_rejectd() {
        let store = InMemoryMessageStore::new();
        seed_sent(&store, "abc123").await;
        handle_receipt(
            &store,
            &ReceiptEvent {
                id: "abc123".into(),
                stat: "DELIVRD".into(),
                err: String::new(),
            },
        )
        .await
        .unwrap();

        // findSentByMessageId only matches status='sent', so a stray REJECTD
        // arriving after delivery finds nothing to update.
        handle_receipt(
            &store,
            &ReceiptEvent {
                id: "abc123".into(),
                stat: "REJECTD".into(),
                err: "00000008".into(),
            },
        )
        .await
        .unwrap();

        let m = store.all().into_iter().next().unwrap();
        assert_eq!(m.status, MessageStatus::Delivered);
    }
}
