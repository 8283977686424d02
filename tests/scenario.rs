//! End-to-end lifecycle scenarios against the in-memory store, exercising
//! the store + demultiplexer across the module boundary that a single
//! `#[cfg(test)]` block can't: a message's full journey from insertion
//! through submission to a delivery receipt.

use smpp::demux::handle_receipt;
use smpp::session::ReceiptEvent;
use smpp::store::{MAX_TRY, MessageStatus, MessageStore, InMemoryMessageStore};

/// Happy path: insert, simulate a successful submit, then a
/// `DELIVRD` receipt arrives.
#[tokio::test]
async fn happy_path_insert_submit_deliver() {
    let store = InMemoryMessageStore::new();
    let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();

    let mut message = store.all().into_iter().find(|m| m.id == id).unwrap();
    message.status = MessageStatus::Sent;
    message.message_id = "abc123".to_string();
    store.save(&message).await.unwrap();

    handle_receipt(
        &store,
        &ReceiptEvent {
            id: "abc123".to_string(),
            stat: "DELIVRD".to_string(),
            err: String::new(),
        },
    )
    .await
    .unwrap();

    let m = store.all().into_iter().find(|m| m.id == id).unwrap();
    assert_eq!(m.status, MessageStatus::Delivered);
}

/// Hard reject after a successful submit.
#[tokio::test]
async fn hard_reject_after_sent_becomes_terminal() {
    let store = InMemoryMessageStore::new();
    let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();

    let mut message = store.all().into_iter().find(|m| m.id == id).unwrap();
    message.status = MessageStatus::Sent;
    message.message_id = "abc123".to_string();
    store.save(&message).await.unwrap();

    handle_receipt(
        &store,
        &ReceiptEvent {
            id: "abc123".to_string(),
            stat: "REJECTD".to_string(),
            err: "00000008".to_string(),
        },
    )
    .await
    .unwrap();

    let m = store.all().into_iter().find(|m| m.id == id).unwrap();
    assert_eq!(m.status, MessageStatus::Errored);
    assert_eq!(m.try_count, MAX_TRY);
    assert!(store.select_terminal_errors().await.unwrap().iter().any(|t| t.id == id));
}

/// Three transient failures spaced by the retry backoff exhaust
/// MaxTry and the row becomes — and stays — a terminal error.
#[tokio::test]
async fn max_retries_excludes_row_from_future_eligibility() {
    let store = InMemoryMessageStore::new();
    let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();

    for attempt in 1..=MAX_TRY {
        let mut message = store.all().into_iter().find(|m| m.id == id).unwrap();
        message.status = MessageStatus::Errored;
        message.try_count = attempt;
        message.last_error = "transient".to_string();
        // Backdate updatedAt so this row would normally clear the retry
        // backoff window between attempts; InMemoryMessageStore.save()
        // always stamps "now", so we only assert the final invariant here.
        store.save(&message).await.unwrap();
    }

    let m = store.all().into_iter().find(|m| m.id == id).unwrap();
    assert_eq!(m.try_count, MAX_TRY);
    assert!(m.is_terminal_error());
    assert!(!m.is_eligible(chrono::Utc::now()));
}
