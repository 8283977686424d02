//! Integration coverage for the delivery demultiplexer driven entirely
//! through the crate's public API, as a companion to the inline
//! `#[cfg(test)]` unit tests in `src/demux.rs` which exercise internals the
//! public surface doesn't expose (e.g. constructing rows directly).

use smpp::demux::handle_receipt;
use smpp::session::ReceiptEvent;
use smpp::store::{MAX_TRY, MessageStatus, MessageStore, InMemoryMessageStore};

async fn seeded_sent(store: &InMemoryMessageStore, message_id: &str) -> i64 {
    let id = store.insert("ACME", "+71234567890", "hi").await.unwrap();
    let mut message = store.all().into_iter().find(|m| m.id == id).unwrap();
    message.status = MessageStatus::Sent;
    message.message_id = message_id.to_string();
    store.save(&message).await.unwrap();
    id
}

#[tokio::test]
async fn run_drains_the_receipt_channel_until_closed() {
    let store = InMemoryMessageStore::new();
    seeded_sent(&store, "abc123").await;

    let (tx, rx) = tokio::sync::mpsc::channel(4);
    tx.send(ReceiptEvent {
        id: "abc123".to_string(),
        stat: "DELIVRD".to_string(),
        err: String::new(),
    })
    .await
    .unwrap();
    drop(tx);

    smpp::demux::run(&store, rx).await;

    let m = store.all().into_iter().next().unwrap();
    assert_eq!(m.status, MessageStatus::Delivered);
}

#[tokio::test]
async fn terminal_rejection_surfaces_in_unsent_messages() {
    let store = InMemoryMessageStore::new();
    seeded_sent(&store, "xyz789").await;

    handle_receipt(
        &store,
        &ReceiptEvent {
            id: "xyz789".to_string(),
            stat: "REJECTD".to_string(),
            err: "00000008".to_string(),
        },
    )
    .await
    .unwrap();

    let terminal = store.select_terminal_errors().await.unwrap();
    assert_eq!(terminal.len(), 1);
    assert_eq!(terminal[0].try_count, MAX_TRY);
}
