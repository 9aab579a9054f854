//! Debounced rebuild trigger.
//!
//! Bridges the composition root's change detection to the engine:
//! notifications sent on the returned channel are coalesced within a
//! debounce window, then trigger a single rebuild.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::engine::SuggestionEngine;

/// Debounce window for records-changed notifications.
const DEBOUNCE_MS: u64 = 500;

/// Channel buffer for notifications; overflow just drops, the pending
/// notification already guarantees a rebuild.
const CHANNEL_SIZE: usize = 64;

/// Spawn the refresher task and return its notification sender.
///
/// Must be called from within a tokio runtime. The task runs until every
/// sender clone is dropped.
pub fn start_refresher(engine: Arc<SuggestionEngine>) -> mpsc::Sender<()> {
    let (tx, mut rx) = mpsc::channel::<()>(CHANNEL_SIZE);

    tokio::spawn(async move {
        loop {
            if rx.recv().await.is_none() {
                break; // all senders dropped
            }

            // Debounce: drain everything that arrives within the window,
            // then rebuild once.
            sleep(Duration::from_millis(DEBOUNCE_MS)).await;
            while rx.try_recv().is_ok() {}

            log::debug!("Refresher: source records changed, rebuilding");
            engine.notify_records_changed();
        }
        log::debug!("Refresher: stopped");
    });

    tx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordSource;
    use crate::types::{ConversationRecord, MailRecord, SuggestConfig};

    struct EmptySource;

    impl RecordSource for EmptySource {
        fn mail_records(&self) -> Vec<MailRecord> {
            Vec::new()
        }

        fn conversation_records(&self) -> Vec<ConversationRecord> {
            Vec::new()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_a_burst_into_one_rebuild() {
        let engine = Arc::new(SuggestionEngine::new(
            SuggestConfig::default(),
            Arc::new(EmptySource),
        ));
        let mut changes = engine.subscribe_changes();
        changes.borrow_and_update();

        let tx = start_refresher(engine.clone());
        for _ in 0..5 {
            tx.send(()).await.unwrap();
        }

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        // Nothing further once the burst is drained.
        sleep(Duration::from_millis(DEBOUNCE_MS * 4)).await;
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_notifications_each_rebuild() {
        let engine = Arc::new(SuggestionEngine::new(
            SuggestConfig::default(),
            Arc::new(EmptySource),
        ));
        let mut changes = engine.subscribe_changes();
        changes.borrow_and_update();

        let tx = start_refresher(engine.clone());

        tx.send(()).await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);

        sleep(Duration::from_millis(DEBOUNCE_MS * 2)).await;

        tx.send(()).await.unwrap();
        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 2);
    }
}
