//! Batch hydration of collection members.
//!
//! Concurrent mode (`batch_size > 0`) starts every member load at once and waits
//! for all of them; the first failure in collection order is reported after the
//! rest have finished. Sequential mode (`batch_size == 0`) loads members in
//! collection order and stops at the first failure.

use futures::future::join_all;
use tracing::{debug, instrument};

use super::{SyncEngine, SyncOptions};
use crate::error::SyncResult;
use crate::model::Resource;

impl SyncEngine {
    #[instrument(skip_all, fields(collection = %collection.id()))]
    pub(super) async fn hydrate_items(&self, collection: &Resource, options: &SyncOptions) -> SyncResult<()> {
        let items = collection.items();
        let item_options = options.for_items();
        let batch_size = options.batch_size.unwrap_or(self.config.batch_size);

        if batch_size > 0 {
            debug!(count = items.len(), "Loading items concurrently");
            let results = join_all(items.iter().map(|item| self.load(item, &item_options))).await;
            results.into_iter().try_for_each(|result| result.map(drop))
        } else {
            debug!(count = items.len(), "Loading items sequentially");
            for item in &items {
                self.load(item, &item_options).await?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::model::{Feed, FeedItem, Link, LinkedDocument};
    use crate::state::Status;
    use crate::transport::mock::Event;
    use crate::transport::MockTransport;
    use crate::{SyncEngine, SyncOptions};

    const FEED: &str = "https://api.example.com/question";
    const A: &str = "https://api.example.com/question/a";
    const B: &str = "https://api.example.com/question/b";

    fn expect_feed(mock: &MockTransport) {
        mock.expect_load(FEED).return_ok(Feed::new(vec![
            FeedItem::new(A, "a"),
            FeedItem::new(B, "b"),
        ]));
    }

    fn expect_item(mock: &MockTransport, uri: &str, delay: u64) {
        mock.expect_load(uri)
            .with_delay(Duration::from_millis(delay))
            .return_ok(LinkedDocument::new(vec![Link::new("self", uri)]));
    }

    #[tokio::test]
    async fn sequential_items_do_not_overlap() {
        let mock = MockTransport::new();
        expect_feed(&mock);
        expect_item(&mock, A, 20);
        expect_item(&mock, B, 0);
        let engine = SyncEngine::new(mock.clone());

        let questions = engine.factory().collection_from_uri(FEED);
        engine
            .load(&questions, &SyncOptions::default().include_items().sequential())
            .await
            .unwrap();

        let events = mock.events();
        assert_eq!(
            &events[2..],
            &[
                Event::Started(A.into()),
                Event::Finished(A.into()),
                Event::Started(B.into()),
                Event::Finished(B.into()),
            ]
        );
        mock.verify();
    }

    #[tokio::test]
    async fn concurrent_items_overlap() {
        let mock = MockTransport::new();
        expect_feed(&mock);
        expect_item(&mock, A, 20);
        expect_item(&mock, B, 20);
        let engine = SyncEngine::new(mock.clone());

        let questions = engine.factory().collection_from_uri(FEED);
        engine
            .load(&questions, &SyncOptions::default().include_items())
            .await
            .unwrap();

        let events = mock.events();
        assert_eq!(events[2], Event::Started(A.into()));
        assert_eq!(events[3], Event::Started(B.into()));
        assert!(questions
            .items()
            .iter()
            .all(|item| engine.status(item) == Some(Status::Hydrated)));
        mock.verify();
    }

    #[tokio::test]
    async fn sequential_stops_at_first_failure() {
        let mock = MockTransport::new();
        expect_feed(&mock);
        mock.expect_load(A).return_status(404);
        let engine = SyncEngine::new(mock.clone());

        let questions = engine.factory().collection_from_uri(FEED);
        let err = engine
            .load(&questions, &SyncOptions::default().include_items().sequential())
            .await
            .unwrap_err();

        assert!(matches!(err, crate::SyncError::NotFound { uri } if uri == A));
        assert_eq!(mock.call_count(), 2);
        let items = questions.items();
        assert_eq!(engine.status(&items[1]), Some(Status::LocationOnly));
    }

    #[tokio::test]
    async fn concurrent_finishes_all_before_reporting() {
        let mock = MockTransport::new();
        expect_feed(&mock);
        mock.expect_load(A).return_status(404);
        expect_item(&mock, B, 10);
        let engine = SyncEngine::new(mock.clone());

        let questions = engine.factory().collection_from_uri(FEED);
        let err = engine
            .load(&questions, &SyncOptions::default().include_items())
            .await
            .unwrap_err();

        assert!(matches!(err, crate::SyncError::NotFound { .. }));
        let items = questions.items();
        assert_eq!(engine.status(&items[0]), Some(Status::Deleted));
        assert_eq!(engine.status(&items[1]), Some(Status::Hydrated));
        mock.verify();
    }
}
