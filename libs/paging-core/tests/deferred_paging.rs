//! Deferred paging against `QuerySource` implementations.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use paging_core::{
    create_page, create_page_async, sortable, CancellationToken, Error, MemoryQuery, PageRequest,
    Paginator, QuerySource, SortKey,
};
use tracing_test::traced_test;

#[derive(Clone, Debug, PartialEq)]
struct Track {
    id: i64,
    title: String,
    plays: u64,
}

sortable!(Track { "Id" => id, "Title" => title, "Plays" => plays });

fn tracks() -> Vec<Track> {
    [
        (1, "Zephyr", 10),
        (2, "Aria", 30),
        (3, "Nocturne", 10),
        (4, "Bolero", 20),
        (5, "Canon", 30),
        (6, "Etude", 10),
        (7, "Fugue", 5),
    ]
    .into_iter()
    .map(|(id, title, plays)| Track {
        id,
        title: title.to_owned(),
        plays,
    })
    .collect()
}

#[tokio::test]
async fn deferred_matches_eager() {
    let requests = [
        PageRequest::new(1, 3).ascending(true).sort_by("plays"),
        PageRequest::new(2, 3).ascending(true).sort_by("plays"),
        PageRequest::new(3, 3).ascending(false).sort_by("PLAYS"),
        PageRequest::new(1, 4).sort_by("title"),
        PageRequest::new(2, 5),
        PageRequest::new(9, 2).ascending(true).sort_by("id"),
    ];

    for req in requests {
        let eager = create_page(Some(tracks()), &req, None).unwrap();
        let deferred = create_page_async(
            Some(MemoryQuery::new(tracks())),
            &req,
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(eager, deferred, "request {req:?}");
    }
}

#[tokio::test]
async fn missing_source_is_an_empty_page() {
    let page = create_page_async(
        None::<MemoryQuery<Track>>,
        &PageRequest::new(2, 10),
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(page.total_count(), 0);
    assert_eq!(page.page_count(), 1);
    assert_eq!(page.page_number(), 2);
    assert!(page.items().is_empty());
}

#[tokio::test]
async fn zero_page_size_policy_matches_eager() {
    let req = PageRequest::new(1, 0);
    let eager = create_page(Some(tracks()), &req, None).unwrap_err();
    let deferred = create_page_async(
        Some(MemoryQuery::new(tracks())),
        &req,
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(eager, Error::InvalidArgument { name: "page_size", .. }));
    assert!(matches!(deferred, Error::InvalidArgument { name: "page_size", .. }));
}

/// Provider double that records calls and can misbehave on demand.
#[derive(Clone, Default)]
struct ScriptedSource {
    counts: Arc<AtomicUsize>,
    fetched: Arc<AtomicBool>,
    cancel_during_count: Option<CancellationToken>,
    count_delay: Option<Duration>,
    fail_count: bool,
}

#[async_trait]
impl QuerySource<Track> for ScriptedSource {
    fn order_by(self, _key: &SortKey<Track>) -> paging_core::Result<Self> {
        Ok(self)
    }

    fn window(self, _skip: u64, _take: u64) -> Self {
        self
    }

    async fn count(&self) -> paging_core::Result<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.count_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(token) = &self.cancel_during_count {
            token.cancel();
        }
        if self.fail_count {
            return Err(Error::provider(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "backend went away",
            )));
        }
        Ok(7)
    }

    async fn fetch(self) -> paging_core::Result<Vec<Track>> {
        self.fetched.store(true, Ordering::SeqCst);
        Ok(tracks())
    }
}

#[tokio::test]
async fn cancellation_before_start_skips_provider() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let source = ScriptedSource::default();
    let err = create_page_async(Some(source.clone()), &PageRequest::default(), None, &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(source.counts.load(Ordering::SeqCst), 0);
    assert!(!source.fetched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn cancellation_after_count_prevents_fetch() {
    let cancel = CancellationToken::new();
    let source = ScriptedSource {
        cancel_during_count: Some(cancel.clone()),
        ..ScriptedSource::default()
    };
    let err = create_page_async(Some(source.clone()), &PageRequest::default(), None, &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(source.counts.load(Ordering::SeqCst), 1);
    assert!(!source.fetched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn cancellation_interrupts_a_pending_count() {
    let cancel = CancellationToken::new();
    let source = ScriptedSource {
        count_delay: Some(Duration::from_secs(30)),
        ..ScriptedSource::default()
    };
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let res = tokio::time::timeout(
        Duration::from_secs(5),
        create_page_async(Some(source.clone()), &PageRequest::default(), None, &cancel),
    )
    .await
    .expect("cancellation must not wait for the provider");
    assert!(res.unwrap_err().is_cancelled());
    assert!(!source.fetched.load(Ordering::SeqCst));
}

#[tokio::test]
async fn provider_errors_propagate_unchanged() {
    let source = ScriptedSource {
        fail_count: true,
        ..ScriptedSource::default()
    };
    let err = create_page_async(
        Some(source),
        &PageRequest::default(),
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    match err {
        Error::Provider(inner) => {
            let io = inner
                .downcast_ref::<std::io::Error>()
                .expect("original error type is preserved");
            assert_eq!(io.kind(), std::io::ErrorKind::ConnectionReset);
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_field_fails_before_touching_provider() {
    let source = ScriptedSource::default();
    let err = create_page_async(
        Some(source.clone()),
        &PageRequest::default().sort_by("Bogus"),
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::FieldNotFound { ref field, .. } if field == "Bogus"));
    assert_eq!(source.counts.load(Ordering::SeqCst), 0);
}

#[traced_test]
#[tokio::test]
async fn emits_page_span() {
    let paginator = Paginator::default();
    paginator
        .create_page_async(
            Some(MemoryQuery::new(tracks())),
            &PageRequest::new(1, 2).sort_by("title"),
            None,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(logs_contain("paging.create_page_async"));
    assert!(logs_contain("fetched page window"));
}
