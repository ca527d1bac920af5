//! Per-version preview state.
//!
//! Every version moves through `Idle -> Loading -> Ready | Failed`, and a
//! `Failed` version goes back to `Loading` when it is requested again. While a
//! version is `Loading`, further requests attach to the retrieval already in
//! flight instead of starting another one. Retrievals run as their own tasks,
//! so a caller that stops waiting never cancels them.

use crate::error::{ErrorKind, Result};
use crate::fetcher::PreviewFetcher;
use crate::result::PreviewResult;
use exn::ResultExt;
use folio_model::{DocId, VersionId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

type Outcome = std::result::Result<Arc<PreviewResult>, ErrorKind>;

/// Snapshot of one version's preview state.
#[derive(Debug, Clone)]
pub enum PreviewState {
    /// Never requested, or evicted.
    Idle,
    Loading,
    Ready(Arc<PreviewResult>),
    Failed(ErrorKind),
}

impl PreviewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// A version paired with its current state.
#[derive(Debug, Clone)]
pub struct PreviewEntry {
    pub version_id: VersionId,
    pub state: PreviewState,
}

enum Slot {
    Loading {
        ticket: u64,
        outcome: watch::Receiver<Option<Outcome>>,
    },
    Ready(Arc<PreviewResult>),
    Failed(ErrorKind),
}

impl Slot {
    fn state(&self) -> PreviewState {
        match self {
            Self::Loading { .. } => PreviewState::Loading,
            Self::Ready(result) => PreviewState::Ready(Arc::clone(result)),
            Self::Failed(kind) => PreviewState::Failed(kind.clone()),
        }
    }
}

enum Begin {
    Cached(Arc<PreviewResult>),
    Wait {
        ticket: u64,
        outcome: watch::Receiver<Option<Outcome>>,
    },
}

struct Shared {
    fetcher: PreviewFetcher,
    slots: Mutex<HashMap<VersionId, Slot>>,
    tickets: AtomicU64,
}

impl Shared {
    fn slots(&self) -> MutexGuard<'_, HashMap<VersionId, Slot>> {
        // Nothing panics while the lock is held, and every write leaves the map consistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one retrieval to completion and publish its outcome.
    ///
    /// The outcome is only stored if the slot still belongs to this retrieval;
    /// waiters are always told.
    async fn settle(
        self: Arc<Self>,
        doc_id: DocId,
        version_id: VersionId,
        ticket: u64,
        sender: watch::Sender<Option<Outcome>>,
    ) {
        let outcome = match self.fetcher.retrieve(doc_id, version_id).await {
            Ok(result) => Ok(Arc::new(result)),
            Err(err) => {
                let kind = (*err).clone();
                tracing::warn!(%doc_id, %version_id, error = %kind, "Preview retrieval failed");
                tracing::debug!(?err, "Preview failure detail");
                Err(kind)
            },
        };
        let stored = {
            let mut slots = self.slots();
            let current = matches!(slots.get(&version_id), Some(Slot::Loading { ticket: t, .. }) if *t == ticket);
            if current {
                let slot = match &outcome {
                    Ok(result) => Slot::Ready(Arc::clone(result)),
                    Err(kind) => Slot::Failed(kind.clone()),
                };
                slots.insert(version_id, slot);
            }
            current
        };
        if !stored {
            tracing::debug!(%version_id, "Preview evicted while loading; outcome not kept");
        }
        sender.send_replace(Some(outcome));
    }
}

/// Keyed preview cache shared by every view.
///
/// Cheap to clone; clones share state. Entries live until they are
/// [evicted](Self::evict) or the store is [cleared](Self::clear).
///
/// # Examples
///
/// ```no_run
/// use folio_model::{DocId, VersionId};
/// use folio_preview::{PreviewFetcher, PreviewStore, error::Result};
/// use folio_transport::SessionHandle;
///
/// async fn show(session: SessionHandle) -> Result<()> {
///     let store = PreviewStore::new(PreviewFetcher::new(session));
///     let preview = store.request(DocId::new(4), VersionId::new(12)).await?;
///     if let Some(text) = preview.as_text() {
///         println!("{text}");
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct PreviewStore {
    shared: Arc<Shared>,
}

impl PreviewStore {
    pub fn new(fetcher: PreviewFetcher) -> Self {
        Self {
            shared: Arc::new(Shared {
                fetcher,
                slots: Mutex::new(HashMap::new()),
                tickets: AtomicU64::new(0),
            }),
        }
    }

    /// Get the preview of `version_id`, retrieving it if necessary.
    ///
    /// - `Ready`: returns the stored result without touching the network.
    /// - `Loading`: waits for the retrieval already in flight.
    /// - `Idle` or `Failed`: starts a new retrieval and waits for it.
    ///
    /// Dropping the returned future only stops waiting; the retrieval carries
    /// on and its outcome is still stored.
    pub async fn request(&self, doc_id: DocId, version_id: VersionId) -> Result<Arc<PreviewResult>> {
        let (ticket, mut outcome) = match self.begin(doc_id, version_id) {
            Begin::Cached(result) => return Ok(result),
            Begin::Wait { ticket, outcome } => (ticket, outcome),
        };
        let settled = match outcome.wait_for(Option::is_some).await {
            Ok(settled) => settled.clone(),
            Err(err) => {
                self.abandon(version_id, ticket);
                return Err(err).or_raise(|| ErrorKind::Abandoned);
            },
        };
        match settled {
            Some(Ok(result)) => Ok(result),
            Some(Err(kind)) => Err(exn::Exn::from(kind)),
            None => exn::bail!(ErrorKind::Abandoned),
        }
    }

    fn begin(&self, doc_id: DocId, version_id: VersionId) -> Begin {
        let mut slots = self.shared.slots();
        match slots.get(&version_id) {
            Some(Slot::Ready(result)) => {
                tracing::trace!(%version_id, "Preview cached");
                return Begin::Cached(Arc::clone(result));
            },
            Some(Slot::Loading { ticket, outcome }) if !is_orphaned(outcome) => {
                tracing::trace!(%version_id, "Joining preview retrieval in flight");
                return Begin::Wait {
                    ticket: *ticket,
                    outcome: outcome.clone(),
                };
            },
            Some(Slot::Loading { .. }) => {
                tracing::warn!(%version_id, "Preview retrieval stopped without an outcome; restarting");
            },
            Some(Slot::Failed(_)) | None => {},
        }
        let ticket = self.shared.tickets.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = watch::channel(None);
        slots.insert(
            version_id,
            Slot::Loading {
                ticket,
                outcome: receiver.clone(),
            },
        );
        drop(slots);
        tracing::debug!(%doc_id, %version_id, "Starting preview retrieval");
        tokio::spawn(Arc::clone(&self.shared).settle(doc_id, version_id, ticket, sender));
        Begin::Wait {
            ticket,
            outcome: receiver,
        }
    }

    /// Mark a retrieval that vanished without an outcome as failed, so the
    /// next request starts over instead of waiting on it.
    fn abandon(&self, version_id: VersionId, ticket: u64) {
        let mut slots = self.shared.slots();
        if matches!(slots.get(&version_id), Some(Slot::Loading { ticket: t, .. }) if *t == ticket) {
            tracing::warn!(%version_id, "Preview retrieval abandoned");
            slots.insert(version_id, Slot::Failed(ErrorKind::Abandoned));
        }
    }

    /// Current state of `version_id`.
    pub fn state(&self, version_id: VersionId) -> PreviewState {
        self.shared.slots().get(&version_id).map_or(PreviewState::Idle, Slot::state)
    }

    pub fn entry(&self, version_id: VersionId) -> PreviewEntry {
        PreviewEntry {
            version_id,
            state: self.state(version_id),
        }
    }

    /// Snapshot of every tracked (non-idle) version.
    pub fn entries(&self) -> Vec<PreviewEntry> {
        self.shared
            .slots()
            .iter()
            .map(|(version_id, slot)| PreviewEntry {
                version_id: *version_id,
                state: slot.state(),
            })
            .collect()
    }

    /// Forget `version_id`, returning it to `Idle`.
    ///
    /// A retrieval in flight keeps running and still answers its waiters, but
    /// its outcome is discarded. An image nobody else holds is deleted now;
    /// otherwise it goes when the last holder drops it. Returns `false` if the
    /// version was already idle.
    pub fn evict(&self, version_id: VersionId) -> bool {
        let removed = self.shared.slots().remove(&version_id);
        match removed {
            Some(slot) => {
                tracing::debug!(%version_id, "Evicted preview");
                release(slot);
                true
            },
            None => false,
        }
    }

    /// Evict every version.
    pub fn clear(&self) {
        let drained: Vec<Slot> = self.shared.slots().drain().map(|(_, slot)| slot).collect();
        tracing::debug!(entries = drained.len(), "Cleared preview store");
        drained.into_iter().for_each(release);
    }

    /// Number of tracked (non-idle) versions.
    pub fn len(&self) -> usize {
        self.shared.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PreviewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewStore").field("fetcher", &self.shared.fetcher).field("entries", &self.len()).finish()
    }
}

/// The retrieval behind `outcome` ended (its task was dropped or panicked)
/// without publishing anything.
fn is_orphaned(outcome: &watch::Receiver<Option<Outcome>>) -> bool {
    outcome.has_changed().is_err() && outcome.borrow().is_none()
}

fn release(slot: Slot) {
    let Slot::Ready(result) = slot else {
        return;
    };
    match Arc::try_unwrap(result) {
        Ok(PreviewResult::Image(image)) => {
            if let Err(err) = image.release() {
                tracing::warn!(?err, "Failed to release preview image");
            }
        },
        Ok(PreviewResult::Text(_)) => {},
        Err(_) => tracing::trace!("Preview still held elsewhere; released on last drop"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_transport::{Credential, MockTransport, Response, Session};
    use futures::FutureExt;

    const DOC: DocId = DocId::new(4);
    const V1: VersionId = VersionId::new(12);
    const V2: VersionId = VersionId::new(13);

    fn store(transport: &Arc<MockTransport>) -> PreviewStore {
        let session = Session::new(transport.clone(), Credential::bearer("token")).into_handle();
        PreviewStore::new(PreviewFetcher::new(session))
    }

    async fn started(transport: &MockTransport, path: &str, calls: usize) {
        while transport.calls(path).await < calls {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_idle_until_requested() {
        let transport = Arc::new(MockTransport::default());
        let store = store(&transport);
        assert!(matches!(store.state(V1), PreviewState::Idle));
        assert!(store.is_empty());
        assert!(!store.evict(V1));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_retrieval() {
        let transport =
            Arc::new(MockTransport::default().held().with_route("/preview/4/12", Response::ok("text/plain", "hello")));
        let store = store(&transport);
        let first = store.request(DOC, V1);
        let second = store.request(DOC, V1);
        let release = async {
            started(&transport, "/preview/4/12", 1).await;
            assert!(store.state(V1).is_loading());
            transport.release(1);
        };
        let (first, second, ()) = tokio::join!(first, second, release);
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.as_text(), Some("hello"));
        assert_eq!(transport.calls("/preview/4/12").await, 1);
    }

    #[tokio::test]
    async fn test_ready_is_served_without_network() {
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::ok("text/plain", "hi")));
        let store = store(&transport);
        let first = store.request(DOC, V1).await.unwrap();
        assert!(matches!(store.state(V1), PreviewState::Ready(_)));
        let second = store.request(DOC, V1).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(transport.calls("/preview/4/12").await, 1);
    }

    #[tokio::test]
    async fn test_failed_request_retries_on_next_request() {
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::status_only(503)));
        let store = store(&transport);
        let err = store.request(DOC, V1).await.unwrap_err();
        assert_eq!(*err, ErrorKind::HttpStatus(503));
        assert!(matches!(store.state(V1), PreviewState::Failed(ErrorKind::HttpStatus(503))));

        transport.set_route("/preview/4/12", Response::ok("text/plain", "back")).await;
        let result = store.request(DOC, V1).await.unwrap();
        assert_eq!(result.as_text(), Some("back"));
        assert_eq!(transport.calls("/preview/4/12").await, 2);
    }

    #[tokio::test]
    async fn test_non_success_is_never_shown_as_text() {
        let transport = Arc::new(MockTransport::default().with_route(
            "/preview/4/12",
            Response::new(500, Some("text/plain".to_string()), "Internal Server Error"),
        ));
        let store = store(&transport);
        assert!(store.request(DOC, V1).await.is_err());
        assert!(matches!(store.state(V1), PreviewState::Failed(_)));
    }

    #[tokio::test]
    async fn test_versions_are_independent() {
        let transport = Arc::new(
            MockTransport::default()
                .with_route("/preview/4/12", Response::status_only(500))
                .with_route("/preview/4/13", Response::ok("text/plain", "fine")),
        );
        let store = store(&transport);
        let (first, second) = tokio::join!(store.request(DOC, V1), store.request(DOC, V2));
        assert!(first.is_err());
        assert_eq!(second.unwrap().as_text(), Some("fine"));
        assert!(matches!(store.state(V1), PreviewState::Failed(_)));
        assert!(matches!(store.state(V2), PreviewState::Ready(_)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_wait_does_not_cancel_retrieval() {
        let transport =
            Arc::new(MockTransport::default().held().with_route("/preview/4/12", Response::ok("text/plain", "late")));
        let store = store(&transport);
        // Poll once to start the retrieval, then stop waiting.
        assert!(store.request(DOC, V1).now_or_never().is_none());
        started(&transport, "/preview/4/12", 1).await;
        assert!(store.state(V1).is_loading());

        transport.release(1);
        let result = store.request(DOC, V1).await.unwrap();
        assert_eq!(result.as_text(), Some("late"));
        assert_eq!(transport.calls("/preview/4/12").await, 1);
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
    }

    #[test]
    fn test_retrieval_lost_with_its_runtime_is_restarted() {
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::ok("text/plain", "again")));
        let store = store(&transport);
        let first = runtime();
        first.block_on(async { assert!(store.request(DOC, V1).now_or_never().is_none()) });
        // Shutting the runtime down drops the retrieval before it ever ran.
        drop(first);
        assert!(store.state(V1).is_loading());

        let result = runtime().block_on(store.request(DOC, V1)).unwrap();
        assert_eq!(result.as_text(), Some("again"));
        assert!(matches!(store.state(V1), PreviewState::Ready(_)));
    }

    #[test]
    fn test_waiter_of_lost_retrieval_marks_it_failed() {
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::ok("text/plain", "later")));
        let store = store(&transport);
        let mut pending = Box::pin(store.request(DOC, V1));
        let first = runtime();
        first.block_on(async { assert!((&mut pending).now_or_never().is_none()) });
        drop(first);

        let second = runtime();
        let err = second.block_on(pending).unwrap_err();
        assert_eq!(*err, ErrorKind::Abandoned);
        assert!(matches!(store.state(V1), PreviewState::Failed(ErrorKind::Abandoned)));

        let result = second.block_on(store.request(DOC, V1)).unwrap();
        assert_eq!(result.as_text(), Some("later"));
        assert_eq!(second.block_on(transport.calls("/preview/4/12")), 1);
    }

    #[tokio::test]
    async fn test_evict_while_loading_discards_outcome() {
        let transport =
            Arc::new(MockTransport::default().held().with_route("/preview/4/12", Response::ok("text/plain", "gone")));
        let store = store(&transport);
        let pending = store.request(DOC, V1);
        let evict = async {
            started(&transport, "/preview/4/12", 1).await;
            assert!(store.evict(V1));
            transport.release(1);
        };
        let (result, ()) = tokio::join!(pending, evict);
        // The waiter still gets its answer.
        assert_eq!(result.unwrap().as_text(), Some("gone"));
        assert!(matches!(store.state(V1), PreviewState::Idle));
    }

    #[tokio::test]
    async fn test_evicted_image_outlives_its_holders() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::ok("image/png", vec![7; 16])));
        let session = Session::new(transport.clone(), Credential::bearer("token")).into_handle();
        let store = PreviewStore::new(PreviewFetcher::new(session).with_scratch_dir(dir.path()));

        let shown = store.request(DOC, V1).await.unwrap();
        let path = shown.as_image().unwrap().to_path_buf();
        assert!(store.evict(V1));
        assert!(path.exists());
        drop(shown);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_clear_releases_unheld_images() {
        let dir = tempfile::tempdir().unwrap();
        let transport = Arc::new(MockTransport::default().with_route("/preview/4/12", Response::ok("image/gif", vec![1])));
        let session = Session::new(transport.clone(), Credential::bearer("token")).into_handle();
        let store = PreviewStore::new(PreviewFetcher::new(session).with_scratch_dir(dir.path()));

        let path = store.request(DOC, V1).await.unwrap().as_image().unwrap().to_path_buf();
        assert!(path.exists());
        store.clear();
        assert!(!path.exists());
        assert!(store.is_empty());
    }
}
