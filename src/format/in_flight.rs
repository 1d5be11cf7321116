//! Per-document registry of running format requests.
//!
//! At most one request per URI is live. Registering a new one hands back the
//! previous entry so the caller can cancel it and wait until it has fully
//! settled (its process killed and reaped) before starting another.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Monotonically increasing id for registered formats
static NEXT_FORMAT_ID: AtomicU64 = AtomicU64::new(1);

fn next_format_id() -> u64 {
    NEXT_FORMAT_ID.fetch_add(1, Ordering::SeqCst)
}

/// Handle on one running format request.
#[derive(Debug, Clone)]
pub struct InFlightFormat {
    id: u64,
    /// Fired to stop the request
    cancel: CancellationToken,
    /// Fired once the request has produced its result (or was dropped)
    settled: CancellationToken,
}

impl InFlightFormat {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the request and wait until it has settled.
    pub async fn supersede(self) {
        self.cancel.cancel();
        self.settled.cancelled().await;
    }
}

/// Tracks the live format request of every document.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    active: Arc<DashMap<Url, InFlightFormat>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `uri`.
    ///
    /// The new entry's cancel token is a child of `parent` when given, so an
    /// external cancellation reaches it while superseding it does not reach
    /// the parent. The swap is atomic: the previous entry (if any) is returned
    /// and no third request can observe it afterwards.
    pub fn register(
        &self,
        uri: &Url,
        parent: Option<&CancellationToken>,
    ) -> (InFlightGuard, Option<InFlightFormat>) {
        let entry = InFlightFormat {
            id: next_format_id(),
            cancel: parent.map_or_else(CancellationToken::new, CancellationToken::child_token),
            settled: CancellationToken::new(),
        };
        let previous = self.active.insert(uri.clone(), entry.clone());
        let guard = InFlightGuard {
            active: Arc::clone(&self.active),
            uri: uri.clone(),
            entry,
        };
        (guard, previous)
    }

    /// Cancel the live request for `uri`, if any. Used when a document closes.
    pub fn cancel(&self, uri: &Url) {
        if let Some(entry) = self.active.get(uri) {
            entry.cancel.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// Owned by the running request; deregisters and signals settlement on drop.
///
/// Dropping covers every exit path, including the request future itself
/// being dropped by an LSP `$/cancelRequest`.
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<DashMap<Url, InFlightFormat>>,
    uri: Url,
    entry: InFlightFormat,
}

impl InFlightGuard {
    /// Token that fires when this request is canceled or superseded.
    pub fn token(&self) -> &CancellationToken {
        &self.entry.cancel
    }

    pub fn is_canceled(&self) -> bool {
        self.entry.cancel.is_cancelled()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let id = self.entry.id;
        self.active.remove_if(&self.uri, |_, entry| entry.id == id);
        self.entry.settled.cancel();
    }
}
