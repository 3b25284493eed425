//! Registry of in-flight calls for duplicate-request cancellation.
//!
//! Each registered call owns a [`PendingGuard`]. Registering a key that is
//! already present cancels the older call's token. Dropping a guard removes
//! its entry only if the entry still belongs to that guard, so an older call
//! settling late can never evict the newer call that replaced it.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct PendingEntry {
    seq: u64,
    token: CancellationToken,
}

/// In-flight calls keyed by dedup key
#[derive(Debug, Default)]
pub struct PendingRegistry {
    entries: DashMap<String, PendingEntry>,
    next_seq: AtomicU64,
}

impl PendingRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a call under `key`, cancelling any call already holding it.
    #[must_use]
    pub fn register(self: &Arc<Self>, key: String) -> PendingGuard {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self.entries.insert(
            key.clone(),
            PendingEntry {
                seq,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(key = %key, "Cancelling in-flight duplicate request");
            previous.token.cancel();
        }

        PendingGuard {
            registry: Arc::clone(self),
            key,
            seq,
            token,
        }
    }

    /// Number of registered calls
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no calls are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Registration of one in-flight call; removes itself on drop
#[derive(Debug)]
pub struct PendingGuard {
    registry: Arc<PendingRegistry>,
    key: String,
    seq: u64,
    token: CancellationToken,
}

impl PendingGuard {
    /// Token cancelled when a newer duplicate replaces this call
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The dedup key this call is registered under
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let seq = self.seq;
        self.registry
            .entries
            .remove_if(&self.key, |_, entry| entry.seq == seq);
    }
}
