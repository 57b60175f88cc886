//! Process-wide response cache.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::origin::{ForwardError, OriginResponse};

/// Build the cache key for a request.
pub fn cache_key(host: &str, path: &str) -> String {
    let mut key = String::with_capacity(host.len() + path.len());
    key.push_str(host);
    key.push_str(path);
    key
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Already cached, or filled by a concurrent fetch this caller waited on.
    Hit,
    /// Fetched from the origin by this caller.
    Miss,
}

/// Result of [`ResponseCache::get_or_fetch`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub response: OriginResponse,
    pub status: CacheStatus,
}

/// Why a slot was left empty after a fetch.
enum Unfilled {
    Failed(ForwardError),
    Sentinel(OriginResponse),
}

/// A thread-safe (host, path) → origin response store.
///
/// Each key owns a slot that is filled at most once. Clones share the same
/// underlying map.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
    slots: Arc<DashMap<String, Arc<OnceCell<OriginResponse>>>>,
}

impl ResponseCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, host: &str, path: &str) -> Option<OriginResponse> {
        self.slots
            .get(&cache_key(host, path))
            .and_then(|slot| slot.get().cloned())
    }

    /// Store `response` unless it is a sentinel payload or the key is
    /// already filled. Returns whether the response was stored.
    pub fn store(&self, host: &str, path: &str, response: OriginResponse) -> bool {
        if response.is_sentinel() {
            tracing::debug!(host = %host, path = %path, "Refusing to cache sentinel payload");
            return false;
        }
        self.slot(host, path).set(response).is_ok()
    }

    /// Return the cached response, or run `fetch` and cache its result.
    ///
    /// At most one `fetch` runs per key at a time; concurrent callers wait
    /// for it. A failed fetch leaves the key empty so the next caller
    /// tries again.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        host: &str,
        path: &str,
        fetch: F,
    ) -> Result<Fetched, ForwardError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OriginResponse, ForwardError>>,
    {
        if let Some(response) = self.lookup(host, path) {
            return Ok(Fetched {
                response,
                status: CacheStatus::Hit,
            });
        }

        let slot = self.slot(host, path);
        let mut fetched = false;
        let filled = slot
            .get_or_try_init(|| {
                fetched = true;
                async move {
                    match fetch().await {
                        Ok(response) if response.is_sentinel() => Err(Unfilled::Sentinel(response)),
                        Ok(response) => Ok(response),
                        Err(e) => Err(Unfilled::Failed(e)),
                    }
                }
            })
            .await
            .cloned();
        let cell = Arc::as_ptr(&slot);
        drop(slot);

        let unfilled = match filled {
            Ok(response) => {
                return Ok(Fetched {
                    response,
                    status: if fetched { CacheStatus::Miss } else { CacheStatus::Hit },
                })
            }
            Err(unfilled) => unfilled,
        };

        self.discard_unfilled(host, path, cell);
        match unfilled {
            Unfilled::Sentinel(response) => Ok(Fetched {
                response,
                status: CacheStatus::Miss,
            }),
            Unfilled::Failed(e) => Err(e),
        }
    }

    /// Number of keys holding a response.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, host: &str, path: &str) -> Arc<OnceCell<OriginResponse>> {
        Arc::clone(&self.slots.entry(cache_key(host, path)).or_default())
    }

    /// Drop the slot `cell` for this key if it is still empty and nobody
    /// else holds it. A caller still waiting on it retries and cleans up.
    fn discard_unfilled(&self, host: &str, path: &str, cell: *const OnceCell<OriginResponse>) {
        self.slots.remove_if(&cache_key(host, path), |_, slot| {
            Arc::as_ptr(slot) == cell && Arc::strong_count(slot) == 1 && !slot.initialized()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origin::error::{CONNECTION_FAILED, TIMED_OUT, UNRESOLVED_HOST};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn body(text: &'static str) -> OriginResponse {
        OriginResponse::from(text.as_bytes())
    }

    #[test]
    fn store_then_lookup() {
        let cache = ResponseCache::new();
        assert!(cache.lookup("a.com", "/x").is_none());

        assert!(cache.store("a.com", "/x", body("one")));
        assert_eq!(cache.lookup("a.com", "/x"), Some(body("one")));
        assert_eq!(cache.lookup("a.com", "/x"), Some(body("one")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn distinct_keys_do_not_mix() {
        let cache = ResponseCache::new();
        cache.store("a.com", "/x", body("ax"));
        cache.store("b.com", "/x", body("bx"));

        assert_eq!(cache.lookup("a.com", "/x"), Some(body("ax")));
        assert_eq!(cache.lookup("b.com", "/x"), Some(body("bx")));
        assert!(cache.lookup("a.com", "/y").is_none());
    }

    #[test]
    fn key_is_plain_concatenation() {
        let cache = ResponseCache::new();
        cache.store("a.com", "/bc", body("first"));
        // "a.co" + "m/bc" collides by design.
        assert_eq!(cache.lookup("a.co", "m/bc"), Some(body("first")));
        assert_eq!(cache_key("a.com", "/p?q=1"), "a.com/p?q=1");
    }

    #[test]
    fn first_store_wins() {
        let cache = ResponseCache::new();
        assert!(cache.store("a.com", "/", body("first")));
        assert!(!cache.store("a.com", "/", body("second")));
        assert_eq!(cache.lookup("a.com", "/"), Some(body("first")));
    }

    #[test]
    fn sentinels_are_never_stored() {
        let cache = ResponseCache::new();
        for sentinel in [UNRESOLVED_HOST, TIMED_OUT, CONNECTION_FAILED] {
            assert!(!cache.store("a.com", "/", OriginResponse::from(sentinel)));
            assert!(cache.lookup("a.com", "/").is_none());
        }
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = ResponseCache::new();

        let first = cache
            .get_or_fetch("a.com", "/", || async { Ok(body("fresh")) })
            .await
            .unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        let second = cache
            .get_or_fetch("a.com", "/", || async { Ok(body("refetched")) })
            .await
            .unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.response, body("fresh"));
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache = ResponseCache::new();

        let err = cache
            .get_or_fetch("a.invalid", "/", || async {
                Err(ForwardError::UnresolvedHost("a.invalid".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::UnresolvedHost(_)));
        assert!(cache.lookup("a.invalid", "/").is_none());

        let retry = cache
            .get_or_fetch("a.invalid", "/", || async { Ok(body("later")) })
            .await
            .unwrap();
        assert_eq!(retry.status, CacheStatus::Miss);
    }

    #[tokio::test]
    async fn failed_fetches_leave_no_slots_behind() {
        let cache = ResponseCache::new();
        for i in 0..100 {
            let host = format!("host-{}.invalid", i);
            let err = cache
                .get_or_fetch(&host, "/", || async {
                    Err(ForwardError::UnresolvedHost("unresolvable".into()))
                })
                .await;
            assert!(err.is_err());
        }
        cache
            .get_or_fetch("a.com", "/", || async { Ok(OriginResponse::from(CONNECTION_FAILED)) })
            .await
            .unwrap();

        assert!(cache.is_empty());
        assert_eq!(cache.slots.len(), 0);
    }

    #[tokio::test]
    async fn concurrent_failures_leave_no_slot_behind() {
        let cache = ResponseCache::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("down.invalid", "/", || async {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Err(ForwardError::TimedOut("down.invalid:80".into()))
                    })
                    .await
                    .is_err()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(cache.slots.len(), 0);
    }

    #[tokio::test]
    async fn origin_content_equal_to_sentinel_is_relayed_not_cached() {
        let cache = ResponseCache::new();
        let fetched = cache
            .get_or_fetch("a.com", "/", || async { Ok(OriginResponse::from(TIMED_OUT)) })
            .await
            .unwrap();
        assert_eq!(fetched.response, OriginResponse::from(TIMED_OUT));
        assert!(cache.lookup("a.com", "/").is_none());
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let cache = ResponseCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch("a.com", "/slow", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(body("slow"))
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut misses = 0;
        for handle in handles {
            let fetched = handle.await.unwrap();
            assert_eq!(fetched.response, body("slow"));
            if fetched.status == CacheStatus::Miss {
                misses += 1;
            }
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(misses, 1);
    }
}
