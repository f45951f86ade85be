//! Token verdict cache using Moka
//!
//! Keeps validation verdicts for a fixed TTL so repeated requests with the
//! same bearer token don't hit the identity service.
//!
//! - Keys are the SHA-256 of the raw token, never the token itself
//! - No capacity bound; expired entries are evicted by moka
//! - TTLs longer than [`MAX_CACHE_TTL`] are clamped
//! - Thread-safe concurrent access

use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::verdict::TokenVerdict;

/// Longest TTL a verdict may be cached for (one year)
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Calculate cache key from a raw token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Debug, Clone)]
struct CachedVerdict {
    verdict: TokenVerdict,
    cached_at: Instant,
}

/// TTL cache of token verdicts
#[derive(Debug)]
pub struct TokenCache {
    ttl: Duration,
    entries: Cache<String, CachedVerdict>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenCache {
    /// Create a cache whose entries expire `ttl` after insertion
    pub fn new(ttl: Duration) -> Self {
        if ttl > MAX_CACHE_TTL {
            tracing::warn!(
                ttl_secs = ttl.as_secs(),
                max_secs = MAX_CACHE_TTL.as_secs(),
                "Token cache TTL clamped"
            );
        }
        let ttl = ttl.min(MAX_CACHE_TTL);
        Self {
            ttl,
            entries: Cache::builder().time_to_live(ttl).build(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached verdict for `token`, if present and younger than the TTL
    pub async fn get(&self, token: &str) -> Option<TokenVerdict> {
        let key = hash_token(token);

        match self.entries.get(&key).await {
            Some(entry) if entry.cached_at.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.verdict)
            }
            // Left for moka to evict
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(cache_key = %key, "Token cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a verdict for `token`, replacing any previous one
    pub async fn insert(&self, token: &str, verdict: TokenVerdict) {
        let entry = CachedVerdict {
            verdict,
            cached_at: Instant::now(),
        };
        self.entries.insert(hash_token(token), entry).await;
    }

    /// Drop the verdict for `token`
    pub async fn invalidate(&self, token: &str) {
        self.entries.invalidate(&hash_token(token)).await;
    }

    /// Drop every verdict
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of cached verdicts
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Get cache statistics as (hits, misses, hit_rate)
    pub fn stats(&self) -> (u64, u64, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };
        (hits, misses, hit_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockIdentityClient;

    #[test]
    fn test_hash_token_is_sha256_hex() {
        let key = hash_token("abc");
        assert_eq!(
            key,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(key, "abc");
    }

    #[tokio::test]
    async fn test_get_returns_stored_verdict() {
        let cache = TokenCache::new(Duration::from_secs(300));
        let verdict = TokenVerdict::valid(MockIdentityClient::user(7, "ada"));

        assert!(cache.get("abc").await.is_none());
        cache.insert("abc", verdict.clone()).await;

        assert_eq!(cache.get("abc").await, Some(verdict));
        assert!(cache.get("other").await.is_none());

        let (hits, misses, _) = cache.stats();
        assert_eq!(hits, 1);
        assert_eq!(misses, 2);
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = TokenCache::new(Duration::from_millis(100));
        cache.insert("abc", TokenVerdict::invalid("Invalid token")).await;
        assert!(cache.get("abc").await.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_read_keeps_fresh_insert() {
        let cache = TokenCache::new(Duration::from_millis(100));
        cache.insert("abc", TokenVerdict::invalid("Invalid token")).await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        let verdict = TokenVerdict::valid(MockIdentityClient::user(7, "ada"));
        let (expired, _) = tokio::join!(cache.get("abc"), cache.insert("abc", verdict.clone()));
        assert_ne!(expired, Some(TokenVerdict::invalid("Invalid token")));
        assert_eq!(cache.get("abc").await, Some(verdict));
    }

    #[test]
    fn test_oversized_ttl_is_clamped() {
        let cache = TokenCache::new(Duration::from_secs(100_000_000_000));
        assert_eq!(cache.ttl(), MAX_CACHE_TTL);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let cache = TokenCache::new(Duration::from_secs(300));
        cache.insert("a", TokenVerdict::invalid("Invalid token")).await;
        cache.insert("b", TokenVerdict::invalid("Invalid token")).await;

        cache.invalidate("a").await;
        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());

        cache.clear();
        assert!(cache.get("b").await.is_none());
    }
}
