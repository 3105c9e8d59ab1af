//! Sliding-window rate limiting.
//!
//! 識別子（IP またはメールアドレス）ごとに 60 秒窓で最大 5 回。
//! ストアは差し替え可能: 単一インスタンスならインメモリ、複数インスタンス
//! なら TTL 付き外部 KV をこのトレイトの後ろに挿す。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Maximum attempts per identifier per window.
pub const MAX_ATTEMPTS: u32 = 5;

/// Window length in milliseconds.
pub const WINDOW_MILLIS: u64 = 60_000;

/// Map size that triggers opportunistic pruning of expired entries.
const PRUNE_THRESHOLD: usize = 1000;

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Attempt admitted and counted.
    Allowed,
    /// Attempt rejected.
    Limited {
        /// Seconds remaining in the window.
        retry_after_seconds: u64,
    },
}

/// Pluggable counter store behind the rate limiter.
///
/// `check_and_increment` must be atomic per identifier: the window check
/// and the count bump happen as one operation, so concurrent requests from
/// the same identifier cannot double-admit.
#[async_trait]
pub trait CounterStore: Send + Sync + std::fmt::Debug {
    /// Records an attempt for `identifier` and decides whether it is
    /// admitted.
    async fn check_and_increment(&self, identifier: &str, now_millis: u64) -> RateDecision;
}

/// One identifier's window state.
#[derive(Debug, Clone, Copy)]
struct Window {
    /// Attempts seen in the current window.
    count: u32,
    /// When the window resets, epoch milliseconds.
    reset_at_millis: u64,
}

/// Process-local counter store.
///
/// State lives in this process only and resets on every deploy or restart;
/// this is a soft limiter, not a durable guarantee. Multi-instance
/// deployments should plug a shared store into [`CounterStore`] instead.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    /// Identifier → window state.
    windows: RwLock<HashMap<String, Window>>,
}

impl InMemoryCounterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of tracked identifiers (expired entries included
    /// until the next prune).
    pub async fn tracked_identifiers(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn check_and_increment(&self, identifier: &str, now_millis: u64) -> RateDecision {
        // Write lock held across the whole read-modify-write.
        let mut windows = self.windows.write().await;

        if windows.len() > PRUNE_THRESHOLD {
            windows.retain(|_, window| window.reset_at_millis > now_millis);
            tracing::debug!(remaining = windows.len(), "Pruned expired rate-limit entries");
        }

        match windows.get_mut(identifier) {
            Some(window) if window.reset_at_millis > now_millis => {
                if window.count >= MAX_ATTEMPTS {
                    let retry_after_seconds =
                        (window.reset_at_millis - now_millis).div_ceil(1000);
                    tracing::warn!(identifier, retry_after_seconds, "Rate limit exceeded");
                    RateDecision::Limited { retry_after_seconds }
                } else {
                    window.count += 1;
                    RateDecision::Allowed
                }
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    Window { count: 1, reset_at_millis: now_millis + WINDOW_MILLIS },
                );
                RateDecision::Allowed
            }
        }
    }
}
