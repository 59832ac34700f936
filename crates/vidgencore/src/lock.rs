//! Per-chat request serialization.
//!
//! At most one resolution may run per chat at a time; a second request
//! arriving while the first is in flight is dropped silently, never
//! queued. Different chats proceed fully in parallel.
//!
//! Acquisition is scoped: the returned guard releases the lock when
//! dropped, so every exit path — success, no-match, error, panic —
//! releases it. Each guard carries a unique token and only removes its
//! own entry, so a guard outliving a /cancel cannot evict a newer holder.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared per-chat lock table. Cheap to clone.
#[derive(Clone, Default)]
pub struct ChatLocks {
    held: Arc<DashMap<i64, u64>>,
    next_token: Arc<AtomicU64>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to take the lock for `key`. `None` means a request for
    /// this chat is already in flight and the caller must drop the
    /// incoming one.
    pub fn try_acquire(&self, key: i64) -> Option<ChatLockGuard> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        match self.held.entry(key) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(token);
                Some(ChatLockGuard {
                    key,
                    token,
                    held: Arc::clone(&self.held),
                })
            }
        }
    }

    pub fn is_held(&self, key: i64) -> bool {
        self.held.contains_key(&key)
    }

    /// Unconditionally clears a chat's lock. Used by /cancel to recover
    /// from a wedged request.
    pub fn force_release(&self, key: i64) {
        self.held.remove(&key);
    }
}

/// RAII lock guard; dropping it releases the chat's slot.
pub struct ChatLockGuard {
    key: i64,
    token: u64,
    held: Arc<DashMap<i64, u64>>,
}

impl Drop for ChatLockGuard {
    fn drop(&mut self) {
        self.held.remove_if(&self.key, |_, held_token| *held_token == self.token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let locks = ChatLocks::new();
        let guard = locks.try_acquire(42);
        assert!(guard.is_some());
        assert!(locks.try_acquire(42).is_none());
        assert!(locks.is_held(42));
    }

    #[test]
    fn test_different_keys_are_independent() {
        let locks = ChatLocks::new();
        let _a = locks.try_acquire(1).unwrap();
        assert!(locks.try_acquire(2).is_some());
    }

    #[test]
    fn test_released_on_drop() {
        let locks = ChatLocks::new();
        {
            let _guard = locks.try_acquire(42).unwrap();
            assert!(locks.is_held(42));
        }
        assert!(!locks.is_held(42));
        assert!(locks.try_acquire(42).is_some());
    }

    #[test]
    fn test_released_on_error_path() {
        let locks = ChatLocks::new();

        fn failing_request(locks: &ChatLocks) -> Result<(), String> {
            let _guard = locks.try_acquire(7).ok_or("duplicate")?;
            Err("asset download failed".to_string())
        }

        assert!(failing_request(&locks).is_err());
        assert!(!locks.is_held(7));
        assert!(locks.try_acquire(7).is_some());
    }

    #[test]
    fn test_released_on_panic() {
        let locks = ChatLocks::new();
        let locks_clone = locks.clone();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = locks_clone.try_acquire(9).unwrap();
            panic!("merge blew up");
        }));

        assert!(result.is_err());
        assert!(!locks.is_held(9));
    }

    #[test]
    fn test_stale_guard_cannot_evict_new_holder() {
        let locks = ChatLocks::new();
        let stale = locks.try_acquire(5).unwrap();
        locks.force_release(5);

        let _fresh = locks.try_acquire(5).unwrap();
        drop(stale);
        assert!(locks.is_held(5));
    }
}
