//! Per-chat ephemeral state and duplicate-update suppression.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How long a stored image stays usable in manual mode.
const IMAGE_TTL: Duration = Duration::from_secs(10 * 60);

/// How many processed update ids are remembered.
const MAX_PROCESSED: usize = 100;

/// Remembers the last image file id sent by each chat, for manual mode.
/// Entries expire after ten minutes — a stale photo should not silently
/// pair with an audio sent the next day.
#[derive(Clone, Default)]
pub struct ImageState {
    inner: Arc<DashMap<i64, (String, Instant)>>,
}

impl ImageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, chat_id: i64, file_id: String) {
        self.inner.insert(chat_id, (file_id, Instant::now()));
    }

    pub fn get(&self, chat_id: i64) -> Option<String> {
        let expired = match self.inner.get(&chat_id) {
            Some(entry) => {
                let (file_id, stored_at) = entry.value();
                if stored_at.elapsed() < IMAGE_TTL {
                    return Some(file_id.clone());
                }
                true
            }
            None => false,
        };
        if expired {
            self.inner.remove(&chat_id);
        }
        None
    }

    pub fn clear(&self, chat_id: i64) {
        self.inner.remove(&chat_id);
    }
}

/// Duplicate-update suppression: Telegram redelivers updates after
/// restarts and network hiccups. Keeps the last hundred
/// (chat, message) ids and drops anything already seen.
#[derive(Default)]
pub struct Dedup {
    seen: Mutex<VecDeque<(i64, i32)>>,
}

impl Dedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the id and reports whether it was already processed.
    pub fn seen_before(&self, chat_id: i64, message_id: i32) -> bool {
        let Ok(mut seen) = self.seen.lock() else {
            return false;
        };
        let key = (chat_id, message_id);
        if seen.contains(&key) {
            return true;
        }
        seen.push_back(key);
        if seen.len() > MAX_PROCESSED {
            seen.pop_front();
        }
        false
    }
}
