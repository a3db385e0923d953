//! Cooperative cancellation for long runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag polled by sampling chunks every `cancel_check_interval` draws.
///
/// Clones share the same flag, so a caller can hand one clone to a worker and
/// keep another to trigger cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Guard that cancels this token when dropped. Held by a request future,
    /// it stops the sampling work once the future is abandoned.
    pub fn drop_guard(&self) -> CancelGuard {
        CancelGuard {
            token: self.clone(),
        }
    }
}

/// Cancels its token on drop. See [`CancelToken::drop_guard`].
#[derive(Debug)]
pub struct CancelGuard {
    token: CancelToken,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
