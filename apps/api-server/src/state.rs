//! Application state - shared across all handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use quill_core::domain::{Image, Role};
use quill_core::ports::{
    ImageRepository, PageRepository, PasswordService, RateLimiter, SiteRepository, TokenService,
    UserRepository,
};
use quill_infra::{
    Argon2PasswordService, InMemoryImageRepository, InMemoryPageRepository,
    InMemorySiteRepository, InMemoryUserRepository, JwtTokenService,
};

use crate::config::{AppConfig, BootstrapAdmin};

#[cfg(feature = "postgres")]
use quill_infra::database::{
    PostgresImageRepository, PostgresPageRepository, PostgresSiteRepository,
    PostgresUserRepository,
};

type LockMap = Arc<Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>>;

/// One async mutex per page id. Writers to the same page queue up; writers
/// to different pages do not contend. An entry lives only while someone
/// holds or waits for it.
#[derive(Clone, Default)]
pub struct PageLocks {
    locks: LockMap,
}

impl PageLocks {
    pub async fn acquire(&self, page_id: i64) -> PageGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(page_id).or_default().clone()
        };
        PageGuard {
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Exclusive hold on one page. Dropping it frees idle map entries.
pub struct PageGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Waiters clone the Arc under the map lock, so a count of one means
        // nobody holds or waits for that page. The sweep also catches entries
        // left by acquires cancelled while queued.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[actix_web::test]
    async fn test_page_locks_forget_released_pages() {
        let locks = PageLocks::default();

        for page_id in 0..1_000 {
            let _guard = locks.acquire(page_id).await;
            assert_eq!(locks.len(), 1);
        }

        assert_eq!(locks.len(), 0);
    }

    #[actix_web::test]
    async fn test_page_lock_kept_while_writer_waits() {
        let locks = PageLocks::default();
        let first = locks.acquire(7).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(7).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(first);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }

    #[actix_web::test]
    async fn test_page_lock_serializes_writers() {
        let locks = PageLocks::default();
        let guard = locks.acquire(3).await;

        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.acquire(3)).await;
        assert!(blocked.is_err());

        drop(guard);
        assert_eq!(locks.len(), 0);

        let _guard = locks.acquire(3).await;
        assert_eq!(locks.len(), 1);
    }
}
