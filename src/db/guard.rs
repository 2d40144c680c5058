//! Fair readers–writers guard for a single table.
//!
//! Every request, read or write, first passes the `entry` semaphore, and
//! tokio semaphores hand out permits in FIFO order. A writer keeps holding
//! `entry` while it writes, so readers that arrive after it queue behind it
//! instead of joining the readers already inside. Readers release `entry`
//! as soon as they are admitted, so consecutive readers share the table.
//!
//! `exclusion` is held either by the one active writer or, collectively, by
//! the active readers: the first reader in takes it and the last reader out
//! returns it.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

#[derive(Debug)]
pub struct TableGuard {
    entry: Arc<Semaphore>,
    exclusion: Arc<Semaphore>,
    readers: Mutex<usize>,
}

impl Default for TableGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl TableGuard {
    pub fn new() -> Self {
        Self {
            entry: Arc::new(Semaphore::new(1)),
            exclusion: Arc::new(Semaphore::new(1)),
            readers: Mutex::new(0),
        }
    }

    /// Waits for shared access.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the guard
    /// as if the request had never been made.
    pub async fn read(self: &Arc<Self>) -> Result<ReadGuard, AcquireError> {
        let _entry = self.entry.clone().acquire_owned().await?;

        let first = {
            let mut readers = self.readers.lock();
            if *readers > 0 {
                *readers += 1;
                false
            } else {
                true
            }
        };

        if first {
            // While the count is zero only the holder of `entry` can change
            // it, so there is no race between the check and the increment.
            self.exclusion.acquire().await?.forget();
            *self.readers.lock() += 1;
        }

        Ok(ReadGuard {
            guard: Arc::clone(self),
        })
    }

    /// Waits for exclusive access.
    pub async fn write(self: &Arc<Self>) -> Result<WriteGuard, AcquireError> {
        let entry = self.entry.clone().acquire_owned().await?;
        let exclusion = self.exclusion.clone().acquire_owned().await?;

        Ok(WriteGuard {
            _exclusion: exclusion,
            _entry: entry,
        })
    }

    /// Fails every pending and future acquisition. Used when the table is
    /// dropped.
    pub fn close(&self) {
        self.entry.close();
        self.exclusion.close();
    }

    /// Number of readers currently holding the table.
    pub fn active_readers(&self) -> usize {
        *self.readers.lock()
    }

    fn release_read(&self) {
        let mut readers = self.readers.lock();
        *readers -= 1;
        if *readers == 0 {
            self.exclusion.add_permits(1);
        }
    }
}

/// Shared access to a table; released on drop.
#[derive(Debug)]
pub struct ReadGuard {
    guard: Arc<TableGuard>,
}

impl Drop for ReadGuard {
    fn drop(&mut self) {
        self.guard.release_read();
    }
}

/// Exclusive access to a table; released on drop.
#[derive(Debug)]
pub struct WriteGuard {
    // Field order is drop order: exclusion goes back before entry.
    _exclusion: OwnedSemaphorePermit,
    _entry: OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn spawn_reader(
        guard: &Arc<TableGuard>,
        log: &Log,
        name: &'static str,
        hold: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let guard = Arc::clone(guard);
        let log = Arc::clone(log);
        tokio::spawn(async move {
            let _read = guard.read().await.unwrap();
            sleep(hold).await;
            log.lock().push(name);
        })
    }

    fn spawn_writer(
        guard: &Arc<TableGuard>,
        log: &Log,
        name: &'static str,
        hold: Duration,
    ) -> tokio::task::JoinHandle<()> {
        let guard = Arc::clone(guard);
        let log = Arc::clone(log);
        tokio::spawn(async move {
            let _write = guard.write().await.unwrap();
            sleep(hold).await;
            log.lock().push(name);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_writer_is_not_overtaken_by_later_reader() {
        let guard = Arc::new(TableGuard::new());
        let log = Log::default();

        let r1 = spawn_reader(&guard, &log, "R1", Duration::from_millis(50));
        sleep(Duration::from_millis(1)).await;
        let w1 = spawn_writer(&guard, &log, "W1", Duration::from_millis(50));
        sleep(Duration::from_millis(1)).await;
        let r2 = spawn_reader(&guard, &log, "R2", Duration::from_millis(1));

        for task in [r1, w1, r2] {
            task.await.unwrap();
        }

        assert_eq!(*log.lock(), vec!["R1", "W1", "R2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readers_wait_for_earlier_writer() {
        let guard = Arc::new(TableGuard::new());
        let log = Log::default();

        let w1 = spawn_writer(&guard, &log, "W1", Duration::from_millis(50));
        sleep(Duration::from_millis(1)).await;
        let r1 = spawn_reader(&guard, &log, "R1", Duration::from_millis(1));
        sleep(Duration::from_millis(1)).await;
        let w2 = spawn_writer(&guard, &log, "W2", Duration::from_millis(1));

        for task in [w1, r1, w2] {
            task.await.unwrap();
        }

        assert_eq!(*log.lock(), vec!["W1", "R1", "W2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readers_share_access() {
        let guard = Arc::new(TableGuard::new());

        let first = guard.read().await.unwrap();
        let second = guard.read().await.unwrap();
        assert_eq!(guard.active_readers(), 2);

        drop(first);
        assert_eq!(guard.active_readers(), 1);
        drop(second);
        assert_eq!(guard.active_readers(), 0);

        // The exclusion permit came back with the last reader.
        let _write = guard.write().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_writer_excludes_reader() {
        let guard = Arc::new(TableGuard::new());
        let write = guard.write().await.unwrap();

        let pending = tokio::time::timeout(Duration::from_millis(10), guard.read()).await;
        assert!(pending.is_err());

        drop(write);
        let _read = guard.read().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_reader_leaves_guard_usable() {
        let guard = Arc::new(TableGuard::new());
        let write = guard.write().await.unwrap();

        assert!(
            tokio::time::timeout(Duration::from_millis(10), guard.read())
                .await
                .is_err()
        );
        assert_eq!(guard.active_readers(), 0);

        drop(write);
        let _read = guard.read().await.unwrap();
        let _other = guard.read().await.unwrap();
        assert_eq!(guard.active_readers(), 2);
    }

    #[tokio::test]
    async fn test_closed_guard_rejects_waiters() {
        let guard = Arc::new(TableGuard::new());
        let write = guard.write().await.unwrap();

        let waiter = {
            let guard = Arc::clone(&guard);
            tokio::spawn(async move { guard.read().await.is_err() })
        };
        tokio::task::yield_now().await;

        guard.close();
        drop(write);

        assert!(waiter.await.unwrap());
        assert!(guard.write().await.is_err());
    }
}
