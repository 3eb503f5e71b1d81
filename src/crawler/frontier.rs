//! Frontier queue for the crawl
//!
//! This module handles:
//! - FIFO storage of URLs waiting to be fetched
//! - Suspending workers until an item is available or the queue is closed
//! - Counting outstanding work so the supervisor can detect quiescence
//!
//! The outstanding counter is incremented on every `enqueue` and only
//! decremented by `mark_done`, after a worker has fully processed an item
//! (including any items that processing enqueued). A queue that is empty
//! while a worker is still mid-fetch therefore does not count as drained.

use crate::state::FrontierItem;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Unbounded FIFO of frontier items with a join protocol
pub struct FrontierQueue {
    /// Items waiting to be dequeued
    items: Mutex<VecDeque<FrontierItem>>,

    /// Items enqueued but not yet marked done
    outstanding: AtomicUsize,

    /// Signalled once per enqueued item
    item_ready: Notify,

    /// Signalled when the outstanding counter reaches zero
    drained: Notify,

    /// Cancelled when the queue is closed
    closed: CancellationToken,
}

impl FrontierQueue {
    pub fn new() -> Self {
        Self::with_cancellation(CancellationToken::new())
    }

    /// Creates a queue that closes when `token` is cancelled
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            outstanding: AtomicUsize::new(0),
            item_ready: Notify::new(),
            drained: Notify::new(),
            closed: token,
        }
    }

    /// Appends an item; never blocks and never fails
    pub fn enqueue(&self, item: FrontierItem) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        self.lock_items().push_back(item);
        self.item_ready.notify_one();
    }

    /// Waits for the next item
    ///
    /// # Returns
    ///
    /// * `Some(FrontierItem)` - The oldest queued item
    /// * `None` - The queue was closed; queued items are left in place
    pub async fn dequeue(&self) -> Option<FrontierItem> {
        loop {
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            // Register interest before checking, so an enqueue that lands
            // between the check and the await still wakes us.
            notified.as_mut().enable();

            if self.closed.is_cancelled() {
                return None;
            }

            let next = self.lock_items().pop_front();
            if next.is_some() {
                return next;
            }

            tokio::select! {
                biased;
                _ = self.closed.cancelled() => return None,
                _ = &mut notified => {}
            }
        }
    }

    /// Records that one dequeued item has been fully processed
    pub fn mark_done(&self) {
        match self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(1) => {
                tracing::trace!("Frontier drained");
                self.drained.notify_waiters();
            }
            Ok(_) => {}
            Err(_) => tracing::warn!("mark_done called with no outstanding work"),
        }
    }

    /// Waits until every enqueued item has been marked done
    pub async fn join(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.outstanding.load(Ordering::SeqCst) == 0 {
                return;
            }

            notified.await;
        }
    }

    /// Closes the queue, waking every worker blocked in `dequeue`
    ///
    /// Closing twice is harmless.
    pub fn close(&self) {
        self.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Number of items enqueued but not yet marked done
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Number of items waiting to be dequeued
    pub fn len(&self) -> usize {
        self.lock_items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_items().is_empty()
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<FrontierItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FrontierQueue {
    fn default() -> Self {
        Self::new()
    }
}
