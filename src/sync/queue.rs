use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::QueueError;
use crate::sync::monitor::Monitor;

struct Inner<T> {
    slots: VecDeque<T>,
    capacity: usize,
    finished: bool,
}

/// A thread-safe, capacity-bounded FIFO.
///
/// Built on three [`Monitor`]s (not-full, not-empty, finished) guarding a
/// single [`VecDeque`] behind one mutex. Supports many concurrent producers
/// and consumers; `put` blocks while full, `get` blocks while empty, neither
/// ever busy-spins.
///
/// ```text
/// put() ---> [ ][ ][x][x][ ] <--- get()
///               head  tail
/// ```
pub struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_full: Monitor,
    not_empty: Monitor,
    finished: Monitor,
}

impl<T> BoundedQueue<T> {
    /// Allocates a queue with the given fixed capacity. Capacity is
    /// immutable after construction.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        Ok(Self {
            inner: Mutex::new(Inner {
                slots: VecDeque::with_capacity(capacity),
                capacity,
                finished: false,
            }),
            not_full: Monitor::new(true),
            not_empty: Monitor::new(false),
            finished: Monitor::new(false),
        })
    }

    /// Inserts `item`, blocking while the queue is full.
    ///
    /// Rejected with [`QueueError::Finished`] once [`signal_finished`](Self::signal_finished)
    /// has been called — the sentinel is the last item any queue accepts.
    /// The finished check happens under the same lock as the insert, so a
    /// concurrent `signal_finished` from another producer can never land in
    /// the gap between the check and the push.
    pub fn put(&self, item: T) -> Result<(), QueueError> {
        loop {
            let mut inner = self
                .inner
                .lock()
                .map_err(|_| crate::error::MonitorError::Primitive("queue mutex poisoned".into()))?;

            if inner.finished {
                return Err(QueueError::Finished);
            }

            if inner.slots.len() < inner.capacity {
                inner.slots.push_back(item);
                let now_full = inner.slots.len() == inner.capacity;
                drop(inner);

                self.not_empty.signal();
                if now_full {
                    self.not_full.reset();
                }
                return Ok(());
            }

            // Full: release the lock before blocking so a consumer can
            // make progress and signal not_full.
            drop(inner);
            self.not_full.wait()?;
        }
    }

    /// Removes and returns the oldest item, blocking while the queue is
    /// empty. Never fails for an empty queue — it blocks instead.
    pub fn get(&self) -> Result<T, QueueError> {
        loop {
            {
                let mut inner = self
                    .inner
                    .lock()
                    .map_err(|_| crate::error::MonitorError::Primitive("queue mutex poisoned".into()))?;

                if let Some(item) = inner.slots.pop_front() {
                    let now_empty = inner.slots.is_empty();
                    drop(inner);

                    self.not_full.signal();
                    if now_empty {
                        self.not_empty.reset();
                    }
                    return Ok(item);
                }
            }

            self.not_empty.wait()?;
        }
    }

    /// Latches "processing finished". Level-triggered: every call to
    /// [`wait_finished`](Self::wait_finished) made after this returns
    /// immediately. Also wakes any producer blocked in [`put`](Self::put) on
    /// a full queue, so it can observe the flag and return
    /// [`QueueError::Finished`] instead of waiting forever.
    pub fn signal_finished(&self) {
        {
            let mut inner = match self.inner.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            inner.finished = true;
        }
        self.not_full.signal();
        self.finished.signal();
    }

    /// Blocks until [`signal_finished`](Self::signal_finished) has been called.
    pub fn wait_finished(&self) -> Result<(), QueueError> {
        self.finished.wait().map_err(Into::into)
    }

    /// Number of items currently resident.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.slots.len(),
            Err(poisoned) => poisoned.into_inner().slots.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.capacity,
            Err(poisoned) => poisoned.into_inner().capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn test_invalid_capacity() {
        assert!(matches!(
            BoundedQueue::<String>::new(0),
            Err(QueueError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_put_get_fifo_order() {
        let q = BoundedQueue::new(4).unwrap();
        q.put("a".to_string()).unwrap();
        q.put("b".to_string()).unwrap();
        q.put("c".to_string()).unwrap();
        assert_eq!(q.get().unwrap(), "a");
        assert_eq!(q.get().unwrap(), "b");
        assert_eq!(q.get().unwrap(), "c");
    }

    #[test]
    fn test_count_never_exceeds_capacity() {
        let q = Arc::new(BoundedQueue::new(2).unwrap());
        q.put("a".to_string()).unwrap();
        q.put("b".to_string()).unwrap();
        assert_eq!(q.len(), 2);

        let q2 = q.clone();
        let putter = thread::spawn(move || {
            q2.put("c".to_string()).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        assert_eq!(q.len(), 2, "put must block while full");

        q.get().unwrap();
        putter.join().unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_get_blocks_while_empty() {
        let q = Arc::new(BoundedQueue::new(4).unwrap());
        let q2 = q.clone();
        let getter = thread::spawn(move || {
            let start = Instant::now();
            let v = q2.get().unwrap();
            (v, start.elapsed())
        });

        thread::sleep(Duration::from_millis(100));
        q.put("hello".to_string()).unwrap();

        let (v, elapsed) = getter.join().unwrap();
        assert_eq!(v, "hello");
        assert!(elapsed >= Duration::from_millis(90));
    }

    #[test]
    fn test_put_after_finished_rejected() {
        let q = BoundedQueue::new(4).unwrap();
        q.signal_finished();
        assert!(matches!(q.put("x".to_string()), Err(QueueError::Finished)));
    }

    #[test]
    fn test_signal_finished_unblocks_producer_blocked_on_full_queue() {
        let q = Arc::new(BoundedQueue::new(1).unwrap());
        q.put("first".to_string()).unwrap();

        let q2 = q.clone();
        let blocked_putter = thread::spawn(move || q2.put("second".to_string()));

        thread::sleep(Duration::from_millis(50));
        assert!(!blocked_putter.is_finished(), "put must block while full");

        q.signal_finished();
        let result = blocked_putter.join().unwrap();
        assert!(matches!(result, Err(QueueError::Finished)));
    }

    #[test]
    fn test_wait_finished_idempotent() {
        let q = BoundedQueue::<String>::new(4).unwrap();
        q.signal_finished();
        q.wait_finished().unwrap();
        q.wait_finished().unwrap();
    }

    /// Eight producers, 50,000 items each, capacity 256: every item must be
    /// drained exactly once, no deadlock, no loss.
    #[test]
    #[ignore = "stress test; run explicitly (cargo test -- --ignored)"]
    fn test_stress_many_producers() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 50_000;
        const CAPACITY: usize = 256;

        let q = Arc::new(BoundedQueue::new(CAPACITY).unwrap());
        let mut handles = Vec::new();
        for p in 0..PRODUCERS {
            let q = q.clone();
            handles.push(thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    q.put(format!("{p}-{i}")).unwrap();
                }
            }));
        }

        let total = PRODUCERS * PER_PRODUCER;
        let mut seen = std::collections::HashSet::with_capacity(total);
        for _ in 0..total {
            let item = q.get().unwrap();
            assert!(seen.insert(item), "duplicate item received");
        }

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(seen.len(), total);
    }
}
