use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Coalesces concurrent evaluations of the same key. The first caller for a
/// key runs the operation, every caller that arrives while it is in flight
/// waits for the leader's value instead of running it again. Nothing is
/// retained once the leader has published.
pub struct Dedupe<Key, Value> {
    cache: Arc<DashMap<Key, broadcast::Sender<Value>>>,
    size: usize,
}

enum Step<Value> {
    Recv(broadcast::Receiver<Value>),
    Send(broadcast::Sender<Value>),
}

/// Removes the leader's entry when the leader finishes or is dropped half-way.
/// Dropping the last sender closes the channel, so waiters of a cancelled
/// leader wake up and race for leadership again.
struct Leader<'a, K: Eq + Hash, V> {
    cache: &'a DashMap<K, broadcast::Sender<V>>,
    key: &'a K,
    tx: &'a broadcast::Sender<V>,
}

impl<K: Eq + Hash, V> Drop for Leader<'_, K, V> {
    fn drop(&mut self) {
        self.cache
            .remove_if(self.key, |_, stored| stored.same_channel(self.tx));
    }
}

impl<K: Send + Sync + Eq + Hash + Clone, V: Send + Sync + Clone> Dedupe<K, V> {
    pub fn new(size: usize) -> Self {
        Self { cache: Arc::new(DashMap::new()), size: size.max(1) }
    }

    pub async fn dedupe<Fut>(&self, key: &K, or_else: impl FnOnce() -> Fut) -> V
    where
        Fut: Future<Output = V>,
    {
        loop {
            match self.step(key) {
                Step::Recv(mut rx) => match rx.recv().await {
                    Ok(value) => return value,
                    Err(_) => {
                        tracing::debug!("in-flight leader went away, retrying");
                        continue;
                    }
                },
                Step::Send(tx) => {
                    let leader = Leader { cache: &self.cache, key, tx: &tx };
                    let value = or_else().await;
                    // Detach before publishing so late callers start afresh
                    // instead of subscribing after the value went out.
                    drop(leader);
                    let _ = tx.send(value.clone());
                    return value;
                }
            }
        }
    }

    /// Forgets the in-flight operation for `key`. Callers already waiting
    /// still receive its value; later callers start a new operation.
    pub fn detach(&self, key: &K) {
        self.cache.remove(key);
    }

    /// Number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.cache.len()
    }

    fn step(&self, key: &K) -> Step<V> {
        match self.cache.entry(key.to_owned()) {
            Entry::Occupied(entry) => Step::Recv(entry.get().subscribe()),
            Entry::Vacant(entry) => {
                let (tx, _) = broadcast::channel(self.size);
                entry.insert(tx.clone());
                Step::Send(tx)
            }
        }
    }
}

/// [`Dedupe`] over fallible operations: waiters receive the leader's
/// failure just like its success.
pub struct DedupeResult<Key, Value, Error>(Dedupe<Key, Result<Value, Error>>);

impl<K: Send + Sync + Eq + Hash + Clone, V: Send + Sync + Clone, E: Send + Sync + Clone>
    DedupeResult<K, V, E>
{
    pub fn new(size: usize) -> Self {
        Self(Dedupe::new(size))
    }

    pub async fn dedupe<Fut>(&self, key: &K, or_else: impl FnOnce() -> Fut) -> Result<V, E>
    where
        Fut: Future<Output = Result<V, E>>,
    {
        self.0.dedupe(key, or_else).await
    }

    pub fn detach(&self, key: &K) {
        self.0.detach(key)
    }

    pub fn in_flight(&self) -> usize {
        self.0.in_flight()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use tokio::join;
    use tokio::time::sleep;

    use super::*;

    #[tokio::test]
    async fn test_no_key() {
        let cache = Arc::new(Dedupe::<u64, u64>::new(1000));
        let actual = cache.dedupe(&1, || async { 1 }).await;
        assert_eq!(actual, 1);
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_sequential_calls_are_not_memoized() {
        let cache = Dedupe::<u64, u64>::new(1000);
        cache.dedupe(&1, || async { 1 }).await;

        let actual = cache.dedupe(&1, || async { 2 }).await;
        assert_eq!(actual, 2);
    }

    #[tokio::test]
    async fn test_with_multi_async_get() {
        let cache = Arc::new(Dedupe::<u64, u64>::new(1000));

        let a = cache.dedupe(&1, || async move {
            sleep(Duration::from_millis(1)).await;
            1
        });
        let b = cache.dedupe(&1, || async move {
            sleep(Duration::from_millis(1)).await;
            2
        });
        let (a, b) = join!(a, b);

        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_coalesce() {
        let cache = Dedupe::<u64, u64>::new(1000);
        let a = cache.dedupe(&1, || async { 1 });
        let b = cache.dedupe(&2, || async { 2 });
        assert_eq!(join!(a, b), (1, 2));
    }

    #[tokio::test(worker_threads = 16, flavor = "multi_thread")]
    async fn test_deadlock_scenario() {
        let cache = Arc::new(Dedupe::<u64, String>::new(1000));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = 1;

        let mut handles = Vec::new();

        for _ in 0..10000 {
            let cache = cache.clone();
            let calls = calls.clone();
            let handle = tokio::task::spawn(async move {
                cache
                    .dedupe(&key, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        sleep(Duration::from_millis(1)).await;
                        "value".to_string()
                    })
                    .await
            });
            handles.push(handle);
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "value");
        }
        assert!(calls.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_shared() {
        let cache = DedupeResult::<u64, u64, String>::new(16);
        let calls = AtomicUsize::new(0);
        let calls = &calls;
        let run = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(5)).await;
            Err::<u64, _>("boom".to_string())
        };

        let (a, b) = join!(cache.dedupe(&7, run), cache.dedupe(&7, run));

        assert_eq!(a, Err("boom".to_string()));
        assert_eq!(b, Err("boom".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_leader_hands_over() {
        let cache = Arc::new(Dedupe::<u64, u64>::new(16));

        let leader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .dedupe(&1, || async {
                        sleep(Duration::from_secs(60)).await;
                        1
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(20)).await;

        let follower = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.dedupe(&1, || async { 2 }).await })
        };
        sleep(Duration::from_millis(20)).await;

        leader.abort();
        assert_eq!(follower.await.unwrap(), 2);
        assert_eq!(cache.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_detach_starts_fresh_operation() {
        let cache = Arc::new(Dedupe::<u64, u64>::new(16));

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .dedupe(&1, || async {
                        sleep(Duration::from_millis(50)).await;
                        1
                    })
                    .await
            })
        };
        sleep(Duration::from_millis(10)).await;
        cache.detach(&1);

        let second = cache.dedupe(&1, || async { 2 }).await;
        assert_eq!(second, 2);
        assert_eq!(first.await.unwrap(), 1);
    }
}
