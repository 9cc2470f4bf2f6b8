use crate::{CounterStore, Error, Result};
use std::sync::Arc;
#[cfg(feature = "tracing")]
use tracing::instrument;

/// Hands out unique, increasing integers per named id-space.
///
/// Each call to [`Self::next_value`] is a single atomic
/// [`CounterStore::increment`] against the store; nothing is cached in
/// process, so any number of generators (and processes) can share one store.
///
/// A value that was allocated but never used (because the caller failed
/// afterwards) is simply skipped. Sequences can have gaps; they never repeat.
///
/// # Example
/// ```
/// use leaddesk::{MemoryStore, SequenceGenerator};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let generator = SequenceGenerator::new(Arc::new(MemoryStore::new()));
///
/// assert_eq!(generator.next_value("lead").await.unwrap(), 1);
/// assert_eq!(generator.next_value("lead").await.unwrap(), 2);
/// assert_eq!(generator.next_value("invoice").await.unwrap(), 1);
/// # }
/// ```
pub struct SequenceGenerator<S> {
    store: Arc<S>,
}

impl<S> Clone for SequenceGenerator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> SequenceGenerator<S>
where
    S: CounterStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Allocates the next value of the id-space `name`.
    ///
    /// # Errors
    /// - [`Error::InvalidRequest`] if `name` is empty.
    /// - [`Error::StorageUnavailable`] if the store cannot perform the
    ///   increment, including when the id-space is exhausted.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub async fn next_value(&self, name: &str) -> Result<u64> {
        if name.is_empty() {
            return Err(Error::invalid_request("sequence name must not be empty"));
        }

        let counter = self.store.increment(name).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(seq = counter.seq, "allocated sequence value");

        Ok(counter.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Counter, MemoryStore, StoreError, StoreResult};
    use core::future::{Future, ready};
    use std::collections::HashSet;

    struct OfflineStore;

    impl CounterStore for OfflineStore {
        fn increment(&self, _name: &str) -> impl Future<Output = StoreResult<Counter>> + Send {
            ready(Err(StoreError::Unavailable {
                reason: "connection refused".into(),
            }))
        }
    }

    #[tokio::test]
    async fn empty_names_are_rejected() {
        let generator = SequenceGenerator::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            generator.next_value("").await,
            Err(Error::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn store_failures_surface_as_storage_unavailable() {
        let generator = SequenceGenerator::new(Arc::new(OfflineStore));
        assert!(matches!(
            generator.next_value("lead").await,
            Err(Error::StorageUnavailable(StoreError::Unavailable { .. }))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_never_share_a_value() {
        const TASKS: usize = 64;
        const PER_TASK: usize = 32;

        let generator = SequenceGenerator::new(Arc::new(MemoryStore::new()));
        let mut handles = Vec::with_capacity(TASKS);
        for _ in 0..TASKS {
            let generator = generator.clone();
            handles.push(tokio::spawn(async move {
                let mut values = Vec::with_capacity(PER_TASK);
                for _ in 0..PER_TASK {
                    values.push(generator.next_value("lead").await.unwrap());
                }
                values
            }));
        }

        let mut seen = HashSet::with_capacity(TASKS * PER_TASK);
        for handle in handles {
            for value in handle.await.unwrap() {
                assert!(seen.insert(value), "duplicate value {value}");
            }
        }
        assert_eq!(seen.len(), TASKS * PER_TASK);
    }

    #[tokio::test]
    async fn clones_share_the_same_counter() {
        let generator = SequenceGenerator::new(Arc::new(MemoryStore::new()));
        let other = generator.clone();
        assert_eq!(generator.next_value("lead").await.unwrap(), 1);
        assert_eq!(other.next_value("lead").await.unwrap(), 2);
    }
}
