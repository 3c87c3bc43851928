//! Bounded worker pool for leaf construction and partitioned reductions.
//!
//! With the `parallel` feature the pool is a dedicated rayon thread pool sized
//! to the requested worker count; without it every operation runs on the
//! calling thread with identical results. Pools are created per call and hold
//! no shared mutable state.

use std::num::NonZeroUsize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ConfigError;
use crate::hash::Digest;
use crate::{HashTreeError, HashTreeResult};

const DEFAULT_CHUNK_SIZE: usize = 64;

/// Minimum number of items handed to a worker in one batch.
pub fn preferred_chunk_size(total_items: usize, workers: usize) -> usize {
    if total_items == 0 {
        1
    } else {
        DEFAULT_CHUNK_SIZE.min(total_items.div_ceil(workers.max(1)).max(1))
    }
}

/// Worker count used when the caller does not specify one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Worker pool sized once at construction.
pub struct WorkerPool {
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Creates a pool with `workers` threads, or the host parallelism when
    /// `None`. Zero workers is rejected.
    pub fn new(workers: Option<usize>) -> HashTreeResult<Self> {
        let workers = match workers {
            Some(0) => return Err(ConfigError::ZeroWorkers.into()),
            Some(count) => count,
            None => default_workers(),
        };
        #[cfg(feature = "parallel")]
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("merkle-worker-{index}"))
            .build()
            .map_err(|err| HashTreeError::WorkerPool(err.to_string()))?;
        Ok(Self {
            workers,
            #[cfg(feature = "parallel")]
            pool,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Applies `f` to every item and returns the results in input order.
    ///
    /// Every item is processed before returning, regardless of individual
    /// outcomes.
    #[cfg(feature = "parallel")]
    pub fn map_ordered<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        let chunk = preferred_chunk_size(items.len(), self.workers);
        self.pool.install(|| {
            items
                .into_par_iter()
                .with_min_len(chunk)
                .map(&f)
                .collect()
        })
    }

    #[cfg(not(feature = "parallel"))]
    pub fn map_ordered<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync + Send,
    {
        items.into_iter().map(f).collect()
    }

    /// Folds contiguous partitions concurrently, then folds the partition
    /// results in partition order.
    pub fn reduce<T, F>(&self, items: Vec<T>, reduce_fn: F) -> Option<T>
    where
        T: Send,
        F: Fn(T, T) -> T + Sync + Send,
    {
        let partitions = partition(items, self.workers);
        let partials = self.map_ordered(partitions, |part| part.into_iter().reduce(&reduce_fn));
        partials.into_iter().flatten().reduce(&reduce_fn)
    }
}

/// Splits `items` into contiguous partitions of `max(1, len / workers)`.
fn partition<T>(items: Vec<T>, workers: usize) -> Vec<Vec<T>> {
    let size = (items.len() / workers.max(1)).max(1);
    let mut partitions = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            partitions.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        partitions.push(current);
    }
    partitions
}

/// Generic partitioned reduction on a pool of `workers` threads.
///
/// `reduce_fn` must be associative for the result to be independent of the
/// worker count. An empty input yields `Ok(None)`.
pub fn parallel_reduce<T, F>(items: Vec<T>, reduce_fn: F, workers: Option<usize>) -> HashTreeResult<Option<T>>
where
    T: Send,
    F: Fn(T, T) -> T + Sync + Send,
{
    if items.is_empty() {
        return Ok(None);
    }
    let pool = WorkerPool::new(workers)?;
    Ok(pool.reduce(items, reduce_fn))
}

/// Order-independent aggregate of many digests (byte-wise XOR).
pub fn aggregate_xor(digests: Vec<Digest>, workers: Option<usize>) -> HashTreeResult<Option<Digest>> {
    parallel_reduce(
        digests,
        |a, b| {
            let mut out = a.into_bytes();
            for (byte, other) in out.iter_mut().zip(b.as_bytes()) {
                *byte ^= other;
            }
            Digest::from_bytes(out)
        },
        workers,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;

    #[test]
    fn chunk_size_is_bounded() {
        assert_eq!(preferred_chunk_size(0, 4), 1);
        assert_eq!(preferred_chunk_size(10, 4), 3);
        assert_eq!(preferred_chunk_size(100_000, 2), DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn partitions_are_contiguous() {
        let parts = partition((0..10).collect::<Vec<_>>(), 3);
        assert_eq!(parts, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8], vec![9]]);
        let parts = partition(vec![1, 2], 8);
        assert_eq!(parts, vec![vec![1], vec![2]]);
    }

    #[test]
    fn map_preserves_input_order() {
        let pool = WorkerPool::new(Some(4)).unwrap();
        let squares = pool.map_ordered((0u64..500).collect(), |value| value * value);
        let expected: Vec<u64> = (0u64..500).map(|value| value * value).collect();
        assert_eq!(squares, expected);
    }

    #[test]
    fn reduce_keeps_partition_order_for_non_commutative_fns() {
        let words: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let expected = words.concat();
        for workers in [1, 3, 8] {
            let joined = parallel_reduce(words.clone(), |a, b| a + &b, Some(workers)).unwrap();
            assert_eq!(joined.as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn reduce_of_empty_input_is_none() {
        let result = parallel_reduce(Vec::<u32>::new(), |a, b| a + b, Some(2)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = parallel_reduce(vec![1u32], |a, b| a + b, Some(0)).unwrap_err();
        assert!(matches!(err, HashTreeError::InvalidConfig(ConfigError::ZeroWorkers)));
    }

    #[test]
    fn xor_aggregate_is_worker_independent() {
        let digests: Vec<Digest> = (0u32..37)
            .map(|i| HashAlgorithm::Sha256.digest(&i.to_le_bytes()))
            .collect();
        let one = aggregate_xor(digests.clone(), Some(1)).unwrap();
        let many = aggregate_xor(digests.clone(), Some(8)).unwrap();
        assert_eq!(one, many);
        let mut reversed = digests;
        reversed.reverse();
        assert_eq!(aggregate_xor(reversed, Some(5)).unwrap(), one);
    }
}
