//! Per-epoch verification buffers.
//!
//! Light caches and full datasets are regenerated once per epoch. The store keeps a bounded
//! number of each in an LRU and hands out [`Arc`] handles: a verification holds its handle
//! until the mixing run returns, so evicting an epoch only drops the store's reference.

use crate::{Hashimoto, PowOutput};
use alloy_primitives::B256;
use lru::LruCache;
use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Mutex, OnceLock, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};

/// Number of blocks per epoch.
pub const EPOCH_LENGTH: u64 = 30_000;

/// Returns the epoch of block `number`.
pub const fn epoch(number: u64) -> u64 {
    number / EPOCH_LENGTH
}

/// The light verification cache of one epoch. Generated synchronously on first use.
#[derive(Debug)]
pub struct LightCache {
    epoch: u64,
    data: OnceLock<Box<[u8]>>,
}

impl LightCache {
    const fn new(epoch: u64) -> Self {
        Self { epoch, data: OnceLock::new() }
    }

    /// The epoch this cache belongs to.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns whether the cache has been generated.
    pub fn is_generated(&self) -> bool {
        self.data.get().is_some()
    }

    /// Returns the cache contents, generating them first if needed. Concurrent callers block
    /// until the single generation run completes.
    pub fn generate(&self, hasher: &dyn Hashimoto) -> &[u8] {
        self.data.get_or_init(|| {
            debug!(target: "ethash::epoch", epoch = self.epoch, "Generating light cache");
            crate::inc!(counter, CACHE_GENERATIONS);
            hasher.generate_cache(self.epoch).into_boxed_slice()
        })
    }
}

/// The full verification dataset of one epoch. Generated on a background thread.
#[derive(Debug)]
pub struct Dataset {
    epoch: u64,
    started: AtomicBool,
    data: OnceLock<Box<[u8]>>,
}

impl Dataset {
    const fn new(epoch: u64) -> Self {
        Self { epoch, started: AtomicBool::new(false), data: OnceLock::new() }
    }

    /// The epoch this dataset belongs to.
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns the dataset contents once generation has completed.
    pub fn generated(&self) -> Option<&[u8]> {
        self.data.get().map(AsRef::as_ref)
    }

    /// Claims the generation run. Only the first caller gets `true`.
    fn start(&self) -> bool {
        !self.started.swap(true, Ordering::AcqRel)
    }

    /// Releases a claimed run that never started, so the next caller claims it again.
    fn abandon(&self) {
        self.started.store(false, Ordering::Release);
    }

    fn generate(&self, hasher: &dyn Hashimoto, cache: &[u8]) {
        self.data.get_or_init(|| {
            debug!(target: "ethash::epoch", epoch = self.epoch, "Generating full dataset");
            crate::inc!(counter, DATASET_GENERATIONS);
            hasher.generate_dataset(self.epoch, cache).into_boxed_slice()
        });
        info!(target: "ethash::epoch", epoch = self.epoch, "Full dataset ready");
    }
}

/// An LRU of per-epoch items, plus a single slot for an item of the next epoch that is
/// prepared ahead of time.
#[derive(Debug)]
struct EpochLru<T> {
    items: LruCache<u64, Arc<T>>,
    future: Option<(u64, Arc<T>)>,
}

impl<T> EpochLru<T> {
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { items: LruCache::new(capacity), future: None }
    }

    /// Returns the item of `epoch`, creating it on a miss. On a miss that moves past the
    /// pending future item, a new future item for `epoch + 1` is created and returned too.
    fn get(&mut self, epoch: u64, new: impl Fn(u64) -> T) -> (Arc<T>, Option<Arc<T>>) {
        if let Some(item) = self.items.get(&epoch) {
            return (Arc::clone(item), None);
        }

        let current = match self.future.take() {
            Some((future_epoch, item)) if future_epoch == epoch => item,
            other => {
                self.future = other;
                Arc::new(new(epoch))
            }
        };
        self.items.put(epoch, Arc::clone(&current));

        let next = epoch.saturating_add(1);
        let mut future = None;
        if self.future.as_ref().is_none_or(|(future_epoch, _)| *future_epoch < next) {
            let item = Arc::new(new(next));
            self.future = Some((next, Arc::clone(&item)));
            future = Some(item);
        }
        (current, future)
    }
}

/// Shared store of light caches and full datasets.
#[derive(Debug)]
pub struct EpochStore {
    hasher: Arc<dyn Hashimoto>,
    caches: Mutex<EpochLru<LightCache>>,
    datasets: Mutex<LruCache<u64, Arc<Dataset>>>,
}

impl EpochStore {
    /// Creates a store keeping at most `caches` light caches and `datasets` full datasets.
    pub fn new(hasher: Arc<dyn Hashimoto>, caches: usize, datasets: usize) -> Self {
        let datasets = NonZeroUsize::new(datasets).unwrap_or(NonZeroUsize::MIN);
        Self {
            hasher,
            caches: Mutex::new(EpochLru::new(caches)),
            datasets: Mutex::new(LruCache::new(datasets)),
        }
    }

    /// Returns the generated light cache for block `number`. A cache for the following epoch
    /// is generated in the background when the current one is first requested.
    pub fn cache(&self, number: u64) -> Arc<LightCache> {
        let (current, future) = self
            .caches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(epoch(number), LightCache::new);

        current.generate(&*self.hasher);

        if let Some(future) = future {
            let hasher = Arc::clone(&self.hasher);
            let spawned = std::thread::Builder::new()
                .name("ethash-cache".to_string())
                .spawn(move || {
                    future.generate(&*hasher);
                });
            if let Err(err) = spawned {
                warn!(target: "ethash::epoch", %err, "Failed to spawn light cache generation");
            }
        }
        current
    }

    /// Returns the full dataset for block `number`. Generation is kicked off on a background
    /// thread on first request; callers check [`Dataset::generated`] for readiness.
    pub fn dataset(&self, number: u64) -> Arc<Dataset> {
        let epoch = epoch(number);
        let dataset = Arc::clone(
            self.datasets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_or_insert(epoch, || Arc::new(Dataset::new(epoch))),
        );

        if dataset.start() {
            let cache = self.cache(number);
            let hasher = Arc::clone(&self.hasher);
            let task = Arc::clone(&dataset);
            let spawned = std::thread::Builder::new()
                .name("ethash-dataset".to_string())
                .spawn(move || {
                    let cache = cache.generate(&*hasher);
                    task.generate(&*hasher, cache);
                });
            if let Err(err) = spawned {
                warn!(target: "ethash::epoch", epoch, %err, "Failed to spawn dataset generation");
                dataset.abandon();
            }
        }
        dataset
    }

    /// Runs the mixing primitive for block `number`, preferring the full dataset when `full`
    /// is set and the dataset is ready, and falling back to the light cache otherwise.
    pub fn hashimoto(&self, number: u64, seal_hash: B256, nonce: u64, full: bool) -> PowOutput {
        if full {
            let dataset = self.dataset(number);
            if let Some(data) = dataset.generated() {
                return self.hasher.hashimoto_full(data, seal_hash, nonce);
            }
            trace!(target: "ethash::epoch", number, "Dataset not ready, using light cache");
        }

        let cache = self.cache(number);
        let data = cache.generate(&*self.hasher);
        self.hasher.hashimoto_light(cache.epoch(), data, seal_hash, nonce)
    }
}
