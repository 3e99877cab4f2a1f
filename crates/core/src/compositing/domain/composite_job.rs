use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use ndarray::{Array2, Array3};

/// Reusable buffers for one frame's swap stage.
///
/// `source` is the canonical patch cut from the frame, `generated` the
/// model's face and `mask` its soft mask, all `size × size`, values 0..1.
pub struct CompositeJob {
    pub source: Array3<f32>,
    pub generated: Array3<f32>,
    pub mask: Array2<f32>,
}

impl CompositeJob {
    pub fn new(size: usize) -> Self {
        Self {
            source: Array3::zeros((size, size, 3)),
            generated: Array3::zeros((size, size, 3)),
            mask: Array2::zeros((size, size)),
        }
    }

    /// Zero-sized placeholder; never allocates.
    fn empty() -> Self {
        Self::new(0)
    }
}

/// Free list of [`CompositeJob`]s shared by all workers.
///
/// Jobs are allocated lazily, so the pool grows only to the number of jobs
/// borrowed at the same time.
pub struct CompositeJobPool {
    size: usize,
    free: Mutex<Vec<CompositeJob>>,
    allocated: AtomicUsize,
}

impl CompositeJobPool {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            free: Mutex::new(Vec::new()),
            allocated: AtomicUsize::new(0),
        }
    }

    pub fn acquire(&self) -> PooledJob<'_> {
        let recycled = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let job = recycled.unwrap_or_else(|| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            CompositeJob::new(self.size)
        });
        PooledJob { job, pool: self }
    }

    /// Jobs ever allocated by this pool.
    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }

    /// Jobs currently sitting in the free list.
    pub fn available(&self) -> usize {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, job: CompositeJob) {
        self.free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(job);
    }
}

/// A borrowed job; returns to its pool when dropped.
pub struct PooledJob<'a> {
    job: CompositeJob,
    pool: &'a CompositeJobPool,
}

impl Deref for PooledJob<'_> {
    type Target = CompositeJob;

    fn deref(&self) -> &CompositeJob {
        &self.job
    }
}

impl DerefMut for PooledJob<'_> {
    fn deref_mut(&mut self) -> &mut CompositeJob {
        &mut self.job
    }
}

impl Drop for PooledJob<'_> {
    fn drop(&mut self) {
        let job = std::mem::replace(&mut self.job, CompositeJob::empty());
        self.pool.release(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_has_patch_shapes() {
        let job = CompositeJob::new(224);
        assert_eq!(job.source.dim(), (224, 224, 3));
        assert_eq!(job.generated.dim(), (224, 224, 3));
        assert_eq!(job.mask.dim(), (224, 224));
    }

    #[test]
    fn test_job_returns_to_pool_on_drop() {
        let pool = CompositeJobPool::new(4);
        {
            let mut job = pool.acquire();
            job.mask.fill(1.0);
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);

        let job = pool.acquire();
        assert_eq!(pool.allocated(), 1);
        assert_eq!(job.mask[[0, 0]], 1.0, "recycled buffers are reused as-is");
    }

    #[test]
    fn test_pool_grows_to_concurrent_borrows_only() {
        let pool = CompositeJobPool::new(2);
        for _ in 0..10 {
            let _a = pool.acquire();
            let _b = pool.acquire();
        }
        assert_eq!(pool.allocated(), 2);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_pool_is_shared_across_threads() {
        let pool = std::sync::Arc::new(CompositeJobPool::new(8));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        let mut job = pool.acquire();
                        job.source.fill(0.5);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.allocated() <= 4);
        assert_eq!(pool.available(), pool.allocated());
    }
}
