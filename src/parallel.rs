//! Parallel nearest-grid-point deposition.
//!
//! Each task accumulates into its own zeroed scratch grid while claiming
//! particle chunks from a shared cursor, then adds the scratch grid into the
//! output under a mutex, one task at a time. The particle loop never locks.

use crate::mapping::ngp_cell;
use crate::{DepositConfig, DepositGrid, Particles};
use anyhow::{Context, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

type ScratchIndex = fn(&DepositGrid, usize, usize) -> usize;

pub struct Depositor {
    config: DepositConfig,
    pool: Option<ThreadPool>,
}

impl Default for Depositor {
    fn default() -> Self {
        Self {
            config: DepositConfig::from_env(),
            pool: None,
        }
    }
}

impl Depositor {
    /// Depositor whose tasks run on the global rayon pool.
    pub fn new(config: DepositConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "depositor: {} tasks, chunks of {}",
            config.worker_count,
            config.chunk_size
        );
        Ok(Self { config, pool: None })
    }

    /// Depositor with its own pool of exactly `worker_count` threads.
    pub fn with_dedicated_pool(config: DepositConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_count)
            .thread_name(|index| format!("deposit-{index}"))
            .build()
            .context("failed to build deposition thread pool")?;
        log::debug!(
            "depositor: dedicated pool of {} threads, chunks of {}",
            config.worker_count,
            config.chunk_size
        );
        Ok(Self {
            config,
            pool: Some(pool),
        })
    }

    pub fn config(&self) -> DepositConfig {
        self.config
    }

    /// Unit surface density. The scratch grid is laid out with an `nx` row
    /// stride and merged flat into `out`; on square grids this is the usual
    /// `i * ny + j` layout. When `nx > ny`, cells whose strided index passes
    /// `nx * ny` are dropped.
    pub fn ngp_sdens(&self, particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
        debug_assert_eq!(out.len(), grid.size(), "output length must be nx * ny");
        log::trace!(
            "ngp_sdens: {} particles onto {}x{}",
            particles.len(),
            grid.nx(),
            grid.ny()
        );
        let ds = grid.inv_cell_area();
        self.scatter(particles, grid, out, DepositGrid::idx_nx_stride, |_| ds);
    }

    /// Surface density scaled by each particle's weight.
    pub fn ngp_w_sdens(&self, particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
        debug_assert_eq!(out.len(), grid.size(), "output length must be nx * ny");
        log::trace!(
            "ngp_w_sdens: {} particles onto {}x{}",
            particles.len(),
            grid.nx(),
            grid.ny()
        );
        let ds = grid.inv_cell_area();
        self.scatter(particles, grid, out, DepositGrid::idx, |m| {
            particles.weight(m) * ds
        });
    }

    fn scatter<F>(
        &self,
        particles: &Particles,
        grid: &DepositGrid,
        out: &mut [f32],
        scratch_index: ScratchIndex,
        value: F,
    ) where
        F: Fn(usize) -> f32 + Sync,
    {
        let len = particles.len();
        if len == 0 {
            return;
        }
        let chunk = self.config.chunk_size;
        let workers = self.config.worker_count;
        let cursor = AtomicUsize::new(0);
        let shared = Mutex::new(out);

        let task = || {
            let mut scratch = vec![0.0_f32; grid.size()];
            loop {
                let start = cursor.fetch_add(chunk, Ordering::Relaxed);
                if start >= len {
                    break;
                }
                for m in start..(start + chunk).min(len) {
                    let (x, y) = particles.position(m);
                    let Some((i, j)) = ngp_cell(x, y, grid) else {
                        continue;
                    };
                    if let Some(cell) = scratch.get_mut(scratch_index(grid, i, j)) {
                        *cell += value(m);
                    }
                }
            }
            let mut merged = shared.lock().unwrap_or_else(PoisonError::into_inner);
            for (dst, src) in merged.iter_mut().zip(scratch.iter()) {
                *dst += *src;
            }
        };

        let run = || {
            rayon::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|_| task());
                }
            });
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

fn default_depositor() -> &'static Depositor {
    static DEFAULT: OnceLock<Depositor> = OnceLock::new();
    DEFAULT.get_or_init(Depositor::default)
}

/// [`Depositor::ngp_sdens`] on the process-wide default depositor.
pub fn ngp_sdens(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    default_depositor().ngp_sdens(particles, grid, out);
}

/// [`Depositor::ngp_w_sdens`] on the process-wide default depositor.
pub fn ngp_w_sdens(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    default_depositor().ngp_w_sdens(particles, grid, out);
}
