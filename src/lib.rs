//! Particle-to-mesh deposition of 2D particle sets onto regular grids.
//!
//! Kernels add surface density (or raw weight) into a caller-owned `nx * ny`
//! buffer indexed `i * ny + j`. Particles that map outside the grid are
//! skipped rather than clamped.

mod config;
pub mod deposit;
mod field;
mod grid;
pub mod mapping;
pub mod parallel;
mod particles;

pub use config::{DepositConfig, DEFAULT_CHUNK_SIZE, DEFAULT_WORKER_COUNT};
pub use deposit::{cic_sdens, cic_w_sdens, ngp_sdens_single, ngp_w_rebin, ngp_w_sdens_single};
pub use field::DensityMap;
pub use grid::DepositGrid;
pub use mapping::CicStencil;
pub use parallel::{ngp_sdens, ngp_w_sdens, Depositor};
pub use particles::Particles;
