//! Sequential deposition kernels.
//!
//! Every kernel adds into `out` and never clears it, so repeated calls into the
//! same buffer accumulate. `out` must hold `grid.size()` cells. Particles that
//! map outside the grid are skipped.

use crate::mapping::{cic_stencil, ngp_cell};
use crate::{DepositGrid, Particles};

fn check_output(grid: &DepositGrid, out: &[f32]) {
    debug_assert_eq!(out.len(), grid.size(), "output length must be nx * ny");
}

fn ngp_accumulate(
    particles: &Particles,
    grid: &DepositGrid,
    out: &mut [f32],
    value: impl Fn(usize) -> f32,
) {
    for (m, (&x, &y)) in particles.x().iter().zip(particles.y()).enumerate() {
        let Some((i, j)) = ngp_cell(x, y, grid) else {
            continue;
        };
        out[grid.idx(i, j)] += value(m);
    }
}

fn cic_accumulate(
    particles: &Particles,
    grid: &DepositGrid,
    out: &mut [f32],
    value: impl Fn(usize) -> f32,
) {
    for (m, (&x, &y)) in particles.x().iter().zip(particles.y()).enumerate() {
        let Some(stencil) = cic_stencil(x, y, grid) else {
            continue;
        };
        let v = value(m);
        stencil.for_each(|i, j, w| {
            out[grid.idx(i, j)] += w * v;
        });
    }
}

/// Nearest-grid-point surface density, one particle per unit weight.
pub fn ngp_sdens_single(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    check_output(grid, out);
    log::trace!(
        "ngp_sdens_single: {} particles onto {}x{}",
        particles.len(),
        grid.nx(),
        grid.ny()
    );
    let ds = grid.inv_cell_area();
    ngp_accumulate(particles, grid, out, |_| ds);
}

/// Nearest-grid-point surface density scaled by each particle's weight.
pub fn ngp_w_sdens_single(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    check_output(grid, out);
    log::trace!(
        "ngp_w_sdens_single: {} particles onto {}x{}",
        particles.len(),
        grid.nx(),
        grid.ny()
    );
    let ds = grid.inv_cell_area();
    ngp_accumulate(particles, grid, out, |m| particles.weight(m) * ds);
}

/// Cloud-in-cell surface density: each particle's unit density is split
/// bilinearly over its four enclosing cells.
pub fn cic_sdens(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    check_output(grid, out);
    log::trace!(
        "cic_sdens: {} particles onto {}x{}",
        particles.len(),
        grid.nx(),
        grid.ny()
    );
    let ds = grid.inv_cell_area();
    cic_accumulate(particles, grid, out, |_| ds);
}

/// Weighted cloud-in-cell surface density.
pub fn cic_w_sdens(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    check_output(grid, out);
    log::trace!(
        "cic_w_sdens: {} particles onto {}x{}",
        particles.len(),
        grid.nx(),
        grid.ny()
    );
    let ds = grid.inv_cell_area();
    cic_accumulate(particles, grid, out, |m| particles.weight(m) * ds);
}

/// Nearest-grid-point rebinning of raw weights. Unlike the density kernels the
/// result is not divided by the cell area.
pub fn ngp_w_rebin(particles: &Particles, grid: &DepositGrid, out: &mut [f32]) {
    check_output(grid, out);
    log::trace!(
        "ngp_w_rebin: {} particles onto {}x{}",
        particles.len(),
        grid.nx(),
        grid.ny()
    );
    ngp_accumulate(particles, grid, out, |m| particles.weight(m));
}
