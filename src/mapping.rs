//! Coordinate-to-cell mapping shared by the deposition kernels.
//!
//! Both families normalize a coordinate as `(p - b) / d + n / 2 - K`. The NGP
//! family uses `K = 0.5 * d`, the CIC family `K = 0.5`; the two only agree
//! when `d == 1`, and each kernel keeps its own convention.

use crate::DepositGrid;

/// Bilinear footprint of one particle: the lower-left cell `(i, j)` and the
/// weights for `(i, j)`, `(i, j + 1)`, `(i + 1, j)` and `(i + 1, j + 1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CicStencil {
    pub i: usize,
    pub j: usize,
    pub weights: [f32; 4],
}

impl CicStencil {
    pub fn for_each(&self, mut f: impl FnMut(usize, usize, f32)) {
        let [w00, w01, w10, w11] = self.weights;
        f(self.i, self.j, w00);
        f(self.i, self.j + 1, w01);
        f(self.i + 1, self.j, w10);
        f(self.i + 1, self.j + 1, w11);
    }
}

// The quotient and the result are single precision; only the half-grid shift
// is added in double.
fn normalized(p: f32, b: f32, d: f32, n: usize, k: f64) -> f32 {
    let scaled = (p - b) / d;
    (f64::from(scaled) + n as f64 / 2.0 - k) as f32
}

fn ngp_axis(p: f32, b: f32, d: f32, n: usize) -> Option<usize> {
    let cell = normalized(p, b, d, n, 0.5 * f64::from(d)).round();
    // NaN fails the range check too.
    if !(0.0..=(n - 1) as f32).contains(&cell) {
        return None;
    }
    Some(cell as usize)
}

fn cic_axis(p: f32, b: f32, d: f32, n: usize) -> Option<(usize, f32)> {
    if n < 2 {
        return None;
    }
    let t = normalized(p, b, d, n, 0.5);
    let cell = t.floor();
    if !(0.0..=(n - 2) as f32).contains(&cell) {
        return None;
    }
    Some((cell as usize, t - cell))
}

/// Nearest cell for a particle, or `None` when it falls outside the grid.
pub fn ngp_cell(x: f32, y: f32, grid: &DepositGrid) -> Option<(usize, usize)> {
    let (bx, by) = grid.origin();
    let d = grid.cell_size();
    let i = ngp_axis(x, bx, d, grid.nx())?;
    let j = ngp_axis(y, by, d, grid.ny())?;
    Some((i, j))
}

/// Four-cell bilinear stencil for a particle, or `None` when the stencil would
/// leave the grid. The last row and column can only receive weight as a `+1`
/// neighbor.
pub fn cic_stencil(x: f32, y: f32, grid: &DepositGrid) -> Option<CicStencil> {
    let (bx, by) = grid.origin();
    let d = grid.cell_size();
    let (i, fx) = cic_axis(x, bx, d, grid.nx())?;
    let (j, fy) = cic_axis(y, by, d, grid.ny())?;
    let wx = 1.0 - fx;
    let wy = 1.0 - fy;
    Some(CicStencil {
        i,
        j,
        weights: [wx * wy, wx * fy, fx * wy, fx * fy],
    })
}

fn center_axis(i: usize, b: f32, d: f32, n: usize, k: f64) -> f32 {
    let d = f64::from(d);
    (f64::from(b) + (i as f64 - n as f64 / 2.0 + k) * d) as f32
}

/// Physical position that the NGP mapping sends exactly onto `(i, j)`.
pub fn ngp_cell_center(i: usize, j: usize, grid: &DepositGrid) -> (f32, f32) {
    let (bx, by) = grid.origin();
    let d = grid.cell_size();
    let k = 0.5 * f64::from(d);
    (
        center_axis(i, bx, d, grid.nx(), k),
        center_axis(j, by, d, grid.ny(), k),
    )
}

/// Physical position that the CIC mapping sends exactly onto `(i, j)`.
pub fn cic_cell_center(i: usize, j: usize, grid: &DepositGrid) -> (f32, f32) {
    let (bx, by) = grid.origin();
    let d = grid.cell_size();
    (
        center_axis(i, bx, d, grid.nx(), 0.5),
        center_axis(j, by, d, grid.ny(), 0.5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn ngp_half_cell_offset_pushes_edge_particle_out() {
        // (5 - 0) / 1 + 5 - 0.5 = 9.5 rounds away from zero to 10.
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        assert_eq!(ngp_cell(5.0, 5.0, &grid), None);
        assert_eq!(ngp_cell(4.9, 4.9, &grid), Some((9, 9)));
    }

    #[test]
    fn ngp_rounds_half_away_from_zero() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        // normalized = 1.5 -> 2, normalized = -0.5 -> -1 (dropped)
        assert_eq!(ngp_cell(-3.0, -3.0, &grid), Some((2, 2)));
        assert_eq!(ngp_cell(-5.0, 0.0, &grid), None);
    }

    #[test]
    fn ngp_rounds_the_single_precision_coordinate() {
        // Each of these sits within an f64 ulp of a half-integer; the f32
        // value lands on the half and rounds away from zero.
        let grid = DepositGrid::new((0.0, 0.0), 0.1, 10, 10);
        assert_eq!(ngp_cell(-3.45e-1, 0.0, &grid), Some((2, 5)));
        assert_eq!(ngp_cell(-4.5000006e-2, 0.0, &grid), Some((5, 5)));
        assert_eq!(ngp_cell(4.5499998e-1, 0.0, &grid), None);
    }

    #[test]
    fn cic_fraction_comes_from_single_precision_coordinate() {
        let grid = DepositGrid::new((0.0, 0.0), 0.1, 10, 10);
        let stencil = cic_stencil(0.23, 0.0, &grid).unwrap();
        let t = (f64::from(0.23_f32 / 0.1) + 4.5) as f32;
        assert_eq!(stencil.i, t.floor() as usize);
        let fx = t - t.floor();
        assert_eq!(stencil.weights[2], fx * 0.5);
    }

    #[test]
    fn ngp_offset_scales_with_cell_size() {
        // K = 0.5 * d = 0.25: normalized = 0.0 / 0.5 + 2 - 0.25 = 1.75 -> 2.
        let grid = DepositGrid::new((0.0, 0.0), 0.5, 4, 4);
        assert_eq!(ngp_cell(0.0, 0.0, &grid), Some((2, 2)));
        // With the CIC offset the same point sits at 1.5.
        let stencil = cic_stencil(0.0, 0.0, &grid).unwrap();
        assert_eq!((stencil.i, stencil.j), (1, 1));
        assert_close(stencil.weights[3], 0.25, 1e-6);
    }

    #[test]
    fn ngp_center_maps_back_to_its_cell() {
        let grid = DepositGrid::new((3.0, -1.0), 0.5, 6, 8);
        for i in 0..6 {
            for j in 0..8 {
                let (x, y) = ngp_cell_center(i, j, &grid);
                assert_eq!(ngp_cell(x, y, &grid), Some((i, j)));
            }
        }
    }

    #[test]
    fn cic_center_puts_all_weight_in_one_cell() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        let (x, y) = cic_cell_center(3, 6, &grid);
        let stencil = cic_stencil(x, y, &grid).unwrap();
        assert_eq!((stencil.i, stencil.j), (3, 6));
        assert_eq!(stencil.weights, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn cic_weights_are_bilinear_and_sum_to_one() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        // normalized = (0.25 + 4.5, -1.0 + 4.5) = (4.75, 3.5)
        let stencil = cic_stencil(0.25, -1.0, &grid).unwrap();
        assert_eq!((stencil.i, stencil.j), (4, 3));
        let [w00, w01, w10, w11] = stencil.weights;
        assert_close(w00, 0.25 * 0.5, 1e-6);
        assert_close(w01, 0.25 * 0.5, 1e-6);
        assert_close(w10, 0.75 * 0.5, 1e-6);
        assert_close(w11, 0.75 * 0.5, 1e-6);
        assert_close(w00 + w01 + w10 + w11, 1.0, 1e-6);
    }

    #[test]
    fn cic_reserves_last_row_for_neighbor() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        // normalized 8.5 keeps i = 8, normalized 9.0 would need i + 1 = 10.
        assert!(cic_stencil(4.0, 0.0, &grid).is_some());
        assert_eq!(cic_stencil(4.5, 0.0, &grid), None);
        assert_eq!(cic_stencil(5.0, 0.0, &grid), None);
    }

    #[test]
    fn cic_drops_lower_edge() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 10, 10);
        // normalized -0.5 floors to -1.
        assert_eq!(cic_stencil(-5.0, 0.0, &grid), None);
        assert!(cic_stencil(-4.5, 0.0, &grid).is_some());
    }

    #[test]
    fn cic_needs_two_cells_per_axis() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 1, 4);
        assert_eq!(cic_stencil(0.0, 0.0, &grid), None);
    }

    #[test]
    fn non_finite_coordinates_are_dropped() {
        let grid = DepositGrid::new((0.0, 0.0), 1.0, 4, 4);
        assert_eq!(ngp_cell(f32::NAN, 0.0, &grid), None);
        assert_eq!(ngp_cell(0.0, f32::INFINITY, &grid), None);
        assert_eq!(cic_stencil(f32::NAN, 0.0, &grid), None);
        assert_eq!(cic_stencil(0.0, f32::NEG_INFINITY, &grid), None);
    }

    #[test]
    fn stencil_visits_cells_in_weight_order() {
        let stencil = CicStencil {
            i: 2,
            j: 5,
            weights: [0.1, 0.2, 0.3, 0.4],
        };
        let mut seen = Vec::new();
        stencil.for_each(|i, j, w| seen.push((i, j, w)));
        assert_eq!(
            seen,
            vec![(2, 5, 0.1), (2, 6, 0.2), (3, 5, 0.3), (3, 6, 0.4)]
        );
    }
}
