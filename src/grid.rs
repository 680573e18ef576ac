/// Regular 2D deposition grid.
///
/// `origin` is the physical coordinate of the grid's reference bin center and
/// `cell_size` applies to both axes. Cells are stored row-major with
/// `index = i * ny + j`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DepositGrid {
    origin: (f32, f32),
    cell_size: f32,
    nx: usize,
    ny: usize,
}

impl DepositGrid {
    pub fn new(origin: (f32, f32), cell_size: f32, nx: usize, ny: usize) -> Self {
        assert!(nx > 0, "nx must be > 0");
        assert!(ny > 0, "ny must be > 0");
        assert!(cell_size > 0.0, "cell_size must be > 0");
        Self {
            origin,
            cell_size,
            nx,
            ny,
        }
    }

    pub fn origin(&self) -> (f32, f32) {
        self.origin
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    pub fn cell_area(&self) -> f32 {
        self.cell_size * self.cell_size
    }

    /// Density contributed by one unit of weight in a single cell.
    pub fn inv_cell_area(&self) -> f32 {
        1.0 / (self.cell_size * self.cell_size)
    }

    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i * self.ny + j
    }

    /// Index with an `nx` row stride. Matches `idx` only on square grids; for
    /// `nx > ny` it can run past `size()`.
    pub fn idx_nx_stride(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i * self.nx + j
    }
}
