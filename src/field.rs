use crate::grid::DepositGrid;

/// Owned density buffer sized for its grid, for callers that do not manage
/// their own output slice.
#[derive(Clone, Debug, PartialEq)]
pub struct DensityMap {
    grid: DepositGrid,
    data: Vec<f32>,
}

impl DensityMap {
    pub fn new(grid: DepositGrid) -> Self {
        let data = vec![0.0; grid.size()];
        Self { grid, data }
    }

    pub fn grid(&self) -> DepositGrid {
        self.grid
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[self.grid.idx(i, j)]
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Deposited weight: the density integrated over the cell area.
    pub fn total_weight(&self) -> f64 {
        let area = f64::from(self.grid.cell_area());
        self.data.iter().map(|value| f64::from(*value) * area).sum()
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        let mut min_value = *first;
        let mut max_value = *first;
        for value in iter {
            if *value < min_value {
                min_value = *value;
            }
            if *value > max_value {
                max_value = *value;
            }
        }
        (min_value, max_value)
    }
}
