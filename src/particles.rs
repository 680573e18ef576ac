/// Borrowed particle set: parallel coordinate arrays plus optional per-particle
/// weights. A missing weight array means every particle carries unit weight.
#[derive(Clone, Copy, Debug)]
pub struct Particles<'a> {
    x: &'a [f32],
    y: &'a [f32],
    weights: Option<&'a [f32]>,
}

impl<'a> Particles<'a> {
    pub fn new(x: &'a [f32], y: &'a [f32]) -> Self {
        debug_assert_eq!(x.len(), y.len(), "x and y lengths differ");
        Self { x, y, weights: None }
    }

    pub fn weighted(x: &'a [f32], y: &'a [f32], weights: &'a [f32]) -> Self {
        debug_assert_eq!(x.len(), y.len(), "x and y lengths differ");
        debug_assert_eq!(x.len(), weights.len(), "weight length differs");
        Self {
            x,
            y,
            weights: Some(weights),
        }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x(&self) -> &'a [f32] {
        self.x
    }

    pub fn y(&self) -> &'a [f32] {
        self.y
    }

    pub fn weights(&self) -> Option<&'a [f32]> {
        self.weights
    }

    pub fn position(&self, m: usize) -> (f32, f32) {
        (self.x[m], self.y[m])
    }

    pub fn weight(&self, m: usize) -> f32 {
        match self.weights {
            Some(weights) => weights[m],
            None => 1.0,
        }
    }

    /// Sum of all weights (the particle count when unweighted).
    pub fn total_weight(&self) -> f64 {
        match self.weights {
            Some(weights) => weights.iter().map(|w| f64::from(*w)).sum(),
            None => self.len() as f64,
        }
    }
}
