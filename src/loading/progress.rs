//! Aggregate load progress over a session's parts.

/// Per-part fractions plus the highest aggregate reported so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadProgress {
    fractions: Vec<f32>,
    reported: f32,
}

impl LoadProgress {
    pub fn new(parts: usize) -> Self {
        Self {
            fractions: vec![0.0; parts],
            reported: 0.0,
        }
    }

    /// Record a fraction for one part and return the aggregate percentage.
    /// Out-of-range indices are ignored; neither the part nor the aggregate
    /// ever move backwards.
    pub fn report(&mut self, index: usize, fraction: f32) -> f32 {
        if let Some(slot) = self.fractions.get_mut(index) {
            let fraction = if fraction.is_nan() {
                0.0
            } else {
                fraction.clamp(0.0, 1.0)
            };
            *slot = slot.max(fraction);
        }
        self.reported = self.reported.max(self.aggregate());
        self.reported
    }

    pub fn complete(&mut self, index: usize) -> f32 {
        self.report(index, 1.0)
    }

    /// Aggregate progress in 0..=100. A session without parts is complete.
    pub fn percent(&self) -> f32 {
        if self.fractions.is_empty() {
            return 100.0;
        }
        self.reported
    }

    fn aggregate(&self) -> f32 {
        if self.fractions.is_empty() {
            return 100.0;
        }
        let sum: f32 = self.fractions.iter().sum();
        sum / self.fractions.len() as f32 * 100.0
    }
}
