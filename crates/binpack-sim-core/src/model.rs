use serde::{Deserialize, Serialize};

/// Capacity shared by every bin. Item sizes are relative to it.
pub const BIN_CAPACITY: f64 = 1.0;

/// Slack applied to every capacity comparison to absorb floating-point rounding.
pub const TOLERANCE: f64 = 1e-4;

/// An item to place. `index` is its position in input order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub index: usize,
    pub size: f64,
}

impl Item {
    pub fn new(index: usize, size: f64) -> Self {
        Self { index, size }
    }
}

/// A bin opened during a run. `index` is assigned in creation order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bin {
    pub index: usize,
    pub fill_level: f64,
}

impl Bin {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            fill_level: 0.0,
        }
    }

    /// Capacity left after hypothetically adding `size` (negative when it overflows).
    #[inline]
    pub fn residual(&self, size: f64) -> f64 {
        BIN_CAPACITY - self.fill_level - size
    }

    /// First-Fit acceptance test: `fill_level + size <= capacity + TOLERANCE`.
    #[inline]
    pub fn fits(&self, size: f64) -> bool {
        self.fill_level + size <= BIN_CAPACITY + TOLERANCE
    }

    /// Best-Fit candidate test: the residual is not below `-TOLERANCE`.
    #[inline]
    pub fn is_candidate(&self, size: f64) -> bool {
        self.residual(size) >= -TOLERANCE
    }

    /// Remaining capacity, clamped at zero.
    pub fn free_space(&self) -> f64 {
        (BIN_CAPACITY - self.fill_level).max(0.0)
    }

    /// True while the capacity invariant holds.
    pub fn within_capacity(&self) -> bool {
        self.fill_level <= BIN_CAPACITY + TOLERANCE
    }

    pub(crate) fn place(&mut self, size: f64) -> f64 {
        self.fill_level += size;
        self.fill_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_absorbs_rounding_at_exact_capacity() {
        let mut b = Bin::new(0);
        b.place(0.1);
        b.place(0.2);
        // 0.1 + 0.2 + 0.7 lands a hair above 1.0 in binary floating point
        assert!(b.fits(0.7));
        assert!(b.is_candidate(0.7));
    }

    #[test]
    fn residual_is_negative_on_overflow() {
        let mut b = Bin::new(3);
        b.place(0.9);
        assert!(b.residual(0.2) < -TOLERANCE);
        assert!(!b.fits(0.2));
        assert!(!b.is_candidate(0.2));
        assert!((b.free_space() - 0.1).abs() < 1e-12);
    }
}
