//! Value generator port
//!
//! Scenario builders draw randomised inputs (such as a numeric suffix for a
//! user name) from this port instead of calling a RNG directly, so a run can
//! be replayed with fixed values.

/// Source of generated values for scenario builders.
pub trait ValueGenerator: Send + Sync {
    /// Returns a value in `0..upper`. `upper` of zero yields zero.
    fn next_below(&self, upper: u32) -> u32;
}

/// Generator that always returns the same value (clamped below `upper`).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedValueGenerator {
    value: u32,
}

impl FixedValueGenerator {
    /// Creates a generator returning `value`.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self { value }
    }
}

impl ValueGenerator for FixedValueGenerator {
    fn next_below(&self, upper: u32) -> u32 {
        if upper == 0 { 0 } else { self.value % upper }
    }
}
