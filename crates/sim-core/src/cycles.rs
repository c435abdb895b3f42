//! Clock edge counter.

use std::fmt;

/// A count of rising clock edges seen by a model.
///
/// There is no notion of wall-clock time: one call from the driver is one
/// cycle, whatever the driver's clock period happens to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cycles(u64);

impl Cycles {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Count one more edge. Wraps rather than panicking on very long runs.
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

impl fmt::Display for Cycles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cycles", self.0)
    }
}
