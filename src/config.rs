//! Construction parameters and capacity arithmetic.

use crate::error::{Error, Result};

/// Smallest table; keeps the placement shift below 64.
pub const MIN_CAPACITY: usize = 2;
/// Largest power-of-two table any variant will allocate.
pub const MAX_CAPACITY: usize = 1 << 30;

pub const DEFAULT_CAPACITY: usize = 51;
pub const DEFAULT_LOAD_FACTOR: f32 = 0.8;

/// Sizing parameters accepted by every table's `with_config`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub load_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new(initial_capacity: usize, load_factor: f32) -> Self {
        Self {
            initial_capacity,
            load_factor,
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f32) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Rejects load factors outside (0, 1) and capacities above
    /// [`MAX_CAPACITY`].
    pub fn validate(&self) -> Result<()> {
        // NaN fails both comparisons and is rejected here too.
        if !(self.load_factor > 0.0 && self.load_factor < 1.0) {
            return Err(Error::invalid_load_factor(self.load_factor));
        }
        if self.initial_capacity > MAX_CAPACITY {
            return Err(Error::invalid_capacity(self.initial_capacity));
        }
        Ok(())
    }

    /// Table capacity this configuration starts with: the initial capacity
    /// rounded up to a power of two, never below [`MIN_CAPACITY`].
    pub fn table_capacity(&self) -> Result<usize> {
        self.validate()?;
        Ok(round_capacity(self.initial_capacity))
    }
}

/// Next power of two at or above `n`, clamped to `[MIN_CAPACITY, MAX_CAPACITY]`.
pub(crate) fn round_capacity(n: usize) -> usize {
    n.max(MIN_CAPACITY)
        .checked_next_power_of_two()
        .unwrap_or(MAX_CAPACITY)
        .min(MAX_CAPACITY)
}

/// Number of live entries that triggers growth for a table of `capacity`.
pub(crate) fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    let t = (capacity as f64 * load_factor as f64) as usize;
    t.clamp(1, capacity - 1)
}

/// Smallest capacity whose threshold stays above `len`, or `None` when not
/// even [`MAX_CAPACITY`] slots can hold `len` entries.
pub(crate) fn capacity_for_len(len: usize, load_factor: f32) -> Option<usize> {
    let mut cap = round_capacity(len.checked_add(1)?);
    while threshold_for(cap, load_factor) <= len {
        if cap >= MAX_CAPACITY {
            return None;
        }
        cap <<= 1;
    }
    Some(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_rounds_51_to_64() {
        let c = TableConfig::default();
        assert_eq!(c.initial_capacity, 51);
        assert_eq!(c.load_factor, 0.8);
        assert_eq!(c.table_capacity().unwrap(), 64);
    }

    /// Invariant: capacity 5 at load factor 0.5 rounds to 8 with threshold 4.
    #[test]
    fn rounding_and_threshold() {
        let c = TableConfig::new(5, 0.5);
        let cap = c.table_capacity().unwrap();
        assert_eq!(cap, 8);
        assert_eq!(threshold_for(cap, 0.5), 4);
        assert_eq!(TableConfig::new(0, 0.5).table_capacity().unwrap(), 2);
    }

    #[test]
    fn rejects_bad_load_factors() {
        for lf in [0.0, 1.0, -0.5, 1.5, f32::NAN] {
            assert!(matches!(
                TableConfig::new(8, lf).validate(),
                Err(Error::InvalidLoadFactor { .. })
            ));
        }
    }

    #[test]
    fn rejects_oversized_capacity() {
        let err = TableConfig::new(MAX_CAPACITY + 1, 0.5).validate().unwrap_err();
        assert_eq!(err, Error::invalid_capacity(MAX_CAPACITY + 1));
        assert!(TableConfig::new(MAX_CAPACITY, 0.5).validate().is_ok());
    }

    /// Invariant: threshold is at least one and strictly below capacity.
    #[test]
    fn threshold_bounds() {
        assert_eq!(threshold_for(2, 0.01), 1);
        assert_eq!(threshold_for(2, 0.99), 1);
        assert_eq!(threshold_for(64, 0.8), 51);
        assert_eq!(threshold_for(1024, 0.999), 1022);
    }

    #[test]
    fn capacity_for_len_keeps_len_under_threshold() {
        for lf in [0.1f32, 0.5, 0.8, 0.95] {
            for len in [0usize, 1, 7, 8, 100, 1000] {
                let cap = capacity_for_len(len, lf).unwrap();
                assert!(cap.is_power_of_two());
                assert!(threshold_for(cap, lf) > len, "lf={lf} len={len} cap={cap}");
            }
        }
    }

    #[test]
    fn capacity_for_len_reports_overflow() {
        assert_eq!(capacity_for_len(usize::MAX, 0.5), None);
        assert_eq!(capacity_for_len(MAX_CAPACITY, 0.99), None);
        let limit = threshold_for(MAX_CAPACITY, 0.5);
        assert_eq!(capacity_for_len(limit - 1, 0.5), Some(MAX_CAPACITY));
        assert_eq!(capacity_for_len(limit, 0.5), None);
    }
}
