//! Dense value table over pairs of state indices

use std::fmt;

use crate::{
    Error, Result,
    grappling::{StateIndex, StateKey},
};

/// Learned value for every `(from, to)` pair of the state space.
///
/// Storage is a flat row-major vector of `size * size` entries, all zero at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueTable {
    size: usize,
    values: Vec<f64>,
}

impl ValueTable {
    /// Create a zeroed table for a state space with `size` states
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] when `size * size` does not
    /// fit in `usize`.
    pub fn new(size: usize) -> Result<Self> {
        let entries = size
            .checked_mul(size)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!("a value table over {size} states has too many entries"),
            })?;
        Ok(Self {
            size,
            values: vec![0.0; entries],
        })
    }

    /// Number of states per axis
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn slot(&self, key: StateKey) -> Result<usize> {
        let (from, to) = (key.from.value(), key.to.value());
        for index in [from, to] {
            if index >= self.size {
                return Err(Error::StateIndexOutOfRange {
                    index,
                    size: self.size,
                });
            }
        }
        Ok(from * self.size + to)
    }

    pub fn get(&self, key: StateKey) -> Result<f64> {
        Ok(self.values[self.slot(key)?])
    }

    pub fn set(&mut self, key: StateKey, value: f64) -> Result<()> {
        let slot = self.slot(key)?;
        self.values[slot] = value;
        Ok(())
    }

    /// Move an entry toward `target`: `V <- V + rate * (target - V)`.
    ///
    /// Returns the updated value.
    pub fn update_toward(&mut self, key: StateKey, target: f64, rate: f64) -> Result<f64> {
        let slot = self.slot(key)?;
        let current = self.values[slot];
        let updated = current + rate * (target - current);
        self.values[slot] = updated;
        Ok(updated)
    }

    /// True when no entry has moved away from zero
    pub fn is_zeroed(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Number of non-zero entries
    pub fn nonzero_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0.0).count()
    }

    /// Iterate over non-zero entries in row-major order
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(move |(slot, &v)| (slot / self.size, slot % self.size, v))
    }

    /// Values of one `from` row
    pub fn row(&self, from: StateIndex) -> Result<&[f64]> {
        let start = self.slot(StateKey::new(from, from))? - from.value();
        Ok(&self.values[start..start + self.size])
    }
}

/// Renders the full table as a bordered grid, one `from` row per line.
impl fmt::Display for ValueTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(34);
        for row in self.values.chunks(self.size.max(1)) {
            writeln!(f, "{rule}")?;
            write!(f, "| ")?;
            for value in row {
                write!(f, "{:<6} | ", value)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{rule}")
    }
}
