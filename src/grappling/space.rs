//! Enumeration of the grappling state space
//!
//! The state space is the ordered Cartesian product of every variable's
//! domain. The last variable varies fastest, so index 0 is the assignment of
//! each variable's first domain value and consecutive indices differ in the
//! `GameWin` variable first.

use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use super::{
    state::GameState,
    variables::{StateVariable, standard_variables},
};
use crate::{Error, Result};

/// Number of states produced by the nine standard variables.
pub const STANDARD_STATE_COUNT: usize = 1728;

/// Index of a full assignment within the state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateIndex(usize);

impl StateIndex {
    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical value-table key: (state before the action, state reached).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub from: StateIndex,
    pub to: StateIndex,
}

impl StateKey {
    pub fn new(from: StateIndex, to: StateIndex) -> Self {
        Self { from, to }
    }

    /// Self-loop key used for an absorbing (terminal) state.
    pub fn absorbing(index: StateIndex) -> Self {
        Self::new(index, index)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.from, self.to)
    }
}

/// Bijection between full variable assignments and `[0, size)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpace {
    variables: Vec<StateVariable>,
    /// Mixed-radix place value of each variable
    strides: Vec<usize>,
    size: usize,
}

impl StateSpace {
    /// Build a state space and check it against the expected state count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateSpaceMismatch`] when the product of domain sizes
    /// differs from `expected_size`, and [`Error::InvalidDomain`] or
    /// [`Error::EmptyStateSpace`] for malformed variable lists (including a
    /// domain product too large to index).
    pub fn new(variables: Vec<StateVariable>, expected_size: usize) -> Result<Self> {
        if variables.is_empty() {
            return Err(Error::EmptyStateSpace);
        }

        for variable in &variables {
            if variable.domain().is_empty() {
                return Err(Error::InvalidDomain {
                    variable: variable.name().to_string(),
                    reason: "domain is empty".to_string(),
                });
            }
            let distinct: HashSet<i8> = variable.domain().iter().copied().collect();
            if distinct.len() != variable.cardinality() {
                return Err(Error::InvalidDomain {
                    variable: variable.name().to_string(),
                    reason: "domain contains duplicate values".to_string(),
                });
            }
        }

        let size = variables
            .iter()
            .try_fold(1usize, |acc, v| acc.checked_mul(v.cardinality()))
            .ok_or_else(|| Error::InvalidDomain {
                variable: variables
                    .iter()
                    .map(StateVariable::name)
                    .collect::<Vec<_>>()
                    .join(" x "),
                reason: "product of domain sizes overflows".to_string(),
            })?;
        if size != expected_size {
            return Err(Error::StateSpaceMismatch {
                computed: size,
                expected: expected_size,
            });
        }

        let mut strides = vec![1; variables.len()];
        for i in (0..variables.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * variables[i + 1].cardinality();
        }

        Ok(Self {
            variables,
            strides,
            size,
        })
    }

    /// The nine standard grappling variables checked against [`STANDARD_STATE_COUNT`].
    pub fn standard() -> Result<Self> {
        Self::standard_with_expected(STANDARD_STATE_COUNT)
    }

    /// The standard variables checked against a caller-supplied count.
    pub fn standard_with_expected(expected_size: usize) -> Result<Self> {
        Self::new(standard_variables(), expected_size)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn variables(&self) -> &[StateVariable] {
        &self.variables
    }

    /// Map a full assignment to its index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if the arity is wrong or any value lies
    /// outside its variable's domain.
    pub fn encode(&self, values: &[i8]) -> Result<StateIndex> {
        if values.len() != self.variables.len() {
            return Err(Error::UnknownState {
                values: values.to_vec(),
                reason: format!(
                    "expected {} variables, got {}",
                    self.variables.len(),
                    values.len()
                ),
            });
        }

        let mut index = 0;
        for ((variable, &value), stride) in self.variables.iter().zip(values).zip(&self.strides) {
            let position = variable
                .position_of(value)
                .ok_or_else(|| Error::UnknownState {
                    values: values.to_vec(),
                    reason: format!(
                        "{value} is not in the domain {:?} of '{}'",
                        variable.domain(),
                        variable.name()
                    ),
                })?;
            index += position * stride;
        }
        Ok(StateIndex(index))
    }

    /// Map an index back to its full assignment.
    pub fn decode(&self, index: StateIndex) -> Result<Vec<i8>> {
        let raw = self.check_index(index.0)?.0;
        Ok(self
            .variables
            .iter()
            .zip(&self.strides)
            .map(|(variable, stride)| variable.domain()[(raw / stride) % variable.cardinality()])
            .collect())
    }

    /// Validate a raw index.
    pub fn check_index(&self, raw: usize) -> Result<StateIndex> {
        if raw < self.size {
            Ok(StateIndex(raw))
        } else {
            Err(Error::StateIndexOutOfRange {
                index: raw,
                size: self.size,
            })
        }
    }

    pub fn encode_state(&self, state: &GameState) -> Result<StateIndex> {
        self.encode(state.values())
    }

    /// Encode both endpoints of a transition into a table key.
    pub fn key(&self, from: &GameState, to: &GameState) -> Result<StateKey> {
        Ok(StateKey::new(self.encode_state(from)?, self.encode_state(to)?))
    }

    /// Iterate over every index in order.
    pub fn indices(&self) -> impl Iterator<Item = StateIndex> + '_ {
        (0..self.size).map(StateIndex)
    }
}
