//! State variables and their integer-coded domains

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stance coding shared by both sides.
pub mod stance {
    pub const RIGHT: i8 = 0;
    pub const SQUARE: i8 = 1;
    pub const LEFT: i8 = 2;
}

/// Outcome coding of the `GameWin` variable.
pub mod outcome {
    pub const LOSS: i8 = -1;
    pub const ONGOING: i8 = 0;
    pub const WIN: i8 = 1;
}

const BINARY: &[i8] = &[0, 1];
const STANCES: &[i8] = &[stance::RIGHT, stance::SQUARE, stance::LEFT];
const OUTCOMES: &[i8] = &[outcome::LOSS, outcome::ONGOING, outcome::WIN];

/// The nine variables that make up the grappling state vector.
///
/// Declaration order is the order of the state vector and of the state-space
/// product, so it must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    SelfLeftGrip,
    SelfRightGrip,
    OppLeftGrip,
    OppRightGrip,
    SelfStance,
    OppStance,
    SelfFatigue,
    OppFatigue,
    GameWin,
}

impl Variable {
    pub const COUNT: usize = 9;

    pub const ALL: [Variable; Variable::COUNT] = [
        Variable::SelfLeftGrip,
        Variable::SelfRightGrip,
        Variable::OppLeftGrip,
        Variable::OppRightGrip,
        Variable::SelfStance,
        Variable::OppStance,
        Variable::SelfFatigue,
        Variable::OppFatigue,
        Variable::GameWin,
    ];

    /// Position of this variable in the state vector.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Variable::SelfLeftGrip => "SelfLeftGrip",
            Variable::SelfRightGrip => "SelfRightGrip",
            Variable::OppLeftGrip => "OppLeftGrip",
            Variable::OppRightGrip => "OppRightGrip",
            Variable::SelfStance => "SelfStance",
            Variable::OppStance => "OppStance",
            Variable::SelfFatigue => "SelfFatigue",
            Variable::OppFatigue => "OppFatigue",
            Variable::GameWin => "GameWin",
        }
    }

    pub fn domain(self) -> &'static [i8] {
        match self {
            Variable::SelfStance | Variable::OppStance => STANCES,
            Variable::GameWin => OUTCOMES,
            _ => BINARY,
        }
    }

    pub fn is_fatigue(self) -> bool {
        matches!(self, Variable::SelfFatigue | Variable::OppFatigue)
    }

    /// Build the owned descriptor used by [`super::StateSpace`].
    pub fn descriptor(self) -> StateVariable {
        StateVariable::new(self.name(), self.domain().to_vec())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named variable with a small finite domain of integer-coded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateVariable {
    name: String,
    domain: Vec<i8>,
}

impl StateVariable {
    pub fn new(name: impl Into<String>, domain: Vec<i8>) -> Self {
        Self {
            name: name.into(),
            domain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &[i8] {
        &self.domain
    }

    /// Number of values in the domain
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// Position of `value` within the domain, if present
    pub fn position_of(&self, value: i8) -> Option<usize> {
        self.domain.iter().position(|&candidate| candidate == value)
    }
}

/// The nine standard variables in state-vector order.
pub fn standard_variables() -> Vec<StateVariable> {
    Variable::ALL.iter().map(|v| v.descriptor()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_index_matches_declaration_order() {
        for (i, variable) in Variable::ALL.iter().enumerate() {
            assert_eq!(variable.index(), i);
        }
    }

    #[test]
    fn zero_is_in_every_domain() {
        // The initial state assigns 0 to every variable.
        for variable in Variable::ALL {
            assert!(variable.domain().contains(&0), "{variable} lacks 0");
        }
    }

    #[test]
    fn outcome_domain_position() {
        let game_win = Variable::GameWin.descriptor();
        assert_eq!(game_win.position_of(outcome::LOSS), Some(0));
        assert_eq!(game_win.position_of(outcome::WIN), Some(2));
        assert_eq!(game_win.position_of(5), None);
    }
}
