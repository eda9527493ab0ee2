//! Game state representation and stamina bookkeeping

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    action::Action,
    variables::{Variable, outcome},
};
use crate::{Error, Result};

/// One of the two competitors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Agent,
    Opponent,
}

impl Side {
    fn fatigue_variable(self) -> Variable {
        match self {
            Side::Agent => Variable::SelfFatigue,
            Side::Opponent => Variable::OppFatigue,
        }
    }
}

/// Match result from the agent's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Loss,
    Ongoing,
    Win,
}

impl Outcome {
    pub fn code(self) -> i8 {
        match self {
            Outcome::Loss => outcome::LOSS,
            Outcome::Ongoing => outcome::ONGOING,
            Outcome::Win => outcome::WIN,
        }
    }

    fn from_code(code: i8) -> Outcome {
        match code.signum() {
            -1 => Outcome::Loss,
            1 => Outcome::Win,
            _ => Outcome::Ongoing,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Loss => "loss",
            Outcome::Ongoing => "ongoing",
            Outcome::Win => "win",
        };
        f.write_str(label)
    }
}

/// A point in the match: one value per state variable plus both staminas.
///
/// Terminality is never stored separately; it is always read back from the
/// `GameWin` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    values: [i8; Variable::COUNT],
    agent_stamina: u32,
    opponent_stamina: u32,
}

impl GameState {
    /// Fresh episode state: every variable zero, both sides at full stamina.
    pub fn new(agent_stamina_max: u32, opponent_stamina_max: u32) -> Self {
        Self {
            values: [0; Variable::COUNT],
            agent_stamina: agent_stamina_max,
            opponent_stamina: opponent_stamina_max,
        }
    }

    /// The state vector in [`Variable::ALL`] order.
    pub fn values(&self) -> &[i8] {
        &self.values
    }

    pub fn get(&self, variable: Variable) -> i8 {
        self.values[variable.index()]
    }

    /// Assign a variable, enforcing its domain and the monotonic flags.
    ///
    /// # Errors
    ///
    /// * [`Error::ValueOutOfDomain`] if `value` is not a legal value
    /// * [`Error::FatigueCleared`] when resetting a raised fatigue flag
    /// * [`Error::OutcomeFixed`] when changing the outcome of a terminal state
    pub fn set(&mut self, variable: Variable, value: i8) -> Result<()> {
        if !variable.domain().contains(&value) {
            return Err(Error::ValueOutOfDomain {
                variable: variable.name().to_string(),
                value,
                domain: variable.domain().to_vec(),
            });
        }

        let current = self.get(variable);
        if variable.is_fatigue() && current == 1 && value == 0 {
            return Err(Error::FatigueCleared {
                variable: variable.name().to_string(),
            });
        }
        if variable == Variable::GameWin && self.is_terminal() && value != current {
            return Err(Error::OutcomeFixed { outcome: current });
        }

        self.values[variable.index()] = value;
        Ok(())
    }

    /// Current outcome value (-1, 0 or 1). Only meaningful once terminal.
    pub fn reward(&self) -> f64 {
        f64::from(self.get(Variable::GameWin))
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from_code(self.get(Variable::GameWin))
    }

    /// Fix the outcome of the match.
    pub fn conclude(&mut self, outcome: Outcome) -> Result<()> {
        self.set(Variable::GameWin, outcome.code())
    }

    pub fn is_terminal(&self) -> bool {
        self.get(Variable::GameWin) != outcome::ONGOING
    }

    pub fn stamina(&self, side: Side) -> u32 {
        match side {
            Side::Agent => self.agent_stamina,
            Side::Opponent => self.opponent_stamina,
        }
    }

    pub fn is_fatigued(&self, side: Side) -> bool {
        self.get(side.fatigue_variable()) == 1
    }

    /// Spend the stamina `action` costs `side` and raise its fatigue flag when
    /// the remaining stamina falls below `fatigue_threshold`.
    ///
    /// Only resources change here; positional effects belong to the
    /// transition rule. Stamina saturates at zero.
    pub fn apply_action(&self, side: Side, action: Action, fatigue_threshold: u32) -> GameState {
        let mut next = *self;
        let stamina = match side {
            Side::Agent => &mut next.agent_stamina,
            Side::Opponent => &mut next.opponent_stamina,
        };
        *stamina = stamina.saturating_sub(action.stamina_cost());

        if *stamina < fatigue_threshold {
            next.values[side.fatigue_variable().index()] = 1;
        }
        next
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(
            f,
            "] stamina {}/{}",
            self.agent_stamina, self.opponent_stamina
        )
    }
}
