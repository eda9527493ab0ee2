//! Transition function: stamina/fatigue contract plus a pluggable positional rule

use std::{fmt, str::FromStr};

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    grappling::{Action, GameState, Side},
    ports::{PassiveRule, PositionalRule},
};

/// Whether the positional rule may sample its outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransitionMode {
    /// The same state and action always lead to the same next state
    #[default]
    Deterministic,
    /// The rule receives an RNG and may draw its outcome
    Sampled,
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransitionMode::Deterministic => "deterministic",
            TransitionMode::Sampled => "sampled",
        };
        f.write_str(label)
    }
}

impl FromStr for TransitionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deterministic" | "det" => Ok(TransitionMode::Deterministic),
            "sampled" | "stochastic" => Ok(TransitionMode::Sampled),
            _ => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown transition mode '{s}' (expected deterministic or sampled)"
                ),
            }),
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Produces the next state for a (state, action) pair.
pub struct Transition {
    rule: Box<dyn PositionalRule>,
    mode: TransitionMode,
    fatigue_threshold: u32,
    rng: StdRng,
}

impl Transition {
    pub fn new(rule: Box<dyn PositionalRule>, mode: TransitionMode, fatigue_threshold: u32) -> Self {
        Self {
            rule,
            mode,
            fatigue_threshold,
            rng: build_rng(None),
        }
    }

    /// Passive rule, deterministic mode
    pub fn passive(fatigue_threshold: u32) -> Self {
        Self::new(
            Box::new(PassiveRule),
            TransitionMode::Deterministic,
            fatigue_threshold,
        )
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    pub fn rule_name(&self) -> &str {
        self.rule.name()
    }

    /// Charge stamina, update fatigue, then apply the positional rule.
    ///
    /// # Errors
    ///
    /// Propagates whatever the rule reports, e.g.
    /// [`Error::TransitionNotImplemented`].
    pub fn next(&mut self, state: &GameState, side: Side, action: Action) -> Result<GameState> {
        let mut next = state.apply_action(side, action, self.fatigue_threshold);
        let rng = match self.mode {
            TransitionMode::Deterministic => None,
            TransitionMode::Sampled => Some(&mut self.rng),
        };
        self.rule.apply(&mut next, side, action, rng)?;
        Ok(next)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("rule", &self.rule.name())
            .field("mode", &self.mode)
            .field("fatigue_threshold", &self.fatigue_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;
    use crate::{
        grappling::{ActionCategory, Outcome, Variable},
        ports::StrictRule,
    };

    fn action(name: &str) -> Action {
        name.parse().unwrap()
    }

    #[test]
    fn passive_rule_only_touches_resources() {
        let mut transition = Transition::passive(20);
        let state = GameState::new(50, 50);
        let next = transition
            .next(&state, Side::Agent, action("gripR1"))
            .unwrap();
        assert_eq!(next.values(), state.values());
        assert_eq!(next.stamina(Side::Agent), 46);
    }

    #[test]
    fn strict_rule_reports_missing_transition() {
        let mut transition = Transition::new(
            Box::new(StrictRule),
            TransitionMode::Deterministic,
            20,
        );
        let err = transition
            .next(&GameState::new(50, 50), Side::Agent, action("throwNS0"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TransitionNotImplemented { ref action, .. } if action == "throwNS0"
        ));
    }

    #[test]
    fn deterministic_mode_withholds_rng() {
        let rule = |state: &mut GameState,
                    _side: Side,
                    _action: Action,
                    rng: Option<&mut StdRng>|
         -> Result<()> {
            assert!(rng.is_none());
            state.set(Variable::SelfLeftGrip, 1)
        };
        let mut transition = Transition::new(Box::new(rule), TransitionMode::Deterministic, 20);
        let next = transition
            .next(&GameState::new(50, 50), Side::Agent, action("gripL0"))
            .unwrap();
        assert_eq!(next.get(Variable::SelfLeftGrip), 1);
    }

    #[test]
    fn sampled_mode_is_reproducible_with_seed() {
        let rule = |state: &mut GameState,
                    _side: Side,
                    action: Action,
                    rng: Option<&mut StdRng>|
         -> Result<()> {
            let rng = rng.expect("sampled mode provides an rng");
            if action.category() == ActionCategory::ThrowEastWest && rng.random::<f64>() < 0.5 {
                state.conclude(Outcome::Win)?;
            }
            Ok(())
        };
        let run = |seed: u64| {
            let mut transition =
                Transition::new(Box::new(rule), TransitionMode::Sampled, 20).with_seed(seed);
            (0..32)
                .map(|_| {
                    transition
                        .next(&GameState::new(50, 50), Side::Agent, action("throwEW0"))
                        .unwrap()
                        .is_terminal()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn mode_parses_from_str() {
        assert_eq!(
            "sampled".parse::<TransitionMode>().unwrap(),
            TransitionMode::Sampled
        );
        assert!("sometimes".parse::<TransitionMode>().is_err());
    }
}
