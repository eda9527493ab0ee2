//! Epsilon-greedy action selection over the value table

use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

use crate::{
    Result,
    grappling::{Action, GameState, Side, StateKey, StateSpace},
    learning::value_table::ValueTable,
    transition::Transition,
};

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Explores with probability `exploration_rate`, otherwise picks the action
/// whose successor has the highest learned value.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    exploration_rate: f64,
    rng: StdRng,
}

impl EpsilonGreedy {
    pub fn new(exploration_rate: f64) -> Self {
        Self {
            exploration_rate,
            rng: build_rng(None),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Select an action for `side` in `state`.
    ///
    /// A zero exploration rate never explores, even when the draw is exactly 0.
    ///
    /// In [`TransitionMode::Sampled`](crate::transition::TransitionMode) the
    /// greedy scan draws one sample per candidate from the transition's RNG.
    /// The step that follows draws again, so the successor actually reached
    /// may differ from the one whose value selected the action.
    ///
    /// # Errors
    ///
    /// Fails if a candidate successor cannot be encoded or the transition
    /// rule rejects an action.
    pub fn choose(
        &mut self,
        state: &GameState,
        side: Side,
        space: &StateSpace,
        table: &ValueTable,
        transition: &mut Transition,
    ) -> Result<Action> {
        let draw: f64 = self.rng.random();
        if self.exploration_rate > 0.0 && draw <= self.exploration_rate {
            // Action::ALL is a non-empty constant.
            let action = *Action::ALL.choose(&mut self.rng).unwrap_or(&Action::ALL[0]);
            log::trace!("explore: {action}");
            return Ok(action);
        }
        greedy_action(state, side, space, table, transition)
    }
}

/// Value of the successor reached by every action, in scan order.
///
/// Each candidate is produced by [`Transition::next`], so a sampled
/// transition advances its RNG once per action.
pub fn action_values(
    state: &GameState,
    side: Side,
    space: &StateSpace,
    table: &ValueTable,
    transition: &mut Transition,
) -> Result<Vec<(Action, f64)>> {
    let from = space.encode_state(state)?;
    Action::ALL
        .iter()
        .map(|&action| {
            let candidate = transition.next(state, side, action)?;
            let to = space.encode_state(&candidate)?;
            let value = table.get(StateKey::new(from, to))?;
            Ok((action, value))
        })
        .collect()
}

/// Scan actions in order and keep the last one whose value is `>=` the
/// running maximum, so ties at the maximum go to the latest action scanned.
pub fn greedy_action(
    state: &GameState,
    side: Side,
    space: &StateSpace,
    table: &ValueTable,
    transition: &mut Transition,
) -> Result<Action> {
    let mut best = Action::ALL[0];
    let mut best_value = f64::NEG_INFINITY;
    for (action, value) in action_values(state, side, space, table, transition)? {
        if value >= best_value {
            best = action;
            best_value = value;
        }
    }
    Ok(best)
}
