//! Tabular TD agent
//!
//! The agent owns everything that persists across episodes: the state space,
//! the value table, the policy and the transition function. Episode-scoped
//! data (current state, trace) belongs to the runner.

use crate::{
    Result,
    app::AgentConfig,
    grappling::{Action, GameState, Side, StateKey, StateSpace},
    learning::{policy::EpsilonGreedy, trace::Trace, value_table::ValueTable},
    ports::{PassiveRule, PositionalRule},
    transition::Transition,
};

#[derive(Debug)]
pub struct TdAgent {
    config: AgentConfig,
    space: StateSpace,
    table: ValueTable,
    policy: EpsilonGreedy,
    transition: Transition,
}

impl TdAgent {
    /// Create an agent with the passive (no-op) positional rule.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or when the standard state space
    /// does not match `config.expected_state_count`.
    pub fn new(config: AgentConfig) -> Result<Self> {
        Self::with_rule(config, Box::new(PassiveRule))
    }

    /// Create an agent with a custom positional rule.
    pub fn with_rule(config: AgentConfig, rule: Box<dyn PositionalRule>) -> Result<Self> {
        let space = StateSpace::standard_with_expected(config.expected_state_count)?;
        Self::with_space(config, space, rule)
    }

    /// Create an agent over an explicit state space.
    ///
    /// The space must describe the standard nine-variable state vector.
    pub fn with_space(
        config: AgentConfig,
        space: StateSpace,
        rule: Box<dyn PositionalRule>,
    ) -> Result<Self> {
        config.validate()?;
        // Fails early when the space cannot represent the initial state.
        space.encode_state(&GameState::new(
            config.agent_stamina_max,
            config.opponent_stamina_max,
        ))?;

        let table = ValueTable::new(space.size())?;
        let mut policy = EpsilonGreedy::new(config.exploration_rate);
        let mut transition =
            Transition::new(rule, config.transition_mode, config.fatigue_threshold);
        if let Some(seed) = config.seed {
            policy.set_seed(seed);
            transition.set_seed(seed.wrapping_add(1));
        }

        log::info!(
            "agent ready: {} states, {} table entries, rule '{}' ({})",
            space.size(),
            table.len(),
            transition.rule_name(),
            transition.mode()
        );

        Ok(Self {
            config,
            space,
            table,
            policy,
            transition,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    /// Direct table access for seeding or inspection
    pub fn table_mut(&mut self) -> &mut ValueTable {
        &mut self.table
    }

    pub fn transition(&self) -> &Transition {
        &self.transition
    }

    /// State every episode starts from.
    pub fn initial_state(&self) -> GameState {
        GameState::new(
            self.config.agent_stamina_max,
            self.config.opponent_stamina_max,
        )
    }

    /// Epsilon-greedy choice for the agent side.
    pub fn choose_action(&mut self, state: &GameState) -> Result<Action> {
        self.policy.choose(
            state,
            Side::Agent,
            &self.space,
            &self.table,
            &mut self.transition,
        )
    }

    /// Per-action successor values, in scan order.
    pub fn action_values(&mut self, state: &GameState) -> Result<Vec<(Action, f64)>> {
        super::policy::action_values(
            state,
            Side::Agent,
            &self.space,
            &self.table,
            &mut self.transition,
        )
    }

    /// Apply `action` for the agent and return the reached state with its key.
    pub fn step(&mut self, state: &GameState, action: Action) -> Result<(GameState, StateKey)> {
        let next = self.transition.next(state, Side::Agent, action)?;
        let key = self.space.key(state, &next)?;
        Ok((next, key))
    }

    /// End-of-episode update.
    ///
    /// When `final_state` is terminal and pinning is enabled, its absorbing
    /// entry is set to the reward first. Then the trace is walked backward.
    /// Returns the reward that seeded the walk.
    ///
    /// The absorbing `(t, t)` entry is write-only: the policy scans keys from
    /// the current state, and no trace ever records a step out of a terminal
    /// state, so the pinned value never feeds back into learning.
    pub fn learn(&mut self, trace: &Trace, final_state: &GameState) -> Result<f64> {
        let reward = final_state.reward();

        if self.config.pin_terminal && final_state.is_terminal() {
            let terminal = self.space.encode_state(final_state)?;
            self.table.set(StateKey::absorbing(terminal), reward)?;
        }

        if trace.is_empty() {
            log::debug!("no visits to update for reward {reward}");
            return Ok(reward);
        }

        trace.backpropagate(
            &mut self.table,
            reward,
            self.config.learning_rate,
            self.config.value_precision,
        )?;
        log::debug!(
            "backward pass over {} visits with reward {reward}",
            trace.len()
        );
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        grappling::{Outcome, StateVariable, Variable},
    };

    #[test]
    fn mismatched_expected_count_fails_construction() {
        let config = AgentConfig::default().with_expected_state_count(864);
        let err = TdAgent::new(config).unwrap_err();
        assert!(matches!(
            err,
            Error::StateSpaceMismatch {
                computed: 1728,
                expected: 864
            }
        ));
    }

    #[test]
    fn invalid_config_fails_construction() {
        let config = AgentConfig::default().with_learning_rate(2.0);
        assert!(matches!(
            TdAgent::new(config),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn foreign_space_is_rejected() {
        let space = StateSpace::new(vec![StateVariable::new("only", vec![0, 1])], 2).unwrap();
        let result = TdAgent::with_space(AgentConfig::default(), space, Box::new(PassiveRule));
        assert!(matches!(result, Err(Error::UnknownState { .. })));
    }

    #[test]
    fn learn_pins_terminal_and_updates_trace() {
        let mut agent = TdAgent::new(AgentConfig::default()).unwrap();
        let start = agent.initial_state();
        let mut end = start;
        end.set(Variable::SelfLeftGrip, 1).unwrap();
        end.conclude(Outcome::Win).unwrap();

        let key = agent.space().key(&start, &end).unwrap();
        let mut trace = Trace::new();
        trace.push(key);

        let reward = agent.learn(&trace, &end).unwrap();
        assert_eq!(reward, 1.0);

        let terminal = agent.space().encode_state(&end).unwrap();
        assert_eq!(agent.table().get(StateKey::absorbing(terminal)).unwrap(), 1.0);
        assert!((agent.table().get(key).unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn pinning_does_not_change_trace_values() {
        let run = |pin: bool| {
            let mut agent =
                TdAgent::new(AgentConfig::default().with_pin_terminal(pin)).unwrap();
            let start = agent.initial_state();
            let mut end = start;
            end.set(Variable::SelfLeftGrip, 1).unwrap();
            end.conclude(Outcome::Win).unwrap();
            let key = agent.space().key(&start, &end).unwrap();
            let mut trace = Trace::new();
            trace.push(key);
            agent.learn(&trace, &end).unwrap();
            (agent.table().get(key).unwrap(), agent.table().nonzero_count())
        };
        let (pinned, pinned_entries) = run(true);
        let (unpinned, unpinned_entries) = run(false);
        assert_eq!(pinned, unpinned);
        assert_eq!(pinned_entries, unpinned_entries + 1);
    }

    #[test]
    fn empty_trace_only_pins() {
        let mut agent = TdAgent::new(AgentConfig::default()).unwrap();
        let mut end = agent.initial_state();
        end.conclude(Outcome::Win).unwrap();
        assert_eq!(agent.learn(&Trace::new(), &end).unwrap(), 1.0);
        assert_eq!(agent.table().nonzero_count(), 1);
    }

    #[test]
    fn learn_skips_pin_when_disabled() {
        let mut agent = TdAgent::new(AgentConfig::default().with_pin_terminal(false)).unwrap();
        let mut end = agent.initial_state();
        end.conclude(Outcome::Loss).unwrap();
        agent.learn(&Trace::new(), &end).unwrap();
        assert!(agent.table().is_zeroed());
    }

    #[test]
    fn step_records_key_of_reached_state() {
        let mut agent = TdAgent::new(AgentConfig::default().with_stamina(21, 50)).unwrap();
        let start = agent.initial_state();
        let (next, key) = agent.step(&start, "gripR1".parse().unwrap()).unwrap();
        assert_eq!(next.stamina(Side::Agent), 17);
        assert!(next.is_fatigued(Side::Agent));
        assert_eq!(key.from, agent.space().encode_state(&start).unwrap());
        assert_eq!(key.to, agent.space().encode_state(&next).unwrap());
        assert_ne!(key.from, key.to);
    }
}
