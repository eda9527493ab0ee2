//! End-to-end tests for episodes, the backward update and the greedy policy

use std::sync::{Arc, Mutex};

use grapple::{
    Error,
    app::AgentConfig,
    grappling::{Action, ActionCategory, GameState, Outcome, Power, Side, StateKey, Variable},
    learning::TdAgent,
    pipeline::{EpisodeRunner, MetricsObserver},
    ports::{EpisodeEnd, Observer, PositionalRule, StepEvent, StrictRule},
};
use rand::rngs::StdRng;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// The first action establishes a left grip; any throw from a grip wins.
fn grip_then_throw() -> Box<dyn PositionalRule> {
    Box::new(
        |state: &mut GameState,
         _side: Side,
         action: Action,
         _rng: Option<&mut StdRng>|
         -> grapple::Result<()> {
            if state.get(Variable::SelfLeftGrip) == 0 {
                state.set(Variable::SelfLeftGrip, 1)?;
            } else if matches!(
                action.category(),
                ActionCategory::ThrowNorthSouth | ActionCategory::ThrowEastWest
            ) {
                state.conclude(Outcome::Win)?;
            }
            Ok(())
        },
    )
}

/// Only a low-power right grip changes the position.
fn right_grip_only() -> Box<dyn PositionalRule> {
    Box::new(
        |state: &mut GameState,
         _side: Side,
         action: Action,
         _rng: Option<&mut StdRng>|
         -> grapple::Result<()> {
            if action.category() == ActionCategory::GripRight && action.power() == Power::Low {
                state.set(Variable::SelfRightGrip, 1)?;
            }
            Ok(())
        },
    )
}

/// Records every trace key in the order the runner produced them.
struct KeyRecorder {
    keys: Arc<Mutex<Vec<StateKey>>>,
}

impl Observer for KeyRecorder {
    fn on_step(&mut self, event: &StepEvent<'_>) -> grapple::Result<()> {
        self.keys.lock().unwrap().push(event.key);
        Ok(())
    }
}

#[test]
fn test_terminal_episode_chains_values_backward() {
    let config = AgentConfig::default()
        .with_exploration_rate(0.0)
        .with_episodes(1)
        .with_seed(3);
    let mut agent = TdAgent::with_rule(config, grip_then_throw()).unwrap();

    let recorded = Arc::new(Mutex::new(Vec::new()));
    let mut runner = EpisodeRunner::new().with_observer(Box::new(KeyRecorder {
        keys: Arc::clone(&recorded),
    }));

    let summary = runner.run(&mut agent).unwrap();
    assert_eq!(summary.wins, 1);
    assert_eq!(summary.total_steps, 2);

    let keys = recorded.lock().unwrap().clone();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0].to, keys[1].from);

    // Ties resolve to the last action, so the greedy walk takes throwEW1 twice.
    let start = agent.initial_state();
    let gripped = {
        let mut s = start.apply_action(Side::Agent, "throwEW1".parse().unwrap(), 20);
        s.set(Variable::SelfLeftGrip, 1).unwrap();
        s
    };
    let won = {
        let mut s = gripped.apply_action(Side::Agent, "throwEW1".parse().unwrap(), 20);
        s.conclude(Outcome::Win).unwrap();
        s
    };
    assert_eq!(keys[0], agent.space().key(&start, &gripped).unwrap());
    assert_eq!(keys[1], agent.space().key(&gripped, &won).unwrap());

    let table = agent.table();
    assert!(close(table.get(keys[1]).unwrap(), 0.2));
    assert!(close(table.get(keys[0]).unwrap(), 0.04));

    let terminal = agent.space().encode_state(&won).unwrap();
    assert_eq!(table.get(StateKey::absorbing(terminal)).unwrap(), 1.0);
    assert_eq!(table.nonzero_count(), 3);
}

#[test]
fn test_repeated_wins_converge_toward_reward() {
    let config = AgentConfig::default()
        .with_exploration_rate(0.0)
        .with_episodes(2)
        .with_seed(8);
    let mut agent = TdAgent::with_rule(config, grip_then_throw()).unwrap();
    let mut runner = EpisodeRunner::new();

    let summary = runner.run(&mut agent).unwrap();
    assert_eq!(summary.wins, 2);
    assert_eq!(runner.episodes_completed(), 2);

    // The second episode repeats the first path: 0.2 -> 0.36, 0.04 -> 0.104.
    let mut values: Vec<f64> = agent
        .table()
        .nonzero()
        .map(|(_, _, v)| v)
        .filter(|&v| v < 1.0)
        .collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(values.len(), 2);
    assert!(close(values[0], 0.104));
    assert!(close(values[1], 0.36));
}

#[test]
fn test_greedy_choice_follows_seeded_value() {
    let config = AgentConfig::default().with_exploration_rate(0.0).with_seed(1);
    let mut agent = TdAgent::with_rule(config, right_grip_only()).unwrap();

    let start = agent.initial_state();
    let grip: Action = "gripR0".parse().unwrap();
    let target = {
        let mut s = start.apply_action(Side::Agent, grip, 20);
        s.set(Variable::SelfRightGrip, 1).unwrap();
        s
    };
    let key = agent.space().key(&start, &target).unwrap();
    agent.table_mut().set(key, 0.5).unwrap();

    for _ in 0..20 {
        assert_eq!(agent.choose_action(&start).unwrap(), grip);
    }

    let values = agent.action_values(&start).unwrap();
    assert_eq!(values.len(), Action::COUNT);
    let best = values
        .iter()
        .filter(|(_, v)| *v > 0.0)
        .map(|(a, _)| *a)
        .collect::<Vec<_>>();
    assert_eq!(best, vec![grip]);
}

#[test]
fn test_truncated_episode_pulls_toward_zero_without_pin() {
    let config = AgentConfig::default()
        .with_exploration_rate(0.0)
        .with_max_steps(1)
        .with_episodes(1)
        .with_seed(2);
    let mut agent = TdAgent::new(config).unwrap();

    let start = agent.initial_state();
    let high = "throwEW1".parse().unwrap();
    let next = start.apply_action(Side::Agent, high, 20);
    let key = agent.space().key(&start, &next).unwrap();
    agent.table_mut().set(key, 0.5).unwrap();

    let report = EpisodeRunner::new().play_episode(&mut agent).unwrap();
    assert_eq!(report.end, EpisodeEnd::Truncated);
    assert_eq!(report.reward, 0.0);
    assert_eq!(report.steps, 1);

    assert!(close(agent.table().get(key).unwrap(), 0.4));
    assert_eq!(agent.table().nonzero_count(), 1);
}

#[test]
fn test_strict_rule_error_reaches_caller() {
    let config = AgentConfig::default().with_episodes(1).with_seed(4);
    let mut agent = TdAgent::with_rule(config, Box::new(StrictRule)).unwrap();
    let result = EpisodeRunner::new()
        .with_observer(Box::new(MetricsObserver::new()))
        .run(&mut agent);
    assert!(matches!(
        result,
        Err(Error::TransitionNotImplemented { .. })
    ));
}

#[test]
fn test_exploration_is_reproducible_with_seed() {
    let run = || {
        let config = AgentConfig::default()
            .with_exploration_rate(0.9)
            .with_max_steps(15)
            .with_episodes(3)
            .with_seed(77);
        let mut agent = TdAgent::with_rule(config, grip_then_throw()).unwrap();
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let mut runner = EpisodeRunner::new().with_observer(Box::new(KeyRecorder {
            keys: Arc::clone(&recorded),
        }));
        runner.run(&mut agent).unwrap();
        recorded.lock().unwrap().clone()
    };
    assert_eq!(run(), run());
}
