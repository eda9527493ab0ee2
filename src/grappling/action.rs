//! The fixed action set available to a side

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// What an action tries to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionCategory {
    GripRight,
    GripLeft,
    BreakGrip,
    /// Repositioning oneself; costs no stamina and has no power variant
    SelfMove,
    MoveOpponent,
    ThrowNorthSouth,
    ThrowEastWest,
}

impl ActionCategory {
    fn stem(self) -> &'static str {
        match self {
            ActionCategory::GripRight => "gripR",
            ActionCategory::GripLeft => "gripL",
            ActionCategory::BreakGrip => "breakgrip",
            ActionCategory::SelfMove => "mvself",
            ActionCategory::MoveOpponent => "mvopp",
            ActionCategory::ThrowNorthSouth => "throwNS",
            ActionCategory::ThrowEastWest => "throwEW",
        }
    }
}

/// Effort put into an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Power {
    Low,
    High,
}

impl Power {
    /// Integer power bit (0 low, 1 high)
    pub fn level(self) -> u32 {
        match self {
            Power::Low => 0,
            Power::High => 1,
        }
    }
}

/// An action descriptor: category plus power bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    category: ActionCategory,
    power: Power,
}

impl Action {
    pub const COUNT: usize = 13;

    /// Every action, in the order the greedy policy scans them.
    pub const ALL: [Action; Action::COUNT] = [
        Action::of(ActionCategory::GripRight, Power::Low),
        Action::of(ActionCategory::GripLeft, Power::Low),
        Action::of(ActionCategory::BreakGrip, Power::Low),
        Action::of(ActionCategory::SelfMove, Power::Low),
        Action::of(ActionCategory::MoveOpponent, Power::Low),
        Action::of(ActionCategory::ThrowNorthSouth, Power::Low),
        Action::of(ActionCategory::ThrowEastWest, Power::Low),
        Action::of(ActionCategory::GripRight, Power::High),
        Action::of(ActionCategory::GripLeft, Power::High),
        Action::of(ActionCategory::BreakGrip, Power::High),
        Action::of(ActionCategory::MoveOpponent, Power::High),
        Action::of(ActionCategory::ThrowNorthSouth, Power::High),
        Action::of(ActionCategory::ThrowEastWest, Power::High),
    ];

    const fn of(category: ActionCategory, power: Power) -> Self {
        Self { category, power }
    }

    /// Create an action, rejecting a high-power self move.
    pub fn new(category: ActionCategory, power: Power) -> Result<Self, Error> {
        if category == ActionCategory::SelfMove && power == Power::High {
            return Err(Error::InvalidAction {
                reason: "self movement has no power variant".to_string(),
            });
        }
        Ok(Self::of(category, power))
    }

    pub fn category(self) -> ActionCategory {
        self.category
    }

    pub fn power(self) -> Power {
        self.power
    }

    pub fn is_self_move(self) -> bool {
        self.category == ActionCategory::SelfMove
    }

    /// Stamina spent by the acting side: `2 * (power + 1)`, or 0 for a self move.
    pub fn stamina_cost(self) -> u32 {
        if self.is_self_move() {
            0
        } else {
            2 * (self.power.level() + 1)
        }
    }

    /// Position in [`Action::ALL`]
    pub fn ordinal(self) -> usize {
        Action::ALL
            .iter()
            .position(|&candidate| candidate == self)
            .unwrap_or_default()
    }

    pub fn name(self) -> String {
        if self.is_self_move() {
            self.category.stem().to_string()
        } else {
            format!("{}{}", self.category.stem(), self.power.level())
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::ParseAction {
                input: s.to_string(),
                expected: Action::ALL
                    .iter()
                    .map(|action| action.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_scan_order() {
        let names: Vec<String> = Action::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "gripR0",
                "gripL0",
                "breakgrip0",
                "mvself",
                "mvopp0",
                "throwNS0",
                "throwEW0",
                "gripR1",
                "gripL1",
                "breakgrip1",
                "mvopp1",
                "throwNS1",
                "throwEW1",
            ]
        );
    }

    #[test]
    fn stamina_costs() {
        let high: Action = "throwNS1".parse().unwrap();
        let low: Action = "gripL0".parse().unwrap();
        let self_move: Action = "mvself".parse().unwrap();
        assert_eq!(high.stamina_cost(), 4);
        assert_eq!(low.stamina_cost(), 2);
        assert_eq!(self_move.stamina_cost(), 0);
    }

    #[test]
    fn high_power_self_move_is_rejected() {
        assert!(Action::new(ActionCategory::SelfMove, Power::High).is_err());
        assert!(Action::new(ActionCategory::SelfMove, Power::Low).is_ok());
    }

    #[test]
    fn parse_unknown_action_fails() {
        assert!(matches!(
            "suplex1".parse::<Action>(),
            Err(Error::ParseAction { .. })
        ));
    }

    #[test]
    fn ordinal_round_trips() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.ordinal(), i);
        }
    }
}
