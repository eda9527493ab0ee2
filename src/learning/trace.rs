//! Episode trace and the backward TD(0) pass

use crate::{Result, grappling::StateKey, learning::value_table::ValueTable};

/// Keys visited during one episode, in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    keys: Vec<StateKey>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: StateKey) {
        self.keys.push(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Walk the trace from the last visit to the first, pulling each value
    /// toward the current target and then using the updated value as the
    /// target of the visit before it.
    ///
    /// `precision`, when set, rounds every stored value to that many decimals.
    /// Returns the final target (the updated value of the first visit, or
    /// `reward` for an empty trace).
    pub fn backpropagate(
        &self,
        table: &mut ValueTable,
        reward: f64,
        learning_rate: f64,
        precision: Option<u32>,
    ) -> Result<f64> {
        let mut target = reward;
        for &key in self.keys.iter().rev() {
            let mut updated = table.update_toward(key, target, learning_rate)?;
            if let Some(decimals) = precision {
                updated = round_to(updated, decimals);
                table.set(key, updated)?;
            }
            log::trace!("value {key} <- {updated:.6}");
            target = updated;
        }
        Ok(target)
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
