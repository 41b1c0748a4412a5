//! Parameter correspondence between the old and new phrase of a rename.

use stepwright_types::{ParameterPosition, Step};

/// Wire encoding of a parameter that has no counterpart in the old phrase.
const ABSENT_POSITION: i32 = -1;

/// For each parameter of the new phrase, the index of the old parameter
/// written the same way, if any.
///
/// The domain is exactly the new phrase's parameter indices. Used unchanged by
/// both the document rewrite and the runner request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderMap {
    positions: Vec<Option<usize>>,
}

impl OrderMap {
    /// Match every new argument to the first old argument written the same way.
    ///
    /// Both the kind and the value must agree, so `<amount>` does not match
    /// `"amount"`.
    pub fn between(old: &Step, new: &Step) -> Self {
        let positions = new
            .args
            .iter()
            .map(|new_arg| old.args.iter().position(|old_arg| old_arg == new_arg))
            .collect();
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn old_position(&self, new_position: usize) -> Option<usize> {
        self.positions.get(new_position).copied().flatten()
    }

    /// `(new position, old position)` pairs in ascending new position.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
        self.positions.iter().copied().enumerate()
    }

    /// Positions as sent to the runner, with absent old positions as `-1`.
    pub fn parameter_positions(&self) -> Vec<ParameterPosition> {
        self.iter()
            .map(|(new_position, old_position)| ParameterPosition {
                new_position: new_position as i32,
                old_position: old_position.map_or(ABSENT_POSITION, |position| position as i32),
            })
            .collect()
    }
}
