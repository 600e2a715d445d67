//! See [`Transcript`].

use serde::{Deserialize, Serialize};

use crate::Turn;

/// The append-only, ordered record of a conversation.
///
/// Turns can only be appended or dropped all at once. There is no API to edit
/// or remove an individual turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: vec![] }
    }

    /// Append a turn to the end of the transcript.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Drop every turn.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}
