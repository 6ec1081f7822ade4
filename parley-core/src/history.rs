use serde::{Deserialize, Serialize};

use crate::{Role, Turn};

/// Ordered record of the turns of one session.
///
/// A `History` is a plain value: callers own it and thread it through each
/// request/response cycle. Appending never mutates the receiver; it returns a
/// new history. Growth is unbounded, so long sessions produce long prompts.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn append(&self, role: Role, content: impl Into<String>) -> History {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend(self.turns.iter().cloned());
        turns.push(Turn::new(role, content));
        History { turns }
    }

    /// True when roles alternate user/assistant starting with the user.
    /// Alternation is a call-site convention and is never enforced here.
    pub fn is_alternating(&self) -> bool {
        self.turns.iter().enumerate().all(|(index, turn)| {
            let expected = if index % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            turn.role() == expected
        })
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl FromIterator<Turn> for History {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

pub fn append_turn(history: &History, role: Role, content: impl Into<String>) -> History {
    history.append(role, content)
}
