use thiserror::Error;

use crate::model::ExerciseId;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("no exercises found")]
    Empty,
}

/// Navigation order: every registered id, sorted as strings, ascending.
///
/// `"10b"` sorts before `"1a"`. This is string order, not numeric order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progression {
    ids: Vec<ExerciseId>,
}

/// Entries adjacent to one progression member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbors<'a> {
    pub index: usize,
    pub previous: Option<&'a ExerciseId>,
    pub next: Option<&'a ExerciseId>,
}

impl Progression {
    /// # Errors
    ///
    /// Returns `ProgressionError::Empty` when the registry holds no fragments.
    pub fn order(registry: &Registry) -> Result<Self, ProgressionError> {
        Self::from_ids(registry.ids().cloned())
    }

    /// Sorts and de-duplicates `ids`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::Empty` when `ids` is empty.
    pub fn from_ids(ids: impl IntoIterator<Item = ExerciseId>) -> Result<Self, ProgressionError> {
        let mut ids: Vec<ExerciseId> = ids.into_iter().collect();
        ids.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));
        ids.dedup();
        if ids.is_empty() {
            return Err(ProgressionError::Empty);
        }
        Ok(Self { ids })
    }

    /// The entry a bare address redirects to.
    #[must_use]
    pub fn first(&self) -> &ExerciseId {
        &self.ids[0]
    }

    #[must_use]
    pub fn last(&self) -> &ExerciseId {
        &self.ids[self.ids.len() - 1]
    }

    #[must_use]
    pub fn position(&self, id: &ExerciseId) -> Option<usize> {
        self.ids
            .binary_search_by(|entry| entry.as_str().cmp(id.as_str()))
            .ok()
    }

    #[must_use]
    pub fn contains(&self, id: &ExerciseId) -> bool {
        self.position(id).is_some()
    }

    /// Previous and next entries around `id`; `None` if `id` is not a member.
    #[must_use]
    pub fn neighbors(&self, id: &ExerciseId) -> Option<Neighbors<'_>> {
        let index = self.position(id)?;
        Some(Neighbors {
            index,
            previous: index.checked_sub(1).and_then(|i| self.ids.get(i)),
            next: self.ids.get(index + 1),
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExerciseId> {
        self.ids.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ExerciseId] {
        &self.ids
    }
}

impl<'a> IntoIterator for &'a Progression {
    type Item = &'a ExerciseId;
    type IntoIter = std::slice::Iter<'a, ExerciseId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
