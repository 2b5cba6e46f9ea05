//! Read-only exercise catalog indexed by id

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoachError, Result};
use crate::models::{Exercise, SlotSection};

/// Exercise catalog preserving the order exercises were supplied in
///
/// Catalog order is significant: ranking ties are broken by it.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
    exercises: Vec<Exercise>,
    index: HashMap<String, usize>,
}

impl ExerciseCatalog {
    /// Build a catalog, rejecting duplicate ids
    pub fn new(exercises: Vec<Exercise>) -> Result<Self> {
        let mut index = HashMap::with_capacity(exercises.len());
        for (position, exercise) in exercises.iter().enumerate() {
            if index.insert(exercise.id.clone(), position).is_some() {
                return Err(CoachError::Validation(format!(
                    "duplicate exercise id '{}' in catalog",
                    exercise.id
                )));
            }
        }
        Ok(ExerciseCatalog { exercises, index })
    }

    /// Parse a JSON array of exercises
    pub fn from_json(json: &str) -> Result<Self> {
        let exercises: Vec<Exercise> = serde_json::from_str(json)?;
        Self::new(exercises)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.index.get(id).map(|&i| &self.exercises[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Exercise> {
        self.exercises.iter()
    }

    pub fn as_slice(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Exercises whose category fits a session section, in catalog order
    pub fn for_section(&self, section: SlotSection) -> impl Iterator<Item = &Exercise> {
        self.exercises
            .iter()
            .filter(move |e| section.accepts(e.category))
    }
}

impl<'a> IntoIterator for &'a ExerciseCatalog {
    type Item = &'a Exercise;
    type IntoIter = std::slice::Iter<'a, Exercise>;

    fn into_iter(self) -> Self::IntoIter {
        self.exercises.iter()
    }
}
