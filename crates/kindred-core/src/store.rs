use rustc_hash::FxHashMap;

use crate::Person;
use crate::error::{DataError, Result};

/// How the store treats records that fail validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// The first invalid or duplicate record aborts the load.
    Strict,
    /// Invalid records are dropped, duplicates keep their first occurrence.
    #[default]
    Lenient,
}

/// Validated, deduplicated person records in input order.
#[derive(Debug, Clone, Default)]
pub struct PersonStore {
    people: Vec<Person>,
    index: FxHashMap<String, usize>,
}

impl PersonStore {
    pub fn new(records: impl IntoIterator<Item = Person>) -> Result<Self> {
        let mut store = Self::default();
        for person in records {
            person.validate()?;
            store.insert(person)?;
        }
        Ok(store)
    }

    /// Loads what can be loaded and reports everything that was dropped.
    pub fn lenient(records: impl IntoIterator<Item = Person>) -> (Self, Vec<DataError>) {
        let mut store = Self::default();
        let mut dropped = Vec::new();
        for person in records {
            if let Err(err) = person.validate().and_then(|()| store.insert(person)) {
                tracing::warn!(error = %err, "dropping person record");
                dropped.push(err);
            }
        }
        (store, dropped)
    }

    fn insert(&mut self, person: Person) -> std::result::Result<(), DataError> {
        if self.index.contains_key(&person.id) {
            return Err(DataError::DuplicateId { id: person.id });
        }
        self.index.insert(person.id.clone(), self.people.len());
        self.people.push(person);
        Ok(())
    }

    pub fn load(records: impl IntoIterator<Item = Person>, policy: LoadPolicy) -> Result<Self> {
        match policy {
            LoadPolicy::Strict => Self::new(records),
            LoadPolicy::Lenient => Ok(Self::lenient(records).0),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.index.get(id).map(|&idx| &self.people[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    /// Contiguous view in input order, as consumed by the resolver.
    pub fn as_slice(&self) -> &[Person] {
        &self.people
    }

    pub fn into_people(self) -> Vec<Person> {
        self.people
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn sample() -> Vec<Person> {
        vec![
            Person::new("1", "Marko"),
            Person::new("2", "Ivana").with_parent("1"),
            Person::new("2", "Ivana again").with_parent("1"),
            Person::new("3", ""),
        ]
    }

    #[test]
    fn strict_store_rejects_duplicates() {
        let err = PersonStore::new(sample()[..3].to_vec()).unwrap_err();
        assert!(matches!(
            err,
            Error::Data(DataError::DuplicateId { ref id }) if id == "2"
        ));
    }

    #[test]
    fn lenient_store_keeps_first_occurrence_and_reports_drops() {
        let (store, dropped) = PersonStore::lenient(sample());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("2").map(|p| p.name.as_str()), Some("Ivana"));
        assert_eq!(
            dropped,
            vec![
                DataError::DuplicateId { id: "2".into() },
                DataError::EmptyName { id: "3".into() },
            ]
        );
    }

    #[test]
    fn slice_view_preserves_input_order() {
        let store = PersonStore::load(
            vec![
                Person::new("b", "B"),
                Person::new("a", "A"),
                Person::new("c", "C"),
            ],
            LoadPolicy::Strict,
        )
        .unwrap();
        let ids: Vec<&str> = store.as_slice().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }
}
