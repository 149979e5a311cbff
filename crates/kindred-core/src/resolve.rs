use rustc_hash::FxHashMap;

use crate::Person;
use crate::error::{DataError, Result};

/// Lookup tables derived from a flat person list.
///
/// `spouse_of` is symmetric and pairs each person with at most one partner. `children_of`
/// keeps input order; ordering by birthdate is the tree builder's concern.
#[derive(Debug, Clone, Default)]
pub struct Relations<'a> {
    people: &'a [Person],
    by_id: FxHashMap<&'a str, &'a Person>,
    spouse_of: FxHashMap<&'a str, &'a Person>,
    children_of: FxHashMap<&'a str, Vec<&'a Person>>,
}

impl<'a> Relations<'a> {
    /// Builds the three indices. Duplicate ids are reported rather than overwritten.
    pub fn resolve(people: &'a [Person]) -> Result<Self> {
        let mut by_id: FxHashMap<&str, &Person> =
            FxHashMap::with_capacity_and_hasher(people.len(), Default::default());
        for person in people {
            if by_id.insert(person.id.as_str(), person).is_some() {
                return Err(DataError::DuplicateId {
                    id: person.id.clone(),
                }
                .into());
            }
        }

        // Spouse links form a one-to-one matching: mutual pairs first, then one-sided links in
        // input order. A link to someone already paired is ignored.
        let links: Vec<(&Person, &Person)> = people
            .iter()
            .filter_map(|person| linked_spouse(&by_id, person).map(|spouse| (person, spouse)))
            .collect();
        let mut spouse_of: FxHashMap<&str, &Person> = FxHashMap::default();
        for &(person, spouse) in &links {
            if spouse.spouse_id.as_deref() == Some(person.id.as_str()) {
                spouse_of.insert(person.id.as_str(), spouse);
            }
        }
        for &(person, spouse) in &links {
            if spouse_of.contains_key(person.id.as_str()) {
                continue;
            }
            if spouse_of.contains_key(spouse.id.as_str()) {
                tracing::debug!(
                    person = %person.id,
                    spouse = %spouse.id,
                    "ignoring spouse reference to someone already paired"
                );
                continue;
            }
            spouse_of.insert(person.id.as_str(), spouse);
            spouse_of.insert(spouse.id.as_str(), person);
        }

        let mut children_of: FxHashMap<&str, Vec<&Person>> = FxHashMap::default();
        for person in people {
            if let Some(parent_id) = person.parent_id.as_deref() {
                children_of.entry(parent_id).or_default().push(person);
            }
        }

        Ok(Self {
            people,
            by_id,
            spouse_of,
            children_of,
        })
    }

    pub fn people(&self) -> &'a [Person] {
        self.people
    }

    pub fn person(&self, id: &str) -> Option<&'a Person> {
        self.by_id.get(id).copied()
    }

    pub fn spouse_of(&self, id: &str) -> Option<&'a Person> {
        self.spouse_of.get(id).copied()
    }

    pub fn children_of(&self, id: &str) -> &[&'a Person] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The parent record, when `parent_id` points at someone in the data set.
    pub fn parent_of(&self, person: &Person) -> Option<&'a Person> {
        person.parent_id.as_deref().and_then(|id| self.person(id))
    }

    /// People whose parent is absent or unknown, in input order.
    pub fn root_candidates(&self) -> impl Iterator<Item = &'a Person> + '_ {
        self.people
            .iter()
            .filter(|person| self.parent_of(person).is_none())
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }
}

fn linked_spouse<'a>(by_id: &FxHashMap<&str, &'a Person>, person: &Person) -> Option<&'a Person> {
    let spouse_id = person.spouse_id.as_deref()?;
    if spouse_id == person.id {
        return None;
    }
    match by_id.get(spouse_id) {
        Some(spouse) => Some(*spouse),
        None => {
            tracing::debug!(
                person = %person.id,
                spouse = %spouse_id,
                "ignoring spouse reference to unknown person"
            );
            None
        }
    }
}
