mod tree;

use crate::Person;

pub(crate) fn person(id: &str, parent: Option<&str>) -> Person {
    let p = Person::new(id, format!("Person {id}"));
    match parent {
        Some(parent) => p.with_parent(parent),
        None => p,
    }
}
