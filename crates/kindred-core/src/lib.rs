#![forbid(unsafe_code)]

//! Person records and family tree construction (headless).
//!
//! The pipeline is: ingest records ([`sheet`] or JSON) → [`PersonStore`] (validation and
//! deduplication) → [`Relations`] (lookup indices) → [`build_tree`] (rooted [`FamilyNode`]
//! tree). Layout lives in `kindred-layout`.

pub mod error;
pub mod person;
pub mod resolve;
pub mod sheet;
pub mod store;
pub mod tree;

pub use error::{DataError, Error, Result};
pub use person::Person;
pub use resolve::Relations;
pub use sheet::parse_sheet;
pub use store::{LoadPolicy, PersonStore};
pub use tree::{
    BuildReport, FamilyNode, FamilyTree, MAX_DEPTH, TreeOptions, build_tree, select_root,
    sort_by_birth,
};

/// Parses a JSON array of person records (camelCase field names).
pub fn parse_people_json(text: &str) -> Result<Vec<Person>> {
    Ok(serde_json::from_str(text)?)
}

/// Resolves relations and builds the tree in one step.
///
/// Returns `Ok(None)` when there is nobody to show.
pub fn build_from_store(store: &PersonStore, options: &TreeOptions) -> Result<Option<FamilyTree>> {
    let relations = Relations::resolve(store.as_slice())?;
    Ok(build_tree(&relations, options))
}

#[cfg(test)]
mod tests;
