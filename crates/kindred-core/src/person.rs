use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single individual as supplied by the ingestion layer.
///
/// Only `id`, `parent_id`, `spouse_id`, `birthdate` and `generation` take part in tree
/// construction. The remaining fields are carried through untouched for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub birthdate: String,
    #[serde(default)]
    pub deceased_date: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub spouse_id: Option<String>,
    #[serde(default)]
    pub generation: i32,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contact: String,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_spouse(mut self, spouse_id: impl Into<String>) -> Self {
        self.spouse_id = Some(spouse_id.into());
        self
    }

    pub fn with_birthdate(mut self, birthdate: impl Into<String>) -> Self {
        self.birthdate = birthdate.into();
        self
    }

    pub fn with_deceased_date(mut self, deceased_date: impl Into<String>) -> Self {
        self.deceased_date = deceased_date.into();
        self
    }

    pub fn with_generation(mut self, generation: i32) -> Self {
        self.generation = generation;
        self
    }

    /// A person without a recorded date of death is treated as living.
    pub fn is_living(&self) -> bool {
        self.deceased_date.trim().is_empty()
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        parse_date(&self.birthdate)
    }

    pub fn deceased_on(&self) -> Option<NaiveDate> {
        parse_date(&self.deceased_date)
    }

    /// Checks the record-level invariants: non-empty id and name, and well-formed dates.
    /// Relationship shape (including a person naming themselves as parent) is left to the
    /// tree builder, which cuts cycles instead of rejecting them.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.id.trim().is_empty() {
            return Err(DataError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(DataError::EmptyName {
                id: self.id.clone(),
            });
        }
        for (field, value) in [
            ("birthdate", &self.birthdate),
            ("deceased date", &self.deceased_date),
        ] {
            if !value.trim().is_empty() && parse_date(value).is_none() {
                return Err(DataError::InvalidDate {
                    id: self.id.clone(),
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}
