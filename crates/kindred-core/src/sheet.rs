//! Header-addressed tabular input (spreadsheet CSV exports).
//!
//! Only what family sheets need is supported: one header row, comma separators, and
//! double-quoted fields with `""` escapes.

use crate::Person;
use crate::error::{Error, Result};

/// Lowercases, trims and joins whitespace runs with `_`, so `Parent ID` reads as `parent_id`.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Default)]
struct Columns {
    id: Option<usize>,
    name: Option<usize>,
    birthdate: Option<usize>,
    deceased_date: Option<usize>,
    photo_url: Option<usize>,
    parent_id: Option<usize>,
    spouse_id: Option<usize>,
    location: Option<usize>,
    contact: Option<usize>,
    generation: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self> {
        let mut cols = Self::default();
        for (idx, raw) in header.iter().enumerate() {
            let slot = match normalize_header(raw).trim_start_matches('\u{feff}') {
                "id" => &mut cols.id,
                "name" => &mut cols.name,
                "birthdate" => &mut cols.birthdate,
                "deceased_date" => &mut cols.deceased_date,
                "photo_url" => &mut cols.photo_url,
                "parent_id" => &mut cols.parent_id,
                "spouse_id" => &mut cols.spouse_id,
                "location" => &mut cols.location,
                "contact" => &mut cols.contact,
                "generation" => &mut cols.generation,
                _ => continue,
            };
            slot.get_or_insert(idx);
        }
        for (name, col) in [("id", cols.id), ("name", cols.name)] {
            if col.is_none() {
                return Err(Error::Sheet {
                    line: 1,
                    message: format!("missing required column `{name}`"),
                });
            }
        }
        Ok(cols)
    }
}

fn field(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|idx| row.get(idx))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn optional_ref(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Parses a sheet into person records.
///
/// Rows without an id or a name are skipped; an empty or non-numeric `generation` reads as 0.
/// Record-level validation is left to [`crate::PersonStore`].
pub fn parse_sheet(text: &str) -> Result<Vec<Person>> {
    let mut rows = split_records(text)?.into_iter();
    let Some((_, header)) = rows.next() else {
        return Ok(Vec::new());
    };
    let cols = Columns::from_header(&header)?;

    let mut people = Vec::new();
    for (line, row) in rows {
        let id = field(&row, cols.id);
        let name = field(&row, cols.name);
        if id.is_empty() || name.is_empty() {
            if row.iter().any(|cell| !cell.trim().is_empty()) {
                tracing::debug!(line, "skipping sheet row without id or name");
            }
            continue;
        }

        let raw_generation = field(&row, cols.generation);
        let generation = if raw_generation.is_empty() {
            0
        } else {
            raw_generation.parse::<i32>().unwrap_or_else(|_| {
                tracing::debug!(line, value = raw_generation, "non-numeric generation, using 0");
                0
            })
        };

        people.push(Person {
            id: id.to_string(),
            name: name.to_string(),
            birthdate: field(&row, cols.birthdate).to_string(),
            deceased_date: field(&row, cols.deceased_date).to_string(),
            parent_id: optional_ref(field(&row, cols.parent_id)),
            spouse_id: optional_ref(field(&row, cols.spouse_id)),
            generation,
            photo_url: field(&row, cols.photo_url).to_string(),
            location: field(&row, cols.location).to_string(),
            contact: field(&row, cols.contact).to_string(),
        });
    }
    Ok(people)
}

/// Splits text into records, each tagged with the 1-based line it starts on. Blank lines are
/// dropped.
fn split_records(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push(ch);
                }
                _ => cell.push(ch),
            }
            continue;
        }
        match ch {
            '"' if cell.trim().is_empty() => {
                cell.clear();
                in_quotes = true;
            }
            ',' => record.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut cell));
                push_record(&mut records, record_line, std::mem::take(&mut record));
                line += 1;
                record_line = line;
            }
            _ => cell.push(ch),
        }
    }
    if in_quotes {
        return Err(Error::Sheet {
            line: record_line,
            message: "unterminated quoted field".to_string(),
        });
    }
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        push_record(&mut records, record_line, record);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, record: Vec<String>) {
    let blank = record.iter().all(|cell| cell.trim().is_empty());
    if !blank {
        records.push((line, record));
    }
}
