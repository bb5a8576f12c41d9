//! Bibliographic record data structures

use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A single BibTeX field (key-value pair)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibField {
    pub key: String,
    pub value: String,
}

/// One bibliographic record: an entry type plus its fields, in source order.
/// The citekey is not part of the entry; it is the key under which the entry
/// is stored in [`BibData`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibEntry {
    pub entry_type: String,
    pub fields: Vec<BibField>,
}

impl BibEntry {
    pub fn new(entry_type: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into().to_lowercase(),
            fields: Vec::new(),
        }
    }

    /// Add a field, replacing any existing field with the same key.
    pub fn add_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|f| f.key.eq_ignore_ascii_case(&key))
        {
            Some(field) => field.value = value,
            None => self.fields.push(BibField { key, value }),
        }
    }

    /// Get a field value by key (case-insensitive)
    pub fn get_field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key.eq_ignore_ascii_case(key))
            .map(|f| f.value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }
}

/// A collection of bibliographic records keyed by citekey, in insertion order.
///
/// Indexing by citekey (`bibdata["smith2020"]`) panics when the key is absent;
/// use [`BibData::get`] when absence is possible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibData {
    entries: Vec<(String, BibEntry)>,
}

impl BibData {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding exactly one record.
    pub fn single(citekey: impl Into<String>, entry: BibEntry) -> Self {
        Self {
            entries: vec![(citekey.into(), entry)],
        }
    }

    /// Insert a record, replacing any record stored under the same citekey.
    pub fn insert(&mut self, citekey: impl Into<String>, entry: BibEntry) {
        let citekey = citekey.into();
        match self.entries.iter_mut().find(|(k, _)| *k == citekey) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((citekey, entry)),
        }
    }

    pub fn get(&self, citekey: &str) -> Option<&BibEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == citekey)
            .map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, citekey: &str) -> Option<&mut BibEntry> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == citekey)
            .map(|(_, e)| e)
    }

    pub fn remove(&mut self, citekey: &str) -> Option<BibEntry> {
        let pos = self.entries.iter().position(|(k, _)| k == citekey)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, citekey: &str) -> bool {
        self.get(citekey).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BibEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-key the record stored under `old` to `new`, keeping its position.
    /// Returns false if `old` is absent.
    pub fn rekey(&mut self, old: &str, new: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == old) {
            Some((key, _)) => {
                *key = new.to_string();
                true
            }
            None => false,
        }
    }
}

impl Index<&str> for BibData {
    type Output = BibEntry;

    fn index(&self, citekey: &str) -> &BibEntry {
        match self.get(citekey) {
            Some(entry) => entry,
            None => panic!("no bibliographic record for citekey '{}'", citekey),
        }
    }
}

impl FromIterator<(String, BibEntry)> for BibData {
    fn from_iter<I: IntoIterator<Item = (String, BibEntry)>>(iter: I) -> Self {
        let mut data = BibData::new();
        for (k, e) in iter {
            data.insert(k, e);
        }
        data
    }
}
