use crate::bibtex::{BibData, BibEntry};
use crate::error::{PubsError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-paper data that is not part of the bibliographic record, stored as
/// `meta/<citekey>.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// `docsdir://<file>` for managed documents, an absolute path otherwise
    #[serde(default)]
    pub docfile: Option<String>,

    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Set on first push, never rewritten afterwards
    #[serde(default)]
    pub added: Option<DateTime<Utc>>,

    /// Whether a note file exists for this paper
    #[serde(default)]
    pub notes: bool,
}

/// A citation entry: citekey, its bibliographic record and its metadata.
///
/// The record inside `bibdata` is always keyed by `citekey`; `set_citekey`
/// re-keys it. Papers are plain values: nothing here touches the disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    citekey: String,
    bibdata: BibData,
    metadata: Metadata,
}

impl Paper {
    pub fn new(citekey: impl Into<String>, entry: BibEntry, metadata: Metadata) -> Self {
        let citekey = citekey.into();
        Self {
            bibdata: BibData::single(citekey.clone(), entry),
            citekey,
            metadata,
        }
    }

    /// Build a paper from a record collection holding exactly one entry.
    /// The entry is re-keyed to `citekey` whatever key it was stored under.
    pub fn from_bibdata(
        citekey: impl Into<String>,
        bibdata: BibData,
        metadata: Metadata,
    ) -> Result<Self> {
        let citekey = citekey.into();
        if bibdata.len() != 1 {
            return Err(PubsError::Bibdata(format!(
                "expected exactly one entry for '{}', found {}",
                citekey,
                bibdata.len()
            )));
        }
        let entry = bibdata
            .iter()
            .next()
            .map(|(_, e)| e.clone())
            .ok_or_else(|| PubsError::Bibdata(format!("no entry for '{}'", citekey)))?;
        Ok(Self::new(citekey, entry, metadata))
    }

    pub fn citekey(&self) -> &str {
        &self.citekey
    }

    /// Change the citekey, re-keying the bibliographic record with it.
    pub fn set_citekey(&mut self, citekey: impl Into<String>) {
        let citekey = citekey.into();
        self.bibdata.rekey(&self.citekey, &citekey);
        self.citekey = citekey;
    }

    pub fn bibdata(&self) -> &BibData {
        &self.bibdata
    }

    /// The bibliographic record for this citekey, e.g. for export.
    pub fn bibentry(&self) -> &BibEntry {
        &self.bibdata[self.citekey.as_str()]
    }

    pub fn set_bibentry(&mut self, entry: BibEntry) {
        self.bibdata = BibData::single(self.citekey.clone(), entry);
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.metadata.tags
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.metadata.tags.insert(tag.into())
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.metadata.tags.remove(tag)
    }

    pub fn docpath(&self) -> Option<&str> {
        self.metadata.docfile.as_deref()
    }

    pub fn set_docpath(&mut self, docpath: Option<String>) {
        self.metadata.docfile = docpath;
    }

    pub fn added(&self) -> Option<DateTime<Utc>> {
        self.metadata.added
    }

    pub fn set_added(&mut self, added: DateTime<Utc>) {
        self.metadata.added = Some(added);
    }
}
