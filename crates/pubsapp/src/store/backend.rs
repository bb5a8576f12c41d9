use super::{OnMissing, Transfer};
use crate::bibtex::BibData;
use crate::error::Result;
use crate::model::Metadata;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Abstract interface for the raw persistence of papers.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while `Repository` handles the "what" (uniqueness, ordering, events).
pub trait ContentStore {
    // --- Record Operations ---

    /// Whether anything is stored under `citekey`.
    /// With `meta_check`, both bib and meta must exist; without it, either suffices.
    fn exists(&self, citekey: &str, meta_check: bool) -> Result<bool>;

    /// Fails with `NotFound` if the bib file is absent.
    fn pull_bibdata(&self, citekey: &str) -> Result<BibData>;

    /// Fails with `NotFound` if the meta file is absent.
    fn pull_metadata(&self, citekey: &str) -> Result<Metadata>;

    /// Write (or overwrite) the record. MUST be atomic.
    fn push_bibdata(&self, citekey: &str, data: &BibData) -> Result<()>;

    /// Write (or overwrite) the metadata. MUST be atomic.
    fn push_metadata(&self, citekey: &str, metadata: &Metadata) -> Result<()>;

    /// Delete bib and meta files. Absent files are not an error.
    fn remove(&self, citekey: &str) -> Result<()>;

    /// Citekeys with a bib file.
    fn bib_citekeys(&self) -> Result<BTreeSet<String>>;

    /// Citekeys with a meta file.
    fn meta_citekeys(&self) -> Result<BTreeSet<String>>;

    /// Complete citekeys (bib and meta both present). Full scan of the store.
    fn citekeys(&self) -> Result<BTreeSet<String>> {
        let meta = self.meta_citekeys()?;
        Ok(self
            .bib_citekeys()?
            .into_iter()
            .filter(|k| meta.contains(k))
            .collect())
    }

    // --- Document Operations ---

    /// Bring `source` into the managed documents directory as `<citekey>.<ext>`.
    /// Returns the `docsdir://` path. Content is copied byte for byte.
    fn add_doc(
        &self,
        citekey: &str,
        source: &Path,
        transfer: Transfer,
        overwrite: bool,
    ) -> Result<String>;

    /// Resolve a recorded document path to a real location.
    fn real_docpath(&self, docpath: &str) -> PathBuf;

    /// Rename a managed document to match `new_citekey`; returns the new docpath.
    fn rename_doc(&self, docpath: &str, new_citekey: &str) -> Result<String>;

    /// Delete a managed document. Documents outside the managed directory
    /// are left alone.
    fn remove_doc(&self, docpath: &str, on_missing: OnMissing) -> Result<()>;

    /// `docsdir://` paths of every file in the managed documents directory.
    fn managed_docs(&self) -> Result<BTreeSet<String>>;

    // --- Note Operations ---

    fn note_path(&self, citekey: &str) -> PathBuf;

    /// Returns Ok(None) if there is no note.
    fn pull_note(&self, citekey: &str) -> Result<Option<String>>;

    fn push_note(&self, citekey: &str, text: &str) -> Result<()>;

    fn rename_note(&self, old_citekey: &str, new_citekey: &str, on_missing: OnMissing)
        -> Result<()>;

    fn remove_note(&self, citekey: &str, on_missing: OnMissing) -> Result<()>;
}
