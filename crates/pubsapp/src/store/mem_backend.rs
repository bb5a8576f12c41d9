use super::backend::ContentStore;
use super::{doc_filename, in_docsdir, OnMissing, Transfer, DOCSDIR_PREFIX};
use crate::bibtex::BibData;
use crate::error::{PubsError, Result};
use crate::model::Metadata;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// Which writes the in-memory store should refuse, for error-path tests.
#[derive(Debug, Clone, Copy, Default)]
struct FailureMode {
    writes: bool,
    metadata_writes: bool,
    doc_removal: bool,
    note_rename: bool,
}

/// In-memory content store for testing.
///
/// Uses `RefCell` for interior mutability since the repository is
/// single-threaded. Documents "outside" the store are modelled by a separate
/// map of external files, seeded with [`MemContentStore::add_external_file`].
#[derive(Default)]
pub struct MemContentStore {
    bib: RefCell<HashMap<String, BibData>>,
    meta: RefCell<HashMap<String, Metadata>>,
    docs: RefCell<BTreeMap<String, Vec<u8>>>,
    external: RefCell<HashMap<PathBuf, Vec<u8>>>,
    notes: RefCell<HashMap<String, String>>,
    failures: RefCell<FailureMode>,
}

fn simulated(what: &str) -> PubsError {
    PubsError::Io(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        format!("simulated {} failure", what),
    ))
}

impl MemContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.failures.borrow_mut().writes = simulate;
    }

    /// Make only metadata writes fail, leaving bib writes working.
    pub fn set_simulate_metadata_write_error(&self, simulate: bool) {
        self.failures.borrow_mut().metadata_writes = simulate;
    }

    /// Make document removal fail with a permission error.
    pub fn set_simulate_doc_removal_error(&self, simulate: bool) {
        self.failures.borrow_mut().doc_removal = simulate;
    }

    /// Make note renames fail with a permission error.
    pub fn set_simulate_note_rename_error(&self, simulate: bool) {
        self.failures.borrow_mut().note_rename = simulate;
    }

    /// Seed a file outside the managed area, usable as an `add_doc` source.
    pub fn add_external_file(&self, path: impl Into<PathBuf>, content: &[u8]) {
        self.external
            .borrow_mut()
            .insert(path.into(), content.to_vec());
    }

    pub fn has_external_file(&self, path: &Path) -> bool {
        self.external.borrow().contains_key(path)
    }

    /// Bytes of a managed document, if present.
    pub fn doc_content(&self, docpath: &str) -> Option<Vec<u8>> {
        let name = docpath.strip_prefix(DOCSDIR_PREFIX)?;
        self.docs.borrow().get(name).cloned()
    }

    fn check_writes(&self) -> Result<()> {
        if self.failures.borrow().writes {
            return Err(simulated("write"));
        }
        Ok(())
    }

    fn missing(path: String, on_missing: OnMissing) -> Result<()> {
        match on_missing {
            OnMissing::Ignore => Ok(()),
            OnMissing::Fail => Err(PubsError::NotFound(PathBuf::from(path))),
        }
    }
}

impl ContentStore for MemContentStore {
    fn exists(&self, citekey: &str, meta_check: bool) -> Result<bool> {
        let bib = self.bib.borrow().contains_key(citekey);
        let meta = self.meta.borrow().contains_key(citekey);
        Ok(if meta_check { bib && meta } else { bib || meta })
    }

    fn pull_bibdata(&self, citekey: &str) -> Result<BibData> {
        self.bib
            .borrow()
            .get(citekey)
            .cloned()
            .ok_or_else(|| PubsError::NotFound(PathBuf::from(format!("memory://bib/{}", citekey))))
    }

    fn pull_metadata(&self, citekey: &str) -> Result<Metadata> {
        self.meta
            .borrow()
            .get(citekey)
            .cloned()
            .ok_or_else(|| {
                PubsError::NotFound(PathBuf::from(format!("memory://meta/{}", citekey)))
            })
    }

    fn push_bibdata(&self, citekey: &str, data: &BibData) -> Result<()> {
        self.check_writes()?;
        self.bib
            .borrow_mut()
            .insert(citekey.to_string(), data.clone());
        Ok(())
    }

    fn push_metadata(&self, citekey: &str, metadata: &Metadata) -> Result<()> {
        self.check_writes()?;
        if self.failures.borrow().metadata_writes {
            return Err(simulated("metadata write"));
        }
        self.meta
            .borrow_mut()
            .insert(citekey.to_string(), metadata.clone());
        Ok(())
    }

    fn remove(&self, citekey: &str) -> Result<()> {
        self.bib.borrow_mut().remove(citekey);
        self.meta.borrow_mut().remove(citekey);
        Ok(())
    }

    fn bib_citekeys(&self) -> Result<BTreeSet<String>> {
        Ok(self.bib.borrow().keys().cloned().collect())
    }

    fn meta_citekeys(&self) -> Result<BTreeSet<String>> {
        Ok(self.meta.borrow().keys().cloned().collect())
    }

    fn add_doc(
        &self,
        citekey: &str,
        source: &Path,
        transfer: Transfer,
        overwrite: bool,
    ) -> Result<String> {
        self.check_writes()?;
        let name = doc_filename(citekey, source);
        if !overwrite && self.docs.borrow().contains_key(&name) {
            return Err(PubsError::AlreadyExists(PathBuf::from(format!(
                "memory://doc/{}",
                name
            ))));
        }
        let content = self
            .external
            .borrow()
            .get(source)
            .cloned()
            .ok_or_else(|| PubsError::NotFound(source.to_path_buf()))?;
        self.docs.borrow_mut().insert(name.clone(), content);
        if transfer == Transfer::Move {
            self.external.borrow_mut().remove(source);
        }
        Ok(format!("{}{}", DOCSDIR_PREFIX, name))
    }

    fn real_docpath(&self, docpath: &str) -> PathBuf {
        match docpath.strip_prefix(DOCSDIR_PREFIX) {
            Some(name) => PathBuf::from(format!("memory://doc/{}", name)),
            None => PathBuf::from(docpath),
        }
    }

    fn rename_doc(&self, docpath: &str, new_citekey: &str) -> Result<String> {
        self.check_writes()?;
        let old_name = docpath
            .strip_prefix(DOCSDIR_PREFIX)
            .ok_or_else(|| PubsError::Store(format!("{} is not a managed document", docpath)))?;
        let new_name = doc_filename(new_citekey, Path::new(old_name));

        let mut docs = self.docs.borrow_mut();
        if docs.contains_key(&new_name) {
            return Err(PubsError::AlreadyExists(self.real_docpath(&format!(
                "{}{}",
                DOCSDIR_PREFIX, new_name
            ))));
        }
        let content = docs
            .remove(old_name)
            .ok_or_else(|| PubsError::NotFound(self.real_docpath(docpath)))?;
        docs.insert(new_name.clone(), content);
        Ok(format!("{}{}", DOCSDIR_PREFIX, new_name))
    }

    fn remove_doc(&self, docpath: &str, on_missing: OnMissing) -> Result<()> {
        if !in_docsdir(docpath) {
            return Ok(());
        }
        if self.failures.borrow().doc_removal {
            return Err(simulated("document removal"));
        }
        let name = &docpath[DOCSDIR_PREFIX.len()..];
        if self.docs.borrow_mut().remove(name).is_none() {
            return Self::missing(format!("memory://doc/{}", name), on_missing);
        }
        Ok(())
    }

    fn managed_docs(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .docs
            .borrow()
            .keys()
            .map(|name| format!("{}{}", DOCSDIR_PREFIX, name))
            .collect())
    }

    fn note_path(&self, citekey: &str) -> PathBuf {
        PathBuf::from(format!("memory://notes/{}.txt", citekey))
    }

    fn pull_note(&self, citekey: &str) -> Result<Option<String>> {
        Ok(self.notes.borrow().get(citekey).cloned())
    }

    fn push_note(&self, citekey: &str, text: &str) -> Result<()> {
        self.check_writes()?;
        self.notes
            .borrow_mut()
            .insert(citekey.to_string(), text.to_string());
        Ok(())
    }

    fn rename_note(
        &self,
        old_citekey: &str,
        new_citekey: &str,
        on_missing: OnMissing,
    ) -> Result<()> {
        if self.failures.borrow().note_rename {
            return Err(simulated("note rename"));
        }
        let mut notes = self.notes.borrow_mut();
        if notes.contains_key(new_citekey) {
            return Err(PubsError::AlreadyExists(self.note_path(new_citekey)));
        }
        match notes.remove(old_citekey) {
            Some(text) => {
                notes.insert(new_citekey.to_string(), text);
                Ok(())
            }
            None => Self::missing(format!("memory://notes/{}.txt", old_citekey), on_missing),
        }
    }

    fn remove_note(&self, citekey: &str, on_missing: OnMissing) -> Result<()> {
        if self.notes.borrow_mut().remove(citekey).is_none() {
            return Self::missing(format!("memory://notes/{}.txt", citekey), on_missing);
        }
        Ok(())
    }
}
