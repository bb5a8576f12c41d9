//! # Repository
//!
//! The repository is the single point of truth for citekey uniqueness and for
//! keeping the three stores (records, metadata, documents + notes) in step. It
//! mediates every access to the [`ContentStore`]; nothing else writes files.
//!
//! ## The Citekey Index
//!
//! The set of known citekeys is loaded lazily: the first call that needs it
//! (`contains`, `len`, `all_papers`, `push`, `unique_citekey`, ...) pays for a
//! full scan of the store, O(number of papers). After that it is updated
//! incrementally by `push`, `remove` and `rename`. There is no invalidation
//! from outside: another process editing `pubsdir` concurrently is not
//! supported.
//!
//! ## Write Ordering
//!
//! Nothing here is transactional. Operations order their steps so that a crash
//! loses as little as possible:
//!
//! - `push` writes the record before the metadata. A failure in between
//!   leaves a half-written paper (bib without meta): invisible to `pull` and
//!   `all_papers`, but still counted by the collision check, and repaired by
//!   `doctor --fix`.
//! - `rename` writes the paper under its new citekey before removing the old
//!   one. A crash in between leaves both citekeys present; recover with
//!   `remove(old)`.
//! - `rename` moves the managed document to its new name before writing the
//!   new citekey. If that write fails, the stored metadata under the old
//!   citekey still names the old document path, which no longer exists.
//!   `doctor` reports the old citekey under `missing_docs` and the renamed
//!   file under `orphan_docs`.
//! - Citekeys handed to `pull`, `remove` and `rename` are validated before
//!   any store access, so a malformed key can never address a file outside
//!   the repository.
//!
//! ## Best-Effort Cleanup
//!
//! Primary writes (record, metadata) always surface their errors. Secondary
//! cleanup (document and note removal in `remove`, note rename in `rename`) is
//! logged and swallowed, so a stuck attachment never blocks removing or
//! renaming a paper.

use crate::citekey;
use crate::config::PubsConfig;
use crate::error::{PubsError, Result};
use crate::events::{Event, EventBus, EventListener};
use crate::model::{Metadata, Paper};
use crate::store::fs_backend::FsContentStore;
use crate::store::{in_docsdir, ContentStore, OnMissing, Transfer};
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Findings of [`Repository::doctor`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    /// Half-written papers: record present, metadata missing
    pub bib_without_meta: Vec<String>,
    /// Leftovers: metadata present, record missing
    pub meta_without_bib: Vec<String>,
    /// Complete papers whose files could not be read back
    pub unreadable: Vec<String>,
    /// Papers pointing at a managed document that does not exist
    pub missing_docs: Vec<String>,
    /// Managed documents no paper points at
    pub orphan_docs: Vec<String>,
    /// Number of problems repaired
    pub fixed: usize,
}

impl DoctorReport {
    pub fn is_clean(&self) -> bool {
        self.bib_without_meta.is_empty()
            && self.meta_without_bib.is_empty()
            && self.unreadable.is_empty()
            && self.missing_docs.is_empty()
            && self.orphan_docs.is_empty()
    }
}

pub struct Repository<S: ContentStore> {
    store: S,
    citekeys: Option<BTreeSet<String>>,
    events: EventBus,
    import_copy: bool,
    import_move: bool,
}

impl Repository<FsContentStore> {
    /// Open the repository at `config.pubsdir()`. Fails if it was never initialized.
    pub fn open(config: &PubsConfig) -> Result<Self> {
        let store = Self::fs_store(config);
        if !store.is_initialized() {
            return Err(PubsError::Store(format!(
                "no repository at {} (run `pubs init`)",
                store.root().display()
            )));
        }
        Ok(Repository::new(store).with_config(config))
    }

    /// Create the directory skeleton at `config.pubsdir()` and open it.
    pub fn init(config: &PubsConfig) -> Result<Self> {
        let store = Self::fs_store(config);
        store.init()?;
        debug!(root = %store.root().display(), "repository initialized");
        Ok(Repository::new(store).with_config(config))
    }

    fn fs_store(config: &PubsConfig) -> FsContentStore {
        FsContentStore::new(config.pubsdir()).with_note_ext(&config.note_ext())
    }
}

impl<S: ContentStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            citekeys: None,
            events: EventBus::new(),
            import_copy: true,
            import_move: false,
        }
    }

    pub fn with_config(mut self, config: &PubsConfig) -> Self {
        self.import_copy = config.import_copy;
        self.import_move = config.import_move;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn register_listener(&mut self, listener: Box<dyn EventListener>) {
        self.events.register(listener);
    }

    /// The citekey index, loading it from the store on first use.
    fn index(&mut self) -> Result<&mut BTreeSet<String>> {
        if self.citekeys.is_none() {
            let keys = self.store.citekeys()?;
            debug!(count = keys.len(), "citekey index loaded");
            self.citekeys = Some(keys);
        }
        Ok(self.citekeys.get_or_insert_with(BTreeSet::new))
    }

    /// All known citekeys. Costly on first call (full store scan).
    pub fn citekeys(&mut self) -> Result<&BTreeSet<String>> {
        let keys: &BTreeSet<String> = self.index()?;
        Ok(keys)
    }

    /// Costly on first call (full store scan).
    pub fn contains(&mut self, citekey: &str) -> Result<bool> {
        Ok(self.index()?.contains(citekey))
    }

    /// Costly on first call (full store scan).
    pub fn len(&mut self) -> Result<usize> {
        Ok(self.index()?.len())
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.index()?.is_empty())
    }

    /// Lazily pull every paper. Each call re-reads the index, so a new
    /// iteration reflects mutations made since the previous one. The
    /// repository is borrowed for the life of the iterator, which keeps the
    /// index from changing underneath it.
    pub fn all_papers(&mut self) -> Result<impl Iterator<Item = Result<Paper>> + '_> {
        let keys: Vec<String> = self.index()?.iter().cloned().collect();
        let repo: &Self = self;
        Ok(keys.into_iter().map(move |k| repo.pull(&k)))
    }

    /// Load a paper. Both record and metadata must be present; a half-written
    /// paper is reported as `InvalidReference` like a missing one.
    pub fn pull(&self, citekey: &str) -> Result<Paper> {
        if !is_storable(citekey) || !self.store.exists(citekey, true)? {
            return Err(PubsError::InvalidReference(citekey.to_string()));
        }
        let bibdata = self.store.pull_bibdata(citekey)?;
        let metadata = self.store.pull_metadata(citekey)?;
        Paper::from_bibdata(citekey, bibdata, metadata)
    }

    /// Write a paper to the store.
    ///
    /// With `overwrite` false this is an *add*: it fails with
    /// `CiteKeyCollision` if anything is already stored under the citekey.
    /// With `overwrite` true it is an *update*. The `added` date is stamped
    /// the first time a paper without one is pushed.
    pub fn push(&mut self, paper: &mut Paper, overwrite: bool, emit_event: bool) -> Result<()> {
        let key = paper.citekey().to_string();
        citekey::validate(&key).map_err(|reason| PubsError::invalid_citekey(&key, reason))?;

        if !overwrite && (self.store.exists(&key, false)? || self.contains(&key)?) {
            return Err(PubsError::CiteKeyCollision(key));
        }
        if paper.added().is_none() {
            paper.set_added(Utc::now());
        }

        self.store.push_bibdata(&key, paper.bibdata())?;
        self.store.push_metadata(&key, paper.metadata())?;
        self.index()?.insert(key.clone());
        debug!(citekey = %key, overwrite, "paper pushed");

        if emit_event {
            self.events.send(&Event::Add { citekey: key });
        }
        Ok(())
    }

    /// Remove a paper. A citekey with nothing stored under it is a no-op.
    ///
    /// With `remove_doc`, the managed document and the note go too; failures
    /// there are logged, not returned. Documents linked from outside the
    /// repository are never deleted.
    pub fn remove(&mut self, citekey: &str, remove_doc: bool, emit_event: bool) -> Result<()> {
        citekey::validate(citekey).map_err(|reason| PubsError::invalid_citekey(citekey, reason))?;
        if !self.contains(citekey)? && !self.store.exists(citekey, false)? {
            debug!(citekey, "nothing to remove");
            return Ok(());
        }

        if emit_event {
            self.events.send(&Event::Remove {
                citekey: citekey.to_string(),
            });
        }
        if remove_doc {
            self.remove_attachments(citekey);
        }

        self.index()?.remove(citekey);
        self.store.remove(citekey)?;
        debug!(citekey, remove_doc, "paper removed");
        Ok(())
    }

    fn remove_attachments(&self, citekey: &str) {
        match self.store.pull_metadata(citekey) {
            Ok(metadata) => {
                if let Some(docpath) = metadata.docfile.as_deref() {
                    if let Err(e) = self.store.remove_doc(docpath, OnMissing::Ignore) {
                        warn!(citekey, docpath, error = %e, "could not remove document");
                    }
                }
            }
            Err(e) => {
                warn!(citekey, error = %e, "could not read metadata, document left in place");
            }
        }
        if let Err(e) = self.store.remove_note(citekey, OnMissing::Ignore) {
            warn!(citekey, error = %e, "could not remove note");
        }
    }

    /// Move a paper from `old_citekey` to `new_citekey`.
    ///
    /// Not atomic: the paper is written under the new key, then the old key is
    /// removed. If the process dies in between both keys exist; `remove(old)`
    /// recovers.
    pub fn rename(&mut self, paper: &mut Paper, new_citekey: &str, old_citekey: &str) -> Result<()> {
        if !is_storable(old_citekey) {
            return Err(PubsError::InvalidReference(old_citekey.to_string()));
        }
        if old_citekey == new_citekey {
            paper.set_citekey(new_citekey);
            return self.push(paper, true, false);
        }

        citekey::validate(new_citekey)
            .map_err(|reason| PubsError::invalid_citekey(new_citekey, reason))?;
        if self.contains(new_citekey)? || self.store.exists(new_citekey, false)? {
            return Err(PubsError::CiteKeyCollision(new_citekey.to_string()));
        }

        if let Some(docpath) = paper.docpath().filter(|d| in_docsdir(d)).map(str::to_string) {
            let renamed = self.store.rename_doc(&docpath, new_citekey)?;
            paper.set_docpath(Some(renamed));
        }
        if let Err(e) = self
            .store
            .rename_note(old_citekey, new_citekey, OnMissing::Ignore)
        {
            warn!(old_citekey, new_citekey, error = %e, "could not rename note");
        }

        paper.set_citekey(new_citekey);
        self.push(paper, false, false)?;
        self.remove(old_citekey, false, false)?;
        debug!(old_citekey, new_citekey, "paper renamed");

        self.events.send(&Event::Rename {
            paper: paper.clone(),
            old_citekey: old_citekey.to_string(),
        });
        Ok(())
    }

    /// Attach a document to a paper.
    ///
    /// With `copy` (defaulting to the `import_copy` setting) the file is copied
    /// into the managed documents directory; otherwise its absolute path is
    /// recorded. A previously managed document under another name is removed.
    pub fn push_doc(&mut self, citekey: &str, docfile: &Path, copy: Option<bool>) -> Result<Paper> {
        let mut paper = self.pull(citekey)?;
        let previous = paper.docpath().map(str::to_string);

        let docpath = if copy.unwrap_or(self.import_copy) {
            let transfer = if self.import_move {
                Transfer::Move
            } else {
                Transfer::Copy
            };
            self.store.add_doc(citekey, docfile, transfer, true)?
        } else {
            system_path(docfile)?
        };

        if let Some(previous) = previous.filter(|p| in_docsdir(p) && *p != docpath) {
            if let Err(e) = self.store.remove_doc(&previous, OnMissing::Ignore) {
                warn!(citekey, docpath = %previous, error = %e, "could not remove replaced document");
            }
        }

        paper.set_docpath(Some(docpath));
        self.push(&mut paper, true, false)?;
        Ok(paper)
    }

    /// Detach the document of a paper, deleting it if it is managed.
    pub fn remove_doc(&mut self, citekey: &str) -> Result<Paper> {
        let mut paper = self.pull(citekey)?;
        if let Some(docpath) = paper.docpath().map(str::to_string) {
            self.store.remove_doc(&docpath, OnMissing::Ignore)?;
            paper.set_docpath(None);
            self.push(&mut paper, true, false)?;
        }
        Ok(paper)
    }

    /// Real location of the paper's document, if it has one.
    pub fn real_docpath(&self, paper: &Paper) -> Option<PathBuf> {
        paper.docpath().map(|d| self.store.real_docpath(d))
    }

    pub fn note_path(&self, citekey: &str) -> PathBuf {
        self.store.note_path(citekey)
    }

    pub fn pull_note(&self, citekey: &str) -> Result<Option<String>> {
        if !is_storable(citekey) {
            return Err(PubsError::InvalidReference(citekey.to_string()));
        }
        self.store.pull_note(citekey)
    }

    /// Write the note of an existing paper and flag it in the metadata.
    pub fn push_note(&mut self, citekey: &str, text: &str) -> Result<Paper> {
        let mut paper = self.pull(citekey)?;
        self.store.push_note(citekey, text)?;
        if !paper.metadata().notes {
            paper.metadata_mut().notes = true;
            self.push(&mut paper, true, false)?;
        }
        Ok(paper)
    }

    /// `base_key` if free, else `base_key` with the first free letter suffix.
    pub fn unique_citekey(&mut self, base_key: &str) -> Result<String> {
        Ok(citekey::generate_unique(base_key, self.index()?))
    }

    /// Union of the tags of every paper. Reads every record and metadata
    /// file, so it is costly.
    pub fn all_tags(&mut self) -> Result<BTreeSet<String>> {
        let mut tags = BTreeSet::new();
        for paper in self.all_papers()? {
            tags.extend(paper?.tags().iter().cloned());
        }
        Ok(tags)
    }

    /// Look for inconsistencies between the stores. With `fix`, half-written
    /// papers get default metadata and leftover metadata is deleted; the index
    /// is reloaded afterwards.
    pub fn doctor(&mut self, fix: bool) -> Result<DoctorReport> {
        let mut report = DoctorReport::default();
        let bib = self.store.bib_citekeys()?;
        let meta = self.store.meta_citekeys()?;

        for key in bib.difference(&meta) {
            report.bib_without_meta.push(key.clone());
            if fix {
                let metadata = Metadata {
                    added: Some(Utc::now()),
                    ..Default::default()
                };
                self.store.push_metadata(key, &metadata)?;
                report.fixed += 1;
            }
        }
        for key in meta.difference(&bib) {
            report.meta_without_bib.push(key.clone());
            if fix {
                self.store.remove(key)?;
                report.fixed += 1;
            }
        }

        let managed = self.store.managed_docs()?;
        let mut referenced = BTreeSet::new();
        for key in self.store.citekeys()? {
            match self.pull(&key) {
                Ok(paper) => {
                    if let Some(docpath) = paper.docpath().filter(|d| in_docsdir(d)) {
                        referenced.insert(docpath.to_string());
                        if !managed.contains(docpath) {
                            report.missing_docs.push(key.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!(citekey = %key, error = %e, "unreadable paper");
                    report.unreadable.push(key.clone());
                }
            }
        }
        report.orphan_docs = managed.difference(&referenced).cloned().collect();

        if fix {
            self.citekeys = None;
        }
        Ok(report)
    }
}

/// Only valid citekeys reach the store, which joins them into file paths.
fn is_storable(citekey: &str) -> bool {
    citekey::validate(citekey).is_ok()
}

/// Absolute, symlink-resolved form of a document path that is linked in place.
fn system_path(path: &Path) -> Result<String> {
    let absolute = fs::canonicalize(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PubsError::NotFound(path.to_path_buf())
        } else {
            PubsError::Io(e)
        }
    })?;
    Ok(absolute.to_string_lossy().into_owned())
}
