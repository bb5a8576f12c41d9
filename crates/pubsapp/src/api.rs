//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for UI
//! clients. It dispatches to `commands::*`, normalizes inputs (trimming
//! citekeys, dropping duplicates) and returns structured [`CmdResult`]s.
//! Business logic stays in the commands; presentation stays in the client.
//!
//! `PubsApi<S: ContentStore>` is generic over the store:
//! - Production: `PubsApi<FsContentStore>`, built with [`PubsApi::open`]
//! - Testing: `PubsApi<MemContentStore>`
//!
//! API tests check dispatch and input handling, not command logic.

use crate::commands::{self, CmdResult};
use crate::config::PubsConfig;
use crate::error::{PubsError, Result};
use crate::events::EventListener;
use crate::repo::Repository;
use crate::store::fs_backend::FsContentStore;
use crate::store::ContentStore;
use std::collections::HashSet;
use std::path::Path;

pub use commands::add::AddOptions;
pub use commands::export::ExportFormat;
pub use commands::import::{ImportOptions, OnCollision};
pub use commands::list::ListFilter;

pub struct PubsApi<S: ContentStore> {
    repo: Repository<S>,
}

impl PubsApi<FsContentStore> {
    /// Open the repository described by `config`.
    pub fn open(config: &PubsConfig) -> Result<Self> {
        Ok(Self::new(Repository::open(config)?))
    }
}

impl<S: ContentStore> PubsApi<S> {
    pub fn new(repo: Repository<S>) -> Self {
        Self { repo }
    }

    pub fn repository(&mut self) -> &mut Repository<S> {
        &mut self.repo
    }

    pub fn register_listener(&mut self, listener: Box<dyn EventListener>) {
        self.repo.register_listener(listener);
    }

    pub fn add(&mut self, bibtex: &str, options: AddOptions) -> Result<CmdResult> {
        commands::add::run(&mut self.repo, bibtex, options)
    }

    pub fn import(&mut self, bibtex: &str, options: ImportOptions) -> Result<CmdResult> {
        commands::import::run(&mut self.repo, bibtex, options)
    }

    pub fn remove<K: AsRef<str>>(&mut self, citekeys: &[K], keep_docs: bool) -> Result<CmdResult> {
        let keys = normalize_citekeys(citekeys)?;
        commands::remove::run(&mut self.repo, &keys, keep_docs)
    }

    pub fn rename(&mut self, old_citekey: &str, new_citekey: &str) -> Result<CmdResult> {
        commands::rename::run(&mut self.repo, old_citekey.trim(), new_citekey.trim())
    }

    pub fn list(&mut self, filter: &ListFilter) -> Result<CmdResult> {
        commands::list::run(&mut self.repo, filter)
    }

    pub fn add_tags<K: AsRef<str>>(&mut self, citekeys: &[K], tags: &[String]) -> Result<CmdResult> {
        let keys = normalize_citekeys(citekeys)?;
        commands::tag::add(&mut self.repo, &keys, tags)
    }

    pub fn remove_tags<K: AsRef<str>>(
        &mut self,
        citekeys: &[K],
        tags: &[String],
    ) -> Result<CmdResult> {
        let keys = normalize_citekeys(citekeys)?;
        commands::tag::remove(&mut self.repo, &keys, tags)
    }

    pub fn all_tags(&mut self) -> Result<CmdResult> {
        commands::tag::list_all(&mut self.repo)
    }

    pub fn attach_doc(
        &mut self,
        citekey: &str,
        docfile: &Path,
        copy: Option<bool>,
    ) -> Result<CmdResult> {
        commands::doc::attach(&mut self.repo, citekey.trim(), docfile, copy)
    }

    pub fn detach_doc(&mut self, citekey: &str) -> Result<CmdResult> {
        commands::doc::detach(&mut self.repo, citekey.trim())
    }

    pub fn doc_path(&mut self, citekey: &str) -> Result<CmdResult> {
        commands::doc::path(&mut self.repo, citekey.trim())
    }

    pub fn note_path(&mut self, citekey: &str) -> Result<CmdResult> {
        commands::note::path(&mut self.repo, citekey.trim())
    }

    pub fn read_note(&mut self, citekey: &str) -> Result<CmdResult> {
        commands::note::read(&mut self.repo, citekey.trim())
    }

    pub fn write_note(&mut self, citekey: &str, text: &str) -> Result<CmdResult> {
        commands::note::write(&mut self.repo, citekey.trim(), text)
    }

    pub fn export<K: AsRef<str>>(
        &mut self,
        citekeys: &[K],
        format: ExportFormat,
    ) -> Result<CmdResult> {
        let keys = if citekeys.is_empty() {
            Vec::new()
        } else {
            normalize_citekeys(citekeys)?
        };
        commands::export::run(&mut self.repo, &keys, format)
    }

    pub fn doctor(&mut self, fix: bool) -> Result<CmdResult> {
        commands::doctor::run(&mut self.repo, fix)
    }
}

/// Trim, drop empties and duplicates (keeping first occurrence). At least
/// one citekey must remain.
fn normalize_citekeys<K: AsRef<str>>(citekeys: &[K]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = citekeys
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_string()))
        .map(str::to_string)
        .collect();
    if keys.is_empty() {
        return Err(PubsError::Api("no citekey given".to_string()));
    }
    Ok(keys)
}
