//! # Storage Layer
//!
//! All file-shaped I/O lives behind the [`ContentStore`] trait. The store is
//! addressed by citekey (records, metadata, notes) or by document path, and
//! hides the physical layout from the [`Repository`](crate::repo::Repository),
//! which is the only component allowed to talk to it.
//!
//! ## Storage Layout
//!
//! ```text
//! <pubsdir>/
//! ├── bib/<citekey>.bib          # Bibliographic record (BibTeX, one entry)
//! ├── meta/<citekey>.yaml        # Metadata: tags, added date, docfile, notes flag
//! ├── doc/<citekey>.<ext>        # Managed documents
//! └── notes/<citekey>.<note_ext> # Optional free-form note
//! ```
//!
//! A citekey is *complete* when both its bib and meta files exist. Only
//! complete citekeys are listed by [`ContentStore::citekeys`]; a lone bib or
//! meta file is a half-written paper, reported by `doctor`.
//!
//! ## Document Paths
//!
//! Managed documents are recorded as `docsdir://<file>` so the repository
//! can be moved without rewriting metadata. Documents linked in place (when
//! `import_copy` is off) are recorded as absolute paths and are never deleted
//! by the store.
//!
//! ## Missing Targets
//!
//! Destructive operations take an [`OnMissing`] policy. Only a genuinely
//! absent target is ever ignored; permission and disk errors always surface.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsContentStore`]: Production, plain files under `pubsdir`.
//! - [`mem_backend::MemContentStore`]: For testing logic without filesystem I/O.

pub mod backend;
pub mod fs_backend;
pub mod mem_backend;

pub use backend::ContentStore;

/// Prefix marking a document path as relative to the managed documents directory.
pub const DOCSDIR_PREFIX: &str = "docsdir://";

/// What a destructive operation does when its target does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnMissing {
    /// Treat an absent target as already done.
    Ignore,
    /// Report an absent target as [`PubsError::NotFound`](crate::error::PubsError::NotFound).
    Fail,
}

/// How a document enters the managed documents directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Copy the source, leaving it in place.
    Copy,
    /// Copy the source, then delete it.
    Move,
}

/// Whether `docpath` points inside the managed documents directory.
pub fn in_docsdir(docpath: &str) -> bool {
    docpath.starts_with(DOCSDIR_PREFIX)
}

/// File name of a managed document for `citekey`, keeping the source extension.
pub(crate) fn doc_filename(citekey: &str, source: &std::path::Path) -> String {
    match source.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}.{}", citekey, ext),
        _ => citekey.to_string(),
    }
}
