use super::backend::ContentStore;
use super::{doc_filename, in_docsdir, OnMissing, Transfer, DOCSDIR_PREFIX};
use crate::bibtex::{BibCodec, BibData, BibtexCodec};
use crate::error::{PubsError, Result};
use crate::model::Metadata;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const BIB_DIR: &str = "bib";
const META_DIR: &str = "meta";
const DOC_DIR: &str = "doc";
const NOTES_DIR: &str = "notes";
const META_EXT: &str = ".yaml";

/// Plain-file content store rooted at `pubsdir`.
pub struct FsContentStore {
    root: PathBuf,
    note_ext: String,
    codec: Box<dyn BibCodec>,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            note_ext: ".txt".to_string(),
            codec: Box::new(BibtexCodec),
        }
    }

    pub fn with_note_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.note_ext = ext.to_string();
        } else {
            self.note_ext = format!(".{}", ext);
        }
        self
    }

    pub fn with_codec(mut self, codec: Box<dyn BibCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the directory skeleton. Existing directories are left untouched.
    pub fn init(&self) -> Result<()> {
        for dir in [BIB_DIR, META_DIR, DOC_DIR, NOTES_DIR] {
            ensure_dir(&self.root.join(dir))?;
        }
        Ok(())
    }

    /// Whether the directory skeleton exists.
    pub fn is_initialized(&self) -> bool {
        self.root.join(BIB_DIR).is_dir() && self.root.join(META_DIR).is_dir()
    }

    fn bib_path(&self, citekey: &str) -> PathBuf {
        self.root
            .join(BIB_DIR)
            .join(format!("{}{}", citekey, self.codec.extension()))
    }

    fn meta_path(&self, citekey: &str) -> PathBuf {
        self.root
            .join(META_DIR)
            .join(format!("{}{}", citekey, META_EXT))
    }

    fn docs_dir(&self) -> PathBuf {
        self.root.join(DOC_DIR)
    }

    fn list_stems(&self, dir: &str, ext: &str) -> Result<BTreeSet<String>> {
        let dir = self.root.join(dir);
        if !dir.exists() {
            return Ok(BTreeSet::new());
        }

        let mut keys = BTreeSet::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
                if let Some(stem) = name.strip_suffix(ext) {
                    if !stem.is_empty() {
                        keys.insert(stem.to_string());
                    }
                }
            }
        }
        Ok(keys)
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Map an I/O error on `path` to `NotFound` when that is what it means.
fn io_error(e: io::Error, path: &Path) -> PubsError {
    if e.kind() == io::ErrorKind::NotFound {
        PubsError::NotFound(path.to_path_buf())
    } else {
        PubsError::Io(e)
    }
}

/// Temp file + rename, so readers never see a partial write.
fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| PubsError::Store(format!("no parent for {}", target.display())))?;
    ensure_dir(dir)?;

    let tmp = dir.join(format!(".pubs-{}.tmp", Uuid::new_v4()));
    if let Err(e) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(PubsError::Io(e));
    }
    fs::rename(&tmp, target)?;
    Ok(())
}

/// Stream `source` into `target` through a temp file. Both handles are
/// dropped before the rename, on success and failure alike.
fn copy_atomic(source: &Path, target: &Path) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| PubsError::Store(format!("no parent for {}", target.display())))?;
    ensure_dir(dir)?;

    let tmp = dir.join(format!(".pubs-{}.tmp", Uuid::new_v4()));
    let copied: io::Result<()> = (|| {
        let mut reader = File::open(source)?;
        let mut writer = File::create(&tmp)?;
        io::copy(&mut reader, &mut writer)?;
        writer.sync_all()
    })();

    if let Err(e) = copied {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(e, source));
    }
    fs::rename(&tmp, target)?;
    Ok(())
}

fn remove_file(path: &Path, on_missing: OnMissing) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && on_missing == OnMissing::Ignore => {
            Ok(())
        }
        Err(e) => Err(io_error(e, path)),
    }
}

impl ContentStore for FsContentStore {
    fn exists(&self, citekey: &str, meta_check: bool) -> Result<bool> {
        let bib = self.bib_path(citekey).is_file();
        let meta = self.meta_path(citekey).is_file();
        Ok(if meta_check { bib && meta } else { bib || meta })
    }

    fn pull_bibdata(&self, citekey: &str) -> Result<BibData> {
        let path = self.bib_path(citekey);
        let text = fs::read_to_string(&path).map_err(|e| io_error(e, &path))?;
        self.codec.decode(&text)
    }

    fn pull_metadata(&self, citekey: &str) -> Result<Metadata> {
        let path = self.meta_path(citekey);
        let text = fs::read_to_string(&path).map_err(|e| io_error(e, &path))?;
        if text.trim().is_empty() {
            return Ok(Metadata::default());
        }
        Ok(serde_yaml::from_str(&text)?)
    }

    fn push_bibdata(&self, citekey: &str, data: &BibData) -> Result<()> {
        write_atomic(&self.bib_path(citekey), self.codec.encode(data).as_bytes())
    }

    fn push_metadata(&self, citekey: &str, metadata: &Metadata) -> Result<()> {
        let yaml = serde_yaml::to_string(metadata)?;
        write_atomic(&self.meta_path(citekey), yaml.as_bytes())
    }

    fn remove(&self, citekey: &str) -> Result<()> {
        remove_file(&self.bib_path(citekey), OnMissing::Ignore)?;
        remove_file(&self.meta_path(citekey), OnMissing::Ignore)
    }

    fn bib_citekeys(&self) -> Result<BTreeSet<String>> {
        self.list_stems(BIB_DIR, self.codec.extension())
    }

    fn meta_citekeys(&self) -> Result<BTreeSet<String>> {
        self.list_stems(META_DIR, META_EXT)
    }

    fn add_doc(
        &self,
        citekey: &str,
        source: &Path,
        transfer: Transfer,
        overwrite: bool,
    ) -> Result<String> {
        let name = doc_filename(citekey, source);
        let target = self.docs_dir().join(&name);
        if !overwrite && target.exists() {
            return Err(PubsError::AlreadyExists(target));
        }

        copy_atomic(source, &target)?;
        if transfer == Transfer::Move {
            fs::remove_file(source).map_err(|e| io_error(e, source))?;
        }
        debug!(citekey, target = %target.display(), "document added");
        Ok(format!("{}{}", DOCSDIR_PREFIX, name))
    }

    fn real_docpath(&self, docpath: &str) -> PathBuf {
        match docpath.strip_prefix(DOCSDIR_PREFIX) {
            Some(name) => self.docs_dir().join(name),
            None => PathBuf::from(docpath),
        }
    }

    fn rename_doc(&self, docpath: &str, new_citekey: &str) -> Result<String> {
        if !in_docsdir(docpath) {
            return Err(PubsError::Store(format!(
                "{} is not a managed document",
                docpath
            )));
        }
        let old = self.real_docpath(docpath);
        if !old.exists() {
            return Err(PubsError::NotFound(old));
        }
        let name = doc_filename(new_citekey, &old);
        let new = self.docs_dir().join(&name);
        if new.exists() {
            return Err(PubsError::AlreadyExists(new));
        }
        fs::rename(&old, &new)?;
        Ok(format!("{}{}", DOCSDIR_PREFIX, name))
    }

    fn remove_doc(&self, docpath: &str, on_missing: OnMissing) -> Result<()> {
        if !in_docsdir(docpath) {
            debug!(docpath, "leaving unmanaged document in place");
            return Ok(());
        }
        remove_file(&self.real_docpath(docpath), on_missing)
    }

    fn managed_docs(&self) -> Result<BTreeSet<String>> {
        let dir = self.docs_dir();
        if !dir.exists() {
            return Ok(BTreeSet::new());
        }
        let mut docs = BTreeSet::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if path.is_file() && !name.starts_with('.') {
                    docs.insert(format!("{}{}", DOCSDIR_PREFIX, name));
                }
            }
        }
        Ok(docs)
    }

    fn note_path(&self, citekey: &str) -> PathBuf {
        self.root
            .join(NOTES_DIR)
            .join(format!("{}{}", citekey, self.note_ext))
    }

    fn pull_note(&self, citekey: &str) -> Result<Option<String>> {
        let path = self.note_path(citekey);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PubsError::Io(e)),
        }
    }

    fn push_note(&self, citekey: &str, text: &str) -> Result<()> {
        write_atomic(&self.note_path(citekey), text.as_bytes())
    }

    fn rename_note(
        &self,
        old_citekey: &str,
        new_citekey: &str,
        on_missing: OnMissing,
    ) -> Result<()> {
        let old = self.note_path(old_citekey);
        let new = self.note_path(new_citekey);
        if new.exists() {
            return Err(PubsError::AlreadyExists(new));
        }
        match fs::rename(&old, &new) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound && on_missing == OnMissing::Ignore => {
                Ok(())
            }
            Err(e) => Err(io_error(e, &old)),
        }
    }

    fn remove_note(&self, citekey: &str, on_missing: OnMissing) -> Result<()> {
        remove_file(&self.note_path(citekey), on_missing)
    }
}
