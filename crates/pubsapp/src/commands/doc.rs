use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::ContentStore;
use std::path::Path;

/// Attach `docfile` to a paper, replacing any previous document.
pub fn attach<S: ContentStore>(
    repo: &mut Repository<S>,
    citekey: &str,
    docfile: &Path,
    copy: Option<bool>,
) -> Result<CmdResult> {
    let paper = repo.push_doc(citekey, docfile, copy)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Attached {} to [{}]",
        docfile.display(),
        citekey
    )));
    if let Some(path) = repo.real_docpath(&paper) {
        result.paths.push(path);
    }
    result.affected_papers.push(paper);
    Ok(result)
}

/// Detach the document of a paper. Managed copies are deleted, linked files
/// are left where they are.
pub fn detach<S: ContentStore>(repo: &mut Repository<S>, citekey: &str) -> Result<CmdResult> {
    let had_doc = repo.pull(citekey)?.docpath().is_some();
    let paper = repo.remove_doc(citekey)?;

    let mut result = CmdResult::default();
    if had_doc {
        result.add_message(CmdMessage::success(format!(
            "Removed document of [{}]",
            citekey
        )));
        result.affected_papers.push(paper);
    } else {
        result.add_message(CmdMessage::info(format!("[{}] has no document", citekey)));
    }
    Ok(result)
}

/// Where the document of a paper lives on disk.
pub fn path<S: ContentStore>(repo: &mut Repository<S>, citekey: &str) -> Result<CmdResult> {
    let paper = repo.pull(citekey)?;
    let mut result = CmdResult::default();
    match repo.real_docpath(&paper) {
        Some(path) => result.paths.push(path),
        None => result.add_message(CmdMessage::warning(format!(
            "[{}] has no document",
            citekey
        ))),
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::BibEntry;
    use crate::model::{Metadata, Paper};
    use crate::store::mem_backend::MemContentStore;
    use std::path::PathBuf;

    fn repo_with(key: &str) -> Repository<MemContentStore> {
        let mut repo = Repository::new(MemContentStore::new());
        let mut paper = Paper::new(key, BibEntry::new("misc"), Metadata::default());
        repo.push(&mut paper, false, false).unwrap();
        repo.store().add_external_file("/in/file.pdf", b"%PDF-1.4");
        repo
    }

    #[test]
    fn attach_then_path() {
        let mut repo = repo_with("k");
        let result = attach(&mut repo, "k", Path::new("/in/file.pdf"), Some(true)).unwrap();
        assert_eq!(result.paths, vec![PathBuf::from("memory://doc/k.pdf")]);

        let result = path(&mut repo, "k").unwrap();
        assert_eq!(result.paths, vec![PathBuf::from("memory://doc/k.pdf")]);
    }

    #[test]
    fn path_without_document_warns() {
        let mut repo = repo_with("k");
        let result = path(&mut repo, "k").unwrap();
        assert!(result.paths.is_empty());
        assert!(result.messages[0].content.contains("no document"));
    }

    #[test]
    fn detach_removes_managed_copy() {
        let mut repo = repo_with("k");
        attach(&mut repo, "k", Path::new("/in/file.pdf"), Some(true)).unwrap();

        let result = detach(&mut repo, "k").unwrap();

        assert_eq!(result.affected_papers[0].docpath(), None);
        assert!(repo.store().doc_content("docsdir://k.pdf").is_none());
        assert!(repo.store().has_external_file(Path::new("/in/file.pdf")));
    }

    #[test]
    fn detach_without_document_is_informational() {
        let mut repo = repo_with("k");
        let result = detach(&mut repo, "k").unwrap();
        assert!(result.affected_papers.is_empty());
    }
}
