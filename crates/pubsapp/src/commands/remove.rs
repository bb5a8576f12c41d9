use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::ContentStore;

/// Remove papers. Every citekey is resolved before anything is deleted, so
/// one unknown citekey removes nothing.
///
/// `keep_docs` keeps both the managed document and the note. The note file is
/// keyed by citekey alone, so a paper added later under the same citekey reads
/// the kept note as its own.
pub fn run<S: ContentStore>(
    repo: &mut Repository<S>,
    citekeys: &[String],
    keep_docs: bool,
) -> Result<CmdResult> {
    let papers = citekeys
        .iter()
        .map(|key| repo.pull(key))
        .collect::<Result<Vec<_>>>()?;

    let mut result = CmdResult::default();
    for paper in papers {
        repo.remove(paper.citekey(), !keep_docs, true)?;
        result.add_message(CmdMessage::success(format!(
            "Removed paper [{}]",
            paper.citekey()
        )));
        result.affected_papers.push(paper);
    }
    Ok(result)
}
