use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::ContentStore;

/// Path of the note file, whether or not it exists yet. The paper must exist.
pub fn path<S: ContentStore>(repo: &mut Repository<S>, citekey: &str) -> Result<CmdResult> {
    repo.pull(citekey)?;
    Ok(CmdResult::default().with_paths(vec![repo.note_path(citekey)]))
}

pub fn read<S: ContentStore>(repo: &mut Repository<S>, citekey: &str) -> Result<CmdResult> {
    repo.pull(citekey)?;
    let mut result = CmdResult::default();
    match repo.pull_note(citekey)? {
        Some(text) => result.output = Some(text),
        None => result.add_message(CmdMessage::info(format!("[{}] has no note", citekey))),
    }
    Ok(result)
}

/// Replace the note of a paper with `text`.
pub fn write<S: ContentStore>(
    repo: &mut Repository<S>,
    citekey: &str,
    text: &str,
) -> Result<CmdResult> {
    let paper = repo.push_note(citekey, text)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Note of [{}] saved", citekey)));
    result.paths.push(repo.note_path(citekey));
    result.affected_papers.push(paper);
    Ok(result)
}
