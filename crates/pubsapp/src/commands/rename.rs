use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::ContentStore;

pub fn run<S: ContentStore>(
    repo: &mut Repository<S>,
    old_citekey: &str,
    new_citekey: &str,
) -> Result<CmdResult> {
    let mut paper = repo.pull(old_citekey)?;
    repo.rename(&mut paper, new_citekey, old_citekey)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Renamed [{}] to [{}]",
        old_citekey, new_citekey
    )));
    result.affected_papers.push(paper);
    Ok(result)
}
