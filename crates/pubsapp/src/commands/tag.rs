use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PubsError, Result};
use crate::model::Paper;
use crate::repo::Repository;
use crate::store::ContentStore;

/// Tags are free-form words; whitespace and commas are reserved for the CLI.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(PubsError::Api("tag cannot be empty".to_string()));
    }
    if tag.chars().any(|c| c.is_whitespace() || c == ',') {
        return Err(PubsError::Api(format!(
            "invalid tag '{}': no spaces or commas allowed",
            tag
        )));
    }
    Ok(())
}

/// Add `tags` to each paper. Papers that already had them are untouched.
pub fn add<S: ContentStore>(
    repo: &mut Repository<S>,
    citekeys: &[String],
    tags: &[String],
) -> Result<CmdResult> {
    edit(repo, citekeys, tags, |paper, tag| paper.add_tag(tag))
}

/// Remove `tags` from each paper.
pub fn remove<S: ContentStore>(
    repo: &mut Repository<S>,
    citekeys: &[String],
    tags: &[String],
) -> Result<CmdResult> {
    edit(repo, citekeys, tags, |paper, tag| paper.remove_tag(tag))
}

fn edit<S, F>(
    repo: &mut Repository<S>,
    citekeys: &[String],
    tags: &[String],
    apply: F,
) -> Result<CmdResult>
where
    S: ContentStore,
    F: Fn(&mut Paper, &str) -> bool,
{
    for tag in tags {
        validate_tag(tag)?;
    }
    let papers = citekeys
        .iter()
        .map(|key| repo.pull(key))
        .collect::<Result<Vec<_>>>()?;

    let mut result = CmdResult::default();
    for mut paper in papers {
        let mut changed = false;
        for tag in tags {
            changed |= apply(&mut paper, tag.as_str());
        }
        if changed {
            repo.push(&mut paper, true, false)?;
            result.affected_papers.push(paper);
        } else {
            result.add_message(CmdMessage::info(format!(
                "[{}] unchanged",
                paper.citekey()
            )));
        }
    }
    if !result.affected_papers.is_empty() {
        result.add_message(CmdMessage::success(format!(
            "Updated tags of {} paper(s)",
            result.affected_papers.len()
        )));
    }
    Ok(result)
}

/// Every tag in use, sorted.
pub fn list_all<S: ContentStore>(repo: &mut Repository<S>) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    result.tags = repo.all_tags()?.into_iter().collect();
    Ok(result)
}
