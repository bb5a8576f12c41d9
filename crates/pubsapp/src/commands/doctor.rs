use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::repo::Repository;
use crate::store::ContentStore;

pub fn run<S: ContentStore>(repo: &mut Repository<S>, fix: bool) -> Result<CmdResult> {
    let report = repo.doctor(fix)?;
    let mut result = CmdResult::default();

    if report.is_clean() {
        result.add_message(CmdMessage::success("No inconsistencies found."));
        return Ok(result);
    }

    result.add_message(CmdMessage::warning("Inconsistencies found:"));
    for key in &report.bib_without_meta {
        let action = if fix { "metadata recreated" } else { "no metadata" };
        result.add_message(CmdMessage::info(format!("  - [{}] {}", key, action)));
    }
    for key in &report.meta_without_bib {
        let action = if fix {
            "stray metadata removed"
        } else {
            "metadata without record"
        };
        result.add_message(CmdMessage::info(format!("  - [{}] {}", key, action)));
    }
    for key in &report.unreadable {
        result.add_message(CmdMessage::error(format!("  - [{}] cannot be read", key)));
    }
    for key in &report.missing_docs {
        result.add_message(CmdMessage::warning(format!(
            "  - [{}] document is missing",
            key
        )));
    }
    for docpath in &report.orphan_docs {
        result.add_message(CmdMessage::info(format!(
            "  - {} belongs to no paper",
            docpath
        )));
    }

    if fix {
        result.add_message(CmdMessage::success(format!(
            "Fixed {} problem(s).",
            report.fixed
        )));
    } else if !report.bib_without_meta.is_empty() || !report.meta_without_bib.is_empty() {
        result.add_message(CmdMessage::info("Run `pubs doctor --fix` to repair."));
    }
    Ok(result)
}
