use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::Paper;
use crate::repo::Repository;
use crate::store::ContentStore;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Papers must carry every one of these tags.
    pub tags: Vec<String>,
    /// Case-insensitive substring over citekey, author, title and year.
    pub query: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, paper: &Paper) -> bool {
        if !self.tags.iter().all(|t| paper.tags().contains(t)) {
            return false;
        }
        let Some(query) = self.query.as_deref() else {
            return true;
        };
        let query = query.to_lowercase();
        let entry = paper.bibentry();
        std::iter::once(paper.citekey())
            .chain(entry.author())
            .chain(entry.title())
            .chain(entry.year())
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// List matching papers, oldest first. Papers that fail to load are
/// reported and skipped.
pub fn run<S: ContentStore>(repo: &mut Repository<S>, filter: &ListFilter) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let mut papers = Vec::new();

    for loaded in repo.all_papers()? {
        match loaded {
            Ok(paper) if filter.matches(&paper) => papers.push(paper),
            Ok(_) => {}
            Err(e) => result.add_message(CmdMessage::warning(format!("Skipped a paper: {}", e))),
        }
    }

    papers.sort_by(|a, b| {
        a.added()
            .cmp(&b.added())
            .then_with(|| a.citekey().cmp(b.citekey()))
    });
    Ok(result.with_listed_papers(papers))
}
