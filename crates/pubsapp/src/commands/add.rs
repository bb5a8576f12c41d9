use crate::bibtex::parser::parse_bibtex;
use crate::bibtex::BibEntry;
use crate::citekey;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PubsError, Result};
use crate::model::{Metadata, Paper};
use crate::repo::Repository;
use crate::store::ContentStore;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Use this citekey instead of deriving one. It must be free.
    pub citekey: Option<String>,
    pub tags: Vec<String>,
    pub docfile: Option<PathBuf>,
    /// Copy the document in (`Some(true)`), link it (`Some(false)`), or follow config.
    pub copy: Option<bool>,
}

/// Add the single entry in `bibtex` as a new paper.
///
/// Without an explicit citekey, the key written in the BibTeX is used if it
/// is valid, else one is generated from author and year; either way it gets
/// a letter suffix if already taken.
pub fn run<S: ContentStore>(
    repo: &mut Repository<S>,
    bibtex: &str,
    options: AddOptions,
) -> Result<CmdResult> {
    let bibdata = parse_bibtex(bibtex)?;
    if bibdata.len() != 1 {
        return Err(PubsError::Bibdata(format!(
            "expected exactly one entry, found {} (use `pubs import` for several)",
            bibdata.len()
        )));
    }
    let (source_key, entry) = bibdata
        .iter()
        .next()
        .map(|(k, e)| (k.to_string(), e.clone()))
        .ok_or_else(|| PubsError::Bibdata("no entry found".to_string()))?;

    let key = match options.citekey {
        Some(key) => key,
        None => repo.unique_citekey(&base_citekey(&source_key, &entry))?,
    };

    let mut paper = Paper::new(&key, entry, Metadata::default());
    for tag in options.tags {
        paper.add_tag(tag);
    }
    repo.push(&mut paper, false, true)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Added paper [{}]", key)));

    if let Some(docfile) = options.docfile {
        match repo.push_doc(&key, &docfile, options.copy) {
            Ok(updated) => paper = updated,
            Err(e) => result.add_message(CmdMessage::warning(format!(
                "Paper added, but document {} could not be attached: {}",
                docfile.display(),
                e
            ))),
        }
    }

    result.affected_papers.push(paper);
    Ok(result)
}

/// The key an entry would like to have, before uniqueness is enforced.
pub(crate) fn base_citekey(source_key: &str, entry: &BibEntry) -> String {
    if citekey::validate(source_key).is_ok() {
        source_key.to_string()
    } else {
        citekey::generate_citekey(entry)
    }
}
