use crate::bibtex::parser::parse_entries;
use crate::commands::add::base_citekey;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{PubsError, Result};
use crate::model::{Metadata, Paper};
use crate::repo::Repository;
use crate::store::ContentStore;
use tracing::debug;

/// What to do with an entry whose citekey is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnCollision {
    /// Leave the existing paper alone and report the entry as skipped.
    #[default]
    Skip,
    /// Import under the first free suffixed citekey.
    Rename,
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub tags: Vec<String>,
    pub on_collision: OnCollision,
}

/// Import every entry of `bibtex`. One bad entry does not stop the rest;
/// each failure becomes an error message. An entry repeating a citekey seen
/// earlier in the same text collides with it like with any stored paper.
pub fn run<S: ContentStore>(
    repo: &mut Repository<S>,
    bibtex: &str,
    options: ImportOptions,
) -> Result<CmdResult> {
    let entries = parse_entries(bibtex)?;
    let mut result = CmdResult::default();
    let mut skipped = 0;

    for (source_key, entry) in &entries {
        let base = base_citekey(source_key, entry);
        let key = match options.on_collision {
            OnCollision::Skip => base,
            OnCollision::Rename => repo.unique_citekey(&base)?,
        };

        let mut paper = Paper::new(&key, entry.clone(), Metadata::default());
        for tag in &options.tags {
            paper.add_tag(tag.clone());
        }

        match repo.push(&mut paper, false, true) {
            Ok(()) => {
                debug!(citekey = %key, "imported");
                result.affected_papers.push(paper);
            }
            Err(PubsError::CiteKeyCollision(_)) => {
                skipped += 1;
                result.add_message(CmdMessage::warning(format!(
                    "Skipped [{}]: citekey already in use",
                    key
                )));
            }
            Err(e) => {
                result.add_message(CmdMessage::error(format!(
                    "Could not import [{}]: {}",
                    source_key, e
                )));
            }
        }
    }

    let imported = result.affected_papers.len();
    let summary = if skipped > 0 {
        format!("Imported {} paper(s), skipped {}", imported, skipped)
    } else {
        format!("Imported {} paper(s)", imported)
    };
    result.add_message(CmdMessage::success(summary));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemContentStore;

    const LIBRARY: &str = r#"
@string{pr = "Physical Review"}

@article{bohr1913, author = {Bohr, Niels}, journal = pr, year = 1913}
@article{dirac1928, author = {Dirac, P. A. M.}, year = 1928}
"#;

    fn repo() -> Repository<MemContentStore> {
        Repository::new(MemContentStore::new())
    }

    #[test]
    fn imports_all_entries() {
        let mut repo = repo();
        let result = run(&mut repo, LIBRARY, ImportOptions::default()).unwrap();

        assert_eq!(result.affected_papers.len(), 2);
        assert_eq!(repo.len().unwrap(), 2);
        assert_eq!(
            repo.pull("bohr1913").unwrap().bibentry().get_field("journal"),
            Some("Physical Review")
        );
    }

    #[test]
    fn skips_collisions_by_default() {
        let mut repo = repo();
        run(&mut repo, LIBRARY, ImportOptions::default()).unwrap();
        let result = run(&mut repo, LIBRARY, ImportOptions::default()).unwrap();

        assert!(result.affected_papers.is_empty());
        assert_eq!(repo.len().unwrap(), 2);
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Imported 0 paper(s), skipped 2"));
    }

    #[test]
    fn renames_collisions_on_request() {
        let mut repo = repo();
        run(&mut repo, LIBRARY, ImportOptions::default()).unwrap();
        let options = ImportOptions {
            on_collision: OnCollision::Rename,
            ..Default::default()
        };
        let result = run(&mut repo, LIBRARY, options).unwrap();

        let keys: Vec<&str> = result.affected_papers.iter().map(|p| p.citekey()).collect();
        assert_eq!(keys, vec!["bohr1913a", "dirac1928a"]);
        assert_eq!(repo.len().unwrap(), 4);
    }

    const DUPLICATES: &str = r#"
@article{smith2020, author = {Smith, Ann}, title = {First}, year = 2020}
@article{smith2020, author = {Smith, Bob}, title = {Second}, year = 2020}
"#;

    #[test]
    fn repeated_key_in_one_file_is_skipped_with_warning() {
        let mut repo = repo();
        let result = run(&mut repo, DUPLICATES, ImportOptions::default()).unwrap();

        assert_eq!(repo.len().unwrap(), 1);
        assert_eq!(
            repo.pull("smith2020").unwrap().bibentry().title(),
            Some("First")
        );
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Skipped [smith2020]: citekey already in use"));
        assert!(result
            .messages
            .iter()
            .any(|m| m.content == "Imported 1 paper(s), skipped 1"));
    }

    #[test]
    fn repeated_key_in_one_file_is_renamed_on_request() {
        let mut repo = repo();
        let options = ImportOptions {
            on_collision: OnCollision::Rename,
            ..Default::default()
        };
        let result = run(&mut repo, DUPLICATES, options).unwrap();

        let keys: Vec<&str> = result.affected_papers.iter().map(|p| p.citekey()).collect();
        assert_eq!(keys, vec!["smith2020", "smith2020a"]);
        assert_eq!(
            repo.pull("smith2020").unwrap().bibentry().title(),
            Some("First")
        );
        assert_eq!(
            repo.pull("smith2020a").unwrap().bibentry().title(),
            Some("Second")
        );
    }

    #[test]
    fn tags_every_entry() {
        let mut repo = repo();
        let options = ImportOptions {
            tags: vec!["quantum".into()],
            ..Default::default()
        };
        run(&mut repo, LIBRARY, options).unwrap();
        assert_eq!(repo.all_tags().unwrap().len(), 1);
        assert!(repo.pull("dirac1928").unwrap().tags().contains("quantum"));
    }

    #[test]
    fn malformed_input_is_an_error() {
        let mut repo = repo();
        assert!(run(&mut repo, "@article{x, title = {unclosed", ImportOptions::default()).is_err());
        assert!(repo.is_empty().unwrap());
    }
}
