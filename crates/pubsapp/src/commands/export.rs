use crate::bibtex::formatter::{format_bibdata, format_yaml};
use crate::bibtex::BibData;
use crate::commands::CmdResult;
use crate::error::{PubsError, Result};
use crate::repo::Repository;
use crate::store::ContentStore;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Bibtex,
    Yaml,
}

impl FromStr for ExportFormat {
    type Err = PubsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bibtex" | "bib" => Ok(ExportFormat::Bibtex),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(PubsError::Api(format!(
                "invalid output format: {} (expected bibtex or yaml)",
                other
            ))),
        }
    }
}

/// Render papers as one document: the named ones, or every paper when
/// `citekeys` is empty.
pub fn run<S: ContentStore>(
    repo: &mut Repository<S>,
    citekeys: &[String],
    format: ExportFormat,
) -> Result<CmdResult> {
    let papers = if citekeys.is_empty() {
        repo.all_papers()?.collect::<Result<Vec<_>>>()?
    } else {
        citekeys
            .iter()
            .map(|key| repo.pull(key))
            .collect::<Result<Vec<_>>>()?
    };

    let bibdata: BibData = papers
        .iter()
        .map(|p| (p.citekey().to_string(), p.bibentry().clone()))
        .collect();
    let output = match format {
        ExportFormat::Bibtex => format_bibdata(&bibdata),
        ExportFormat::Yaml => format_yaml(&bibdata)?,
    };
    Ok(CmdResult::default().with_output(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bibtex::parser::parse_bibtex;
    use crate::bibtex::BibEntry;
    use crate::error::PubsError;
    use crate::model::{Metadata, Paper};
    use crate::store::mem_backend::MemContentStore;

    fn repo() -> Repository<MemContentStore> {
        let mut repo = Repository::new(MemContentStore::new());
        for (key, title) in [("a", "Alpha"), ("b", "Beta")] {
            let mut entry = BibEntry::new("article");
            entry.add_field("title", title);
            let mut paper = Paper::new(key, entry, Metadata::default());
            repo.push(&mut paper, false, false).unwrap();
        }
        repo
    }

    #[test]
    fn exports_everything_by_default() {
        let mut repo = repo();
        let output = run(&mut repo, &[], ExportFormat::Bibtex).unwrap().output.unwrap();

        let parsed = parse_bibtex(&output).unwrap();
        assert_eq!(parsed.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(parsed["b"].title(), Some("Beta"));
    }

    #[test]
    fn exports_selection_in_given_order() {
        let mut repo = repo();
        let output = run(&mut repo, &["b".to_string()], ExportFormat::Bibtex)
            .unwrap()
            .output
            .unwrap();
        assert!(output.starts_with("@article{b,"));
        assert!(!output.contains("Alpha"));
    }

    #[test]
    fn unknown_key_fails() {
        let mut repo = repo();
        assert!(matches!(
            run(&mut repo, &["zzz".to_string()], ExportFormat::Bibtex).unwrap_err(),
            PubsError::InvalidReference(_)
        ));
    }

    #[test]
    fn exports_yaml() {
        let mut repo = repo();
        let output = run(&mut repo, &["a".to_string()], ExportFormat::Yaml)
            .unwrap()
            .output
            .unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(value["a"]["type"].as_str(), Some("article"));
        assert_eq!(value["a"]["title"].as_str(), Some("Alpha"));
        assert!(value.get("b").is_none());
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("bibtex".parse::<ExportFormat>().unwrap(), ExportFormat::Bibtex);
        assert_eq!("YAML".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!(matches!(
            "ris".parse::<ExportFormat>().unwrap_err(),
            PubsError::Api(ref m) if m.contains("invalid output format: ris")
        ));
    }

    #[test]
    fn empty_repository_exports_nothing() {
        let mut repo = Repository::new(MemContentStore::new());
        let result = run(&mut repo, &[], ExportFormat::Bibtex).unwrap();
        assert_eq!(result.output.as_deref(), Some(""));
    }
}
