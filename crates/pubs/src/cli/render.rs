//! Turns `CmdResult` pieces into terminal text.
//!
//! Rendering is pure: every function returns a `String` and the caller
//! prints it. Colors come from `console`, which disables them by itself when
//! stdout is not a terminal.

use chrono::{DateTime, Utc};
use console::style;
use pubsapp::commands::{CmdMessage, MessageLevel};
use pubsapp::model::Paper;
use serde::Serialize;
use std::path::PathBuf;
use unicode_width::UnicodeWidthStr;

const TITLE_WIDTH: usize = 60;

pub fn render_messages(messages: &[CmdMessage]) -> String {
    messages
        .iter()
        .map(|m| match m.level {
            MessageLevel::Info => m.content.clone(),
            MessageLevel::Success => format!("{} {}", style("✓").green(), m.content),
            MessageLevel::Warning => format!("{} {}", style("!").yellow().bold(), m.content),
            MessageLevel::Error => format!("{} {}", style("✗").red().bold(), m.content),
        })
        .map(|line| line + "\n")
        .collect()
}

/// One line per paper, citekeys padded to a common display width.
pub fn render_paper_list(papers: &[Paper]) -> String {
    let key_width = papers
        .iter()
        .map(|p| p.citekey().width())
        .max()
        .unwrap_or(0);
    let now = Utc::now();

    papers
        .iter()
        .map(|p| render_paper_line(p, key_width, now) + "\n")
        .collect()
}

fn render_paper_line(paper: &Paper, key_width: usize, now: DateTime<Utc>) -> String {
    let entry = paper.bibentry();
    let citekey = paper.citekey();
    let padding = " ".repeat(key_width.saturating_sub(citekey.width()));

    let mut line = format!("[{}]{} ", style(citekey).cyan(), padding);
    if let Some(author) = entry.author() {
        line.push_str(&first_author(author));
        line.push(' ');
    }
    if let Some(year) = entry.year() {
        line.push_str(&format!("({}) ", year));
    }
    if let Some(title) = entry.title() {
        line.push_str(&format!("\"{}\"", truncate(&strip_braces(title), TITLE_WIDTH)));
    }
    if !paper.tags().is_empty() {
        let tags: Vec<String> = paper.tags().iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!(" {}", style(tags.join(" ")).magenta()));
    }
    if paper.docpath().is_some() {
        line.push_str(&format!(" {}", style("[doc]").dim()));
    }
    if let Some(added) = paper.added() {
        line.push_str(&format!(" {}", style(format_added(added, now)).dim()));
    }
    line.trim_end().to_string()
}

/// "Smith" for one author, "Smith et al." for more.
fn first_author(authors: &str) -> String {
    let mut names = authors.split(" and ");
    let first = names.next().unwrap_or("").trim();
    let last_name = match first.split_once(',') {
        Some((last, _)) => last.trim(),
        None => first.split_whitespace().last().unwrap_or(first),
    };
    let last_name = strip_braces(last_name);
    if names.next().is_some() {
        format!("{} et al.", last_name)
    } else {
        last_name
    }
}

fn strip_braces(s: &str) -> String {
    s.chars().filter(|c| *c != '{' && *c != '}').collect()
}

/// Cut `s` to at most `max` display columns, marking the cut with "…".
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

fn format_added(added: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now
        .signed_duration_since(added)
        .to_std()
        .unwrap_or_default();
    let mut formatter = timeago::Formatter::new();
    formatter.num_items(1);
    formatter.convert(elapsed)
}

pub fn render_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("{}\n", p.display()))
        .collect()
}

pub fn render_tags(tags: &[String]) -> String {
    tags.iter().map(|t| format!("{}\n", t)).collect()
}

/// Flat view of a paper for `--json` output.
#[derive(Serialize)]
struct PaperJson<'a> {
    citekey: &'a str,
    entry_type: &'a str,
    fields: std::collections::BTreeMap<&'a str, &'a str>,
    tags: Vec<&'a str>,
    docfile: Option<&'a str>,
    added: Option<DateTime<Utc>>,
    notes: bool,
}

impl<'a> From<&'a Paper> for PaperJson<'a> {
    fn from(paper: &'a Paper) -> Self {
        let entry = paper.bibentry();
        Self {
            citekey: paper.citekey(),
            entry_type: &entry.entry_type,
            fields: entry
                .fields
                .iter()
                .map(|f| (f.key.as_str(), f.value.as_str()))
                .collect(),
            tags: paper.tags().iter().map(String::as_str).collect(),
            docfile: paper.docpath(),
            added: paper.added(),
            notes: paper.metadata().notes,
        }
    }
}

pub fn render_json(papers: &[Paper]) -> serde_json::Result<String> {
    let view: Vec<PaperJson> = papers.iter().map(PaperJson::from).collect();
    serde_json::to_string_pretty(&view).map(|s| s + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pubsapp::bibtex::BibEntry;
    use pubsapp::model::Metadata;

    fn paper(key: &str, author: &str, tags: &[&str]) -> Paper {
        let mut entry = BibEntry::new("article");
        entry.add_field("author", author);
        entry.add_field("title", "On {Computable} Numbers");
        entry.add_field("year", "1936");
        let mut p = Paper::new(key, entry, Metadata::default());
        for t in tags {
            p.add_tag(*t);
        }
        p
    }

    #[test]
    fn test_render_messages_levels() {
        console::set_colors_enabled(false);
        let out = render_messages(&[
            CmdMessage::info("plain"),
            CmdMessage::success("done"),
            CmdMessage::warning("careful"),
            CmdMessage::error("broken"),
        ]);
        assert_eq!(out, "plain\n✓ done\n! careful\n✗ broken\n");
    }

    #[test]
    fn test_paper_list_aligns_citekeys() {
        console::set_colors_enabled(false);
        let out = render_paper_list(&[
            paper("turing1936", "Turing, Alan", &[]),
            paper("ü", "Gödel, Kurt", &["logic"]),
        ]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "[turing1936] Turing (1936) \"On Computable Numbers\""
        );
        assert_eq!(
            lines[1],
            "[ü]          Gödel (1936) \"On Computable Numbers\" #logic"
        );
    }

    #[test]
    fn test_first_author() {
        assert_eq!(first_author("Church, Alonzo"), "Church");
        assert_eq!(first_author("Alonzo Church and Alan Turing"), "Church et al.");
        assert_eq!(first_author("{von Neumann}, John"), "von Neumann");
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("日本語テキスト", 7), "日本語…");
    }

    #[test]
    fn test_format_added_is_relative() {
        let now = Utc::now();
        assert_eq!(format_added(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_added(now - Duration::hours(1), now), "1 hour ago");
    }

    #[test]
    fn test_render_json() {
        let mut p = paper("turing1936", "Turing, Alan", &["cs"]);
        p.set_docpath(Some("docsdir://turing1936.pdf".to_string()));
        let json = render_json(&[p]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["citekey"], "turing1936");
        assert_eq!(value[0]["fields"]["year"], "1936");
        assert_eq!(value[0]["tags"][0], "cs");
        assert_eq!(value[0]["docfile"], "docsdir://turing1936.pdf");
        assert_eq!(value[0]["added"], serde_json::Value::Null);
    }
}
