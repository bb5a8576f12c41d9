//! # Command Layer
//!
//! Each command lives in its own submodule and is a plain function over a
//! [`Repository`](crate::repo::Repository). Commands hold the business logic
//! of pubs: they take Rust values, return a structured [`CmdResult`], and
//! never print, prompt or exit.
//!
//! ## Structured Returns
//!
//! [`CmdResult`] carries:
//! - `affected_papers`: papers created or modified by the command
//! - `listed_papers`: papers to display
//! - `paths`: filesystem paths (document and note locations)
//! - `tags`: tag names (for `tag --list`)
//! - `output`: raw text meant for stdout verbatim (exported BibTeX, note text)
//! - `messages`: leveled messages for the user
//!
//! The CLI decides how to render all of it.
//!
//! ## Testing Strategy
//!
//! Command tests run against [`MemContentStore`](crate::store::mem_backend::MemContentStore),
//! except `init` which needs a real directory.
//!
//! ## Command Modules
//!
//! - [`init`]: Create the repository skeleton
//! - [`add`]: Add one paper from BibTeX text
//! - [`import`]: Add every entry of a BibTeX file
//! - [`remove`]: Remove papers
//! - [`rename`]: Change the citekey of a paper
//! - [`list`]: Filter and list papers
//! - [`tag`]: Add, remove and list tags
//! - [`doc`]: Attach, detach and locate documents
//! - [`note`]: Read, write and locate notes
//! - [`export`]: Render papers as BibTeX
//! - [`doctor`]: Check and repair store consistency

use crate::model::Paper;
use serde::Serialize;
use std::path::PathBuf;

pub mod add;
pub mod doc;
pub mod doctor;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod note;
pub mod remove;
pub mod rename;
pub mod tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub affected_papers: Vec<Paper>,
    pub listed_papers: Vec<Paper>,
    pub paths: Vec<PathBuf>,
    pub tags: Vec<String>,
    pub output: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_papers(mut self, papers: Vec<Paper>) -> Self {
        self.affected_papers = papers;
        self
    }

    pub fn with_listed_papers(mut self, papers: Vec<Paper>) -> Self {
        self.listed_papers = papers;
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Whether any message was at error level.
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}
