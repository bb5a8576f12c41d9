use crate::citekey::CitekeyError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PubsError {
    #[error("Invalid citekey '{citekey}': {reason}")]
    InvalidCitekey {
        citekey: String,
        reason: CitekeyError,
    },

    #[error("Citekey already in use: {0}")]
    CiteKeyCollision(String),

    #[error("Citekey not found: {0}")]
    InvalidReference(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("File already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid bibliographic data: {0}")]
    Bibdata(String),

    #[error("BibTeX parse error at line {line}: {message}")]
    BibParse { line: u32, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Metadata error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl PubsError {
    pub fn invalid_citekey(citekey: &str, reason: CitekeyError) -> Self {
        PubsError::InvalidCitekey {
            citekey: citekey.to_string(),
            reason,
        }
    }

    /// True for errors that mean "the thing is not there", as opposed to a
    /// failure to reach it.
    pub fn is_not_found(&self) -> bool {
        match self {
            PubsError::NotFound(_) | PubsError::InvalidReference(_) => true,
            PubsError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PubsError>;
