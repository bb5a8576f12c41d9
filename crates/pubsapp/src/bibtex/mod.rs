//! # Bibliographic Codec
//!
//! The repository treats bibliographic records as opaque structured values
//! ([`BibData`]: citekey → [`BibEntry`]). Turning them into text and back is
//! the job of a [`BibCodec`], so the on-disk format can be swapped without
//! touching the store or repository logic.
//!
//! [`BibtexCodec`] is the default and the format of `bib/<citekey>.bib` files.

pub mod entry;
pub mod formatter;
pub mod parser;

pub use entry::{BibData, BibEntry, BibField};

use crate::error::Result;

/// Text (de)serialization of bibliographic records.
pub trait BibCodec {
    /// File extension used for stored records, with leading dot.
    fn extension(&self) -> &str;

    fn decode(&self, text: &str) -> Result<BibData>;

    fn encode(&self, data: &BibData) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BibtexCodec;

impl BibCodec for BibtexCodec {
    fn extension(&self) -> &str {
        ".bib"
    }

    fn decode(&self, text: &str) -> Result<BibData> {
        parser::parse_bibtex(text)
    }

    fn encode(&self, data: &BibData) -> String {
        formatter::format_bibdata(data)
    }
}
