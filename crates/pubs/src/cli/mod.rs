//! # CLI Behavior
//!
//! One possible client of `pubsapp`. This is the only place that knows about
//! stdin, stdout, stderr and exit codes.
//!
//! ## Input
//!
//! BibTeX for `add` comes from a file argument, or from stdin when the
//! argument is missing or `-`. Note text for `note write` likewise.
//!
//! ## Output
//!
//! Command messages are printed to stdout with a colored level marker.
//! `list --json` prints the papers as JSON instead. `export` and `note show`
//! print their text unmodified so they can be piped.
//!
//! ## Configuration
//!
//! `--config` (or `PUBS_CONFIG`) selects the config file; otherwise the OS
//! config directory is used. `PUBS_DIR` overrides the repository location.

mod commands;
mod render;
mod setup;

pub use commands::run;
