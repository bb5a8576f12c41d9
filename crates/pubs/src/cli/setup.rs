use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "pubs",
    bin_name = "pubs",
    version = get_version(),
    disable_help_subcommand = true
)]
#[command(about = "Your bibliography on the command line, kept in plain files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: pubs.toml in the OS config directory)
    #[arg(short, long, global = true, env = "PUBS_CONFIG", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the repository
    #[command(display_order = 1)]
    Init,

    /// Add a paper from a BibTeX entry
    #[command(display_order = 2)]
    Add {
        /// BibTeX file with one entry (stdin if missing or "-")
        bibfile: Option<PathBuf>,

        /// Citekey to use instead of the one in the entry
        #[arg(short = 'k', long)]
        citekey: Option<String>,

        /// Tag to apply (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Document to attach
        #[arg(short, long)]
        docfile: Option<PathBuf>,

        /// Record the document's path instead of copying it in
        #[arg(long, conflicts_with = "copy")]
        link: bool,

        /// Copy the document in, whatever the config says
        #[arg(long)]
        copy: bool,
    },

    /// Add every entry of one or more BibTeX files
    #[command(display_order = 3)]
    Import {
        #[arg(required = true, num_args = 1..)]
        bibfiles: Vec<PathBuf>,

        /// Tag to apply to every imported paper (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Import colliding entries under a suffixed citekey instead of skipping them
        #[arg(long)]
        rename_collisions: bool,
    },

    /// List papers
    #[command(alias = "ls", display_order = 4)]
    List {
        /// Match citekey, author, title or year (case-insensitive)
        query: Option<String>,

        /// Only papers with this tag (repeatable, all must match)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Print papers as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove papers
    #[command(alias = "rm", display_order = 5)]
    Remove {
        #[arg(required = true, num_args = 1..)]
        citekeys: Vec<String>,

        /// Keep the documents and notes of removed papers. A paper added later
        /// under the same citekey finds the kept note again.
        #[arg(long)]
        keep_docs: bool,
    },

    /// Change the citekey of a paper
    #[command(alias = "mv", display_order = 6)]
    Rename { old: String, new: String },

    /// Add or remove tags; with no citekey, list all tags
    #[command(display_order = 7)]
    Tag {
        citekeys: Vec<String>,

        /// Tag to add (repeatable)
        #[arg(short, long)]
        add: Vec<String>,

        /// Tag to remove (repeatable)
        #[arg(short, long)]
        remove: Vec<String>,
    },

    /// Manage the document attached to a paper
    #[command(display_order = 8)]
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },

    /// Read or write the note of a paper
    #[command(display_order = 9)]
    Note {
        #[command(subcommand)]
        action: NoteCommands,
    },

    /// Print papers as BibTeX (all papers if no citekey given)
    #[command(display_order = 10)]
    Export {
        citekeys: Vec<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: bibtex or yaml
        #[arg(short = 'f', long = "bib-format", default_value = "bibtex")]
        format: String,
    },

    /// Check the repository for inconsistencies
    #[command(display_order = 11)]
    Doctor {
        /// Repair what can be repaired
        #[arg(long)]
        fix: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Attach a document, replacing any previous one
    Add {
        citekey: String,
        file: PathBuf,

        /// Record the document's path instead of copying it in
        #[arg(long, conflicts_with = "copy")]
        link: bool,

        /// Copy the document in, whatever the config says
        #[arg(long)]
        copy: bool,
    },

    /// Detach the document (managed copies are deleted)
    #[command(alias = "rm")]
    Remove { citekey: String },

    /// Print the document's location
    Path { citekey: String },
}

#[derive(Subcommand, Debug)]
pub enum NoteCommands {
    /// Print the note
    Show { citekey: String },

    /// Replace the note with TEXT (stdin if missing)
    Write { citekey: String, text: Option<String> },

    /// Print the note file's location
    Path { citekey: String },
}

/// `--copy`/`--link` as the tri-state the API expects.
pub fn copy_mode(copy: bool, link: bool) -> Option<bool> {
    match (copy, link) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
