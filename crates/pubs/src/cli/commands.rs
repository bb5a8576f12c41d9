//! # CLI Layer
//!
//! Parses arguments, loads configuration, installs logging, opens the
//! repository and dispatches to [`PubsApi`]. Handlers return the
//! [`CmdResult`] they got back; `run` prints it and turns error-level
//! messages into a failing exit status.

use super::render;
use super::setup::{copy_mode, Cli, Commands, DocCommands, NoteCommands};
use anyhow::{bail, Context, Result};
use clap::Parser;
use pubsapp::api::{AddOptions, ExportFormat, ImportOptions, ListFilter, OnCollision, PubsApi};
use pubsapp::commands::{self, CmdMessage, CmdResult};
use pubsapp::config::PubsConfig;
use pubsapp::logging::init_logging;
use pubsapp::store::fs_backend::FsContentStore;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().or_else(PubsConfig::default_path);
    let config = match config_path.as_deref() {
        Some(path) => PubsConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PubsConfig::from_env().context("loading config from environment")?,
    };
    debug!(pubsdir = %config.pubsdir().display(), "configuration loaded");

    // Naked `pubs` lists the library.
    let command = cli.command.unwrap_or(Commands::List {
        query: None,
        tags: Vec::new(),
        json: false,
    });

    let result = dispatch(&config, config_path.as_deref(), command)?;
    print_result(&result);
    if result.has_errors() {
        bail!("some operations failed");
    }
    Ok(())
}

fn open(config: &PubsConfig) -> Result<PubsApi<FsContentStore>> {
    Ok(PubsApi::open(config)?)
}

fn dispatch(config: &PubsConfig, config_path: Option<&Path>, command: Commands) -> Result<CmdResult> {
    let result = match command {
        Commands::Init => commands::init::run(config, config_path)?,
        Commands::Add {
            bibfile,
            citekey,
            tags,
            docfile,
            link,
            copy,
        } => {
            let bibtex = read_input(bibfile.as_deref())?;
            let options = AddOptions {
                citekey,
                tags,
                docfile,
                copy: copy_mode(copy, link),
            };
            open(config)?.add(&bibtex, options)?
        }
        Commands::Import {
            bibfiles,
            tags,
            rename_collisions,
        } => {
            let on_collision = if rename_collisions {
                OnCollision::Rename
            } else {
                OnCollision::Skip
            };
            let mut api = open(config)?;
            let mut merged = CmdResult::default();
            for bibfile in bibfiles {
                let bibtex = read_input(Some(&bibfile))?;
                let options = ImportOptions {
                    tags: tags.clone(),
                    on_collision,
                };
                let result = api
                    .import(&bibtex, options)
                    .with_context(|| format!("importing {}", bibfile.display()))?;
                merged.affected_papers.extend(result.affected_papers);
                merged.messages.extend(result.messages);
            }
            merged
        }
        Commands::List { query, tags, json } => {
            let mut result = open(config)?.list(&ListFilter { tags, query })?;
            if json {
                let papers = std::mem::take(&mut result.listed_papers);
                result.output = Some(render::render_json(&papers)?);
            }
            result
        }
        Commands::Remove {
            citekeys,
            keep_docs,
        } => open(config)?.remove(citekeys.as_slice(), keep_docs)?,
        Commands::Rename { old, new } => open(config)?.rename(&old, &new)?,
        Commands::Tag {
            citekeys,
            add,
            remove,
        } => {
            let mut api = open(config)?;
            if citekeys.is_empty() {
                api.all_tags()?
            } else if add.is_empty() && remove.is_empty() {
                bail!("nothing to do: give --add or --remove");
            } else {
                let mut result = CmdResult::default();
                if !add.is_empty() {
                    result
                        .messages
                        .extend(api.add_tags(citekeys.as_slice(), &add)?.messages);
                }
                if !remove.is_empty() {
                    result
                        .messages
                        .extend(api.remove_tags(citekeys.as_slice(), &remove)?.messages);
                }
                result
            }
        }
        Commands::Doc { action } => {
            let mut api = open(config)?;
            match action {
                DocCommands::Add {
                    citekey,
                    file,
                    link,
                    copy,
                } => api.attach_doc(&citekey, &file, copy_mode(copy, link))?,
                DocCommands::Remove { citekey } => api.detach_doc(&citekey)?,
                DocCommands::Path { citekey } => api.doc_path(&citekey)?,
            }
        }
        Commands::Note { action } => {
            let mut api = open(config)?;
            match action {
                NoteCommands::Show { citekey } => api.read_note(&citekey)?,
                NoteCommands::Write { citekey, text } => {
                    let text = match text {
                        Some(text) => text,
                        None => read_input(None)?,
                    };
                    api.write_note(&citekey, &text)?
                }
                NoteCommands::Path { citekey } => api.note_path(&citekey)?,
            }
        }
        Commands::Export {
            citekeys,
            output,
            format,
        } => {
            let format: ExportFormat = format.parse()?;
            let mut result = open(config)?.export(citekeys.as_slice(), format)?;
            if let Some(path) = output {
                let text = result.output.take().unwrap_or_default();
                fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
                result.add_message(CmdMessage::success(format!(
                    "Exported to {}",
                    path.display()
                )));
            }
            result
        }
        Commands::Doctor { fix } => open(config)?.doctor(fix)?,
    };
    Ok(result)
}

/// Contents of `path`, or of stdin when `path` is missing or `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn print_result(result: &CmdResult) {
    if let Some(output) = &result.output {
        print!("{}", output);
    }
    print!("{}", render::render_paper_list(&result.listed_papers));
    print!("{}", render::render_paths(&result.paths));
    print!("{}", render::render_tags(&result.tags));
    print!("{}", render::render_messages(&result.messages));
}
