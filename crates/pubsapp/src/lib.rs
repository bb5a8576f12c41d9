//! # Pubs Architecture
//!
//! Pubs is a **personal bibliography repository**: one BibTeX record per
//! paper, plus metadata, an optional document and an optional note, all kept
//! as plain files under one directory. This crate is the library; the `pubs`
//! binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (pubs crate)                                           │
//! │  - Parses arguments, renders output, owns stdout/stderr     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs) + Commands (commands/*.rs)                    │
//! │  - Facade and business logic, returning CmdResult           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (repo.rs)                                       │
//! │  - Citekey index, collision checks, write ordering, events  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Content store (store/)                                     │
//! │  - ContentStore trait: FsContentStore, MemContentStore      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No I/O Assumptions in Core
//!
//! Everything in this crate takes Rust values and returns `Result`s. Nothing
//! prints, prompts or exits. Diagnostics go through `tracing`; the binary
//! installs a subscriber with [`logging::init_logging`].
//!
//! ## Testing Strategy
//!
//! - **Repository and commands**: unit tests against `MemContentStore`,
//!   including simulated write failures.
//! - **Filesystem store**: `tests/` integration tests on a temp directory.
//! - **CLI**: end-to-end tests of the binary in the `pubs` crate.
//!
//! ## Module Overview
//!
//! - [`api`]: Facade, the entry point for clients
//! - [`commands`]: Business logic for each command
//! - [`repo`]: The repository state machine
//! - [`store`]: Content store trait and implementations
//! - [`model`]: `Paper` and `Metadata`
//! - [`bibtex`]: BibTeX records and codec
//! - [`citekey`]: Citekey validation and generation
//! - [`events`]: Add/remove/rename notifications
//! - [`config`]: Configuration
//! - [`logging`]: Subscriber setup for binaries
//! - [`error`]: Error types

pub mod api;
pub mod bibtex;
pub mod citekey;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;
