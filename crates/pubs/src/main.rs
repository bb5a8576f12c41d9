//! # Pubs CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/pubs/src/cli/)                           │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Config loading, logging, dispatch (commands.rs)          │
//! │  - Terminal and JSON rendering (render.rs)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  pubsapp: PubsApi → commands → Repository → ContentStore    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in `pubsapp` is UI agnostic; reading stdin, printing, colors
//! and exit codes all happen here.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
