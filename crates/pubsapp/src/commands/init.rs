use crate::commands::{CmdMessage, CmdResult};
use crate::config::PubsConfig;
use crate::error::Result;
use crate::store::fs_backend::FsContentStore;
use std::path::Path;

/// Create the repository skeleton at `config.pubsdir()`, and write the
/// configuration to `config_path` if no file exists there yet.
pub fn run(config: &PubsConfig, config_path: Option<&Path>) -> Result<CmdResult> {
    let root = config.pubsdir();
    let store = FsContentStore::new(&root);
    let mut result = CmdResult::default();

    if store.is_initialized() {
        result.add_message(CmdMessage::warning(format!(
            "Repository already exists at {}",
            root.display()
        )));
    } else {
        store.init()?;
        result.add_message(CmdMessage::success(format!(
            "Initialized pubs repository at {}",
            root.display()
        )));
    }

    if let Some(path) = config_path {
        if !path.exists() {
            config.save(path)?;
            result.add_message(CmdMessage::info(format!(
                "Configuration written to {}",
                path.display()
            )));
        }
    }
    Ok(result)
}
