use crate::cli::Toggle;
use anyhow::Context;
use std::path::Path;
use storefront_shared::maintenance::flag_file::FlagFile;
use tracing::info;

/// Reports the flag, or sets it when a state is given
pub fn run(file: &Path, key: &str, state: Option<Toggle>) -> anyhow::Result<()> {
    let flag = FlagFile::new(file, key);

    match state {
        None => {
            let enabled = flag
                .read()
                .with_context(|| format!("Failed to read {}", file.display()))?;
            println!("{} is {} in {}", key, on_off(enabled), file.display());
        }
        Some(state) => {
            let enabled = state.as_bool();
            flag.set(enabled)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            info!(file = %file.display(), key, enabled, "Flag updated");
            println!("{} set to {} in {}", key, on_off(enabled), file.display());
            println!("Restart the storefront for the change to take effect");
        }
    }
    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
