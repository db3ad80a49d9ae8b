//! Set command implementation.

use super::{open_json, open_raw, Mode};
use std::path::Path;
use tracing::info;

/// Runs the set command.
pub async fn run(
    root: &Path,
    mode: Mode,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Writing {:?} to {:?}", key, root);

    match mode {
        Mode::Json => {
            let parsed: serde_json::Value = serde_json::from_str(value)
                .map_err(|e| format!("value is not valid JSON (use --raw for text): {e}"))?;
            open_json(root).set(key, &parsed).await?;
        }
        Mode::Raw => open_raw(root).set(key, &value.to_string()).await?,
    }
    Ok(())
}
