//! Get command implementation.

use super::{open_json, open_raw, Mode};
use std::path::Path;
use tracing::info;

/// Runs the get command, returning the printable value if the key exists.
pub async fn run(
    root: &Path,
    mode: Mode,
    key: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    info!("Reading {:?} from {:?}", key, root);

    let output = match mode {
        Mode::Json => match open_json(root).get(key).await? {
            Some(value) => Some(serde_json::to_string_pretty(&value)?),
            None => None,
        },
        Mode::Raw => open_raw(root).get(key).await?,
    };
    Ok(output)
}
