//! Delete command implementation.

use super::open_raw;
use std::path::Path;
use tracing::info;

/// Runs the delete command. Deleting a missing key succeeds.
pub async fn run(root: &Path, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Deleting {:?} from {:?}", key, root);
    // The codec is irrelevant for removal.
    open_raw(root).delete(key).await?;
    Ok(())
}
