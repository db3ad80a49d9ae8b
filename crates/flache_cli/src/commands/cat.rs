//! Cat command implementation.

use flache_core::{BytesCodec, Cache};
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Streams `[start, end)` of the entry for `key` into `out`.
///
/// Returns the number of bytes written.
pub async fn run(
    root: &Path,
    key: &str,
    start: Option<u64>,
    end: Option<u64>,
    out: &mut impl Write,
) -> Result<u64, Box<dyn std::error::Error>> {
    info!("Streaming {:?} from {:?}", key, root);

    let cache: Cache<BytesCodec> = super::open(root);
    if !cache.contains(key).await? {
        return Err(format!("no entry for key {key:?}").into());
    }

    let handle = cache.open_entry(key).await?;
    let end = end.map(|e| e.min(handle.end()));
    let range = handle.slice(start, end)?;
    debug!(start = range.start(), end = range.end(), "streaming range");

    let mut written = 0u64;
    let mut stream = range.stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    out.flush()?;
    Ok(written)
}
