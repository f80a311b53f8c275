//! File helpers shared by the persisted memory files.

use rage_core::RageResult;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Replace `path` with `bytes` by writing a sibling temp file and renaming it
/// over the target, so readers never observe a half-written file.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> RageResult<()> {
    let tmp = temp_path(path);
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
