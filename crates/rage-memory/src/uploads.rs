use rage_core::{RageError, RageResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// File extensions accepted as context uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["txt", "md", "json"];

/// Raw storage for uploaded context files.
///
/// Files are written verbatim; nothing here embeds or indexes them.
#[derive(Debug, Clone)]
pub struct ContextUploads {
    dir: PathBuf,
}

impl ContextUploads {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reject names [`save`](Self::save) would refuse, without writing.
    pub fn check_name(&self, file_name: &str) -> RageResult<()> {
        validate_name(file_name)
    }

    /// Store `bytes` under `file_name`, replacing any previous upload of the
    /// same name.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> RageResult<PathBuf> {
        validate_name(file_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        info!(file = %file_name, bytes = bytes.len(), "Stored context upload");
        Ok(path)
    }

    /// Stored uploads sorted by file name. A missing directory lists as empty.
    pub async fn list(&self) -> RageResult<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && has_allowed_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

fn validate_name(file_name: &str) -> RageResult<()> {
    let plain = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == file_name);
    if file_name.is_empty() || !plain || file_name.contains(['/', '\\']) || file_name == ".." {
        return Err(RageError::InvalidInput(format!(
            "Upload name '{}' must be a plain file name",
            file_name
        )));
    }
    if !has_allowed_extension(Path::new(file_name)) {
        return Err(RageError::InvalidInput(format!(
            "Upload '{}' must be one of: {}",
            file_name,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(())
}

fn has_allowed_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_writes_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().join("context"));

        let path = uploads.save("notes.md", b"# Title\n\nbody").await.unwrap();
        assert_eq!(path, tmp.path().join("context").join("notes.md"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"# Title\n\nbody");
    }

    #[tokio::test]
    async fn test_save_overwrites_same_name() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().to_path_buf());

        uploads.save("a.txt", b"one").await.unwrap();
        let path = uploads.save("a.txt", b"two").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().to_path_buf());
        assert!(uploads.save("script.sh", b"rm -rf /").await.is_err());
        assert!(uploads.save("noext", b"x").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_path_components() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().join("context"));
        for name in ["../escape.txt", "sub/dir.md", "..\\win.json", "", ".."] {
            assert!(uploads.save(name, b"x").await.is_err(), "{name} accepted");
        }
    }

    #[test]
    fn test_check_name_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().join("context"));
        assert!(uploads.check_name("notes.txt").is_ok());
        assert!(uploads.check_name("../notes.txt").is_err());
        assert!(uploads.check_name("notes.pdf").is_err());
        assert!(!uploads.dir().exists());
    }

    #[tokio::test]
    async fn test_extension_is_case_insensitive() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().to_path_buf());
        assert!(uploads.save("README.MD", b"x").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_sorted_and_missing_dir_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let uploads = ContextUploads::new(tmp.path().join("context"));
        assert!(uploads.list().await.unwrap().is_empty());

        uploads.save("b.json", b"{}").await.unwrap();
        uploads.save("a.txt", b"x").await.unwrap();

        let names: Vec<String> = uploads
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.json"]);
    }
}
