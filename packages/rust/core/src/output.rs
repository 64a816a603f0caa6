//! Output writing.

use std::path::Path;

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use stylebuild_shared::{Result, StyleBuildError};

/// Write `text` to `path`, creating missing parent directories.
///
/// The text goes to a sibling temp file first and is renamed over `path`, so
/// `path` either keeps its previous contents or holds the complete new text.
pub async fn write_atomic(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StyleBuildError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let temp = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::now_v7()));

    if let Err(e) = fs::write(&temp, text).await {
        let _ = fs::remove_file(&temp).await;
        return Err(StyleBuildError::io(&temp, e));
    }
    if let Err(e) = fs::rename(&temp, path).await {
        let _ = fs::remove_file(&temp).await;
        return Err(StyleBuildError::io(path, e));
    }

    debug!(path = %path.display(), size = text.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sb_output_{}", Uuid::now_v7()))
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let root = temp_root();
        let path = root.join("static/css/site.css");

        write_atomic(&path, ".a{}").await.expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), ".a{}");

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn replaces_existing_file_without_leftovers() {
        let root = temp_root();
        std::fs::create_dir_all(&root).expect("mkdir");
        let path = root.join("site.css");
        std::fs::write(&path, "old contents that are longer").expect("seed");

        write_atomic(&path, "new").await.expect("write");

        assert_eq!(std::fs::read_to_string(&path).expect("read"), "new");
        let entries: Vec<_> = std::fs::read_dir(&root).expect("list").collect();
        assert_eq!(entries.len(), 1);

        let _ = std::fs::remove_dir_all(&root);
    }

    #[tokio::test]
    async fn parent_that_is_a_file_fails() {
        let root = temp_root();
        std::fs::create_dir_all(&root).expect("mkdir");
        std::fs::write(root.join("blocker"), "").expect("seed");

        let err = write_atomic(&root.join("blocker/site.css"), "x").await.unwrap_err();
        assert!(matches!(err, StyleBuildError::Io { .. }));

        let _ = std::fs::remove_dir_all(&root);
    }
}
