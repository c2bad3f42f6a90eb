//! Delivery into a local directory, one file per position.

use std::path::{Path, PathBuf};

use qsync_core::{Artifact, SinkError};

/// Writes artifact `n` to `<dir>/<n:05>.md`, and its assets (when it has
/// any) to `<dir>/<n:05>.assets.json`.
///
/// The delivered count is the number of position files present, so a
/// cleared directory restarts delivery from zero.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, position: u64) -> PathBuf {
        self.dir.join(format!("{position:05}.md"))
    }

    pub fn assets_path(&self, position: u64) -> PathBuf {
        self.dir.join(format!("{position:05}.assets.json"))
    }

    pub async fn deliver(&self, position: u64, artifact: &Artifact) -> Result<(), SinkError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SinkError::Io(format!("{}: {e}", self.dir.display())))?;

        let path = self.artifact_path(position);
        tokio::fs::write(&path, artifact.text.as_bytes())
            .await
            .map_err(|e| SinkError::Io(format!("{}: {e}", path.display())))?;

        let assets = self.assets_path(position);
        if artifact.assets.is_empty() {
            match tokio::fs::remove_file(&assets).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SinkError::Io(format!("{}: {e}", assets.display()))),
            }
        } else {
            let json = serde_json::to_vec_pretty(&artifact.assets)
                .map_err(|e| SinkError::Rejected(e.to_string()))?;
            tokio::fs::write(&assets, json)
                .await
                .map_err(|e| SinkError::Io(format!("{}: {e}", assets.display())))?;
        }

        tracing::debug!(
            target: "qsync.upload",
            path = %path.display(),
            assets = artifact.assets.len(),
            "Wrote artifact"
        );
        Ok(())
    }

    pub async fn delivered_count(&self) -> Result<u64, SinkError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(SinkError::Io(format!("{}: {e}", self.dir.display()))),
        };

        let mut count = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SinkError::Io(e.to_string()))?
        {
            if is_position_file(&entry.path()) {
                count += 1;
            }
        }
        Ok(count)
    }
}

fn is_position_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(text: &str) -> Artifact {
        Artifact::new(text)
    }

    #[tokio::test]
    async fn test_missing_directory_counts_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("not-yet"));
        assert_eq!(sink.delivered_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deliver_writes_position_files() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path().join("out"));

        let mut with_assets = artifact("two");
        with_assets
            .assets
            .insert("[img#00000000]".to_string(), "a.png".to_string());

        sink.deliver(0, &artifact("one")).await.unwrap();
        sink.deliver(1, &with_assets).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(sink.artifact_path(0)).unwrap(),
            "one"
        );
        assert!(!sink.assets_path(0).exists());
        let assets: serde_json::Value =
            serde_json::from_slice(&std::fs::read(sink.assets_path(1)).unwrap()).unwrap();
        assert_eq!(assets["[img#00000000]"], "a.png");

        std::fs::write(sink.dir().join("notes.md"), "x").unwrap();
        assert_eq!(sink.delivered_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_redelivery_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(tmp.path());

        sink.deliver(0, &artifact("old")).await.unwrap();
        sink.deliver(0, &artifact("new")).await.unwrap();

        assert_eq!(sink.delivered_count().await.unwrap(), 1);
        assert_eq!(
            std::fs::read_to_string(sink.artifact_path(0)).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_position_file_names() {
        assert!(is_position_file(Path::new("/x/00012.md")));
        assert!(!is_position_file(Path::new("/x/00012.assets.json")));
        assert!(!is_position_file(Path::new("/x/README.md")));
    }
}
