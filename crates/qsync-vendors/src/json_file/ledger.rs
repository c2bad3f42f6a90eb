//! Sidecar record of acknowledged items and closed batches.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{JsonFileError, JsonFileResult};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Ledger {
    #[serde(default)]
    acknowledged: BTreeSet<String>,
    #[serde(default)]
    closed: Vec<String>,
}

impl Ledger {
    /// Read the ledger at `path`; a missing file is an empty ledger.
    pub async fn load(path: &Path) -> JsonFileResult<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| JsonFileError::Parse(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(JsonFileError::io(path, &e)),
        }
    }

    /// Write the ledger through a temporary file so a crash never leaves it
    /// half written.
    pub async fn persist(&self, path: &Path) -> JsonFileResult<()> {
        let json = serde_json::to_vec_pretty(self)
            .map_err(|e| JsonFileError::Parse(e.to_string()))?;
        let tmp = temp_path(path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| JsonFileError::io(&tmp, &e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| JsonFileError::io(path, &e))
    }

    pub fn is_acknowledged(&self, item_id: &str) -> bool {
        self.acknowledged.contains(item_id)
    }

    /// Returns false when the item was already acknowledged.
    pub fn acknowledge(&mut self, item_id: &str) -> bool {
        self.acknowledged.insert(item_id.to_string())
    }

    pub fn close(&mut self, batch_id: &str) {
        if !self.closed.iter().any(|id| id == batch_id) {
            self.closed.push(batch_id.to_string());
        }
    }

    pub fn acknowledged_count(&self) -> usize {
        self.acknowledged.len()
    }

    pub fn closed(&self) -> &[String] {
        &self.closed
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(&tmp.path().join("none.acks.json")).await.unwrap();
        assert_eq!(ledger, Ledger::default());
    }

    #[tokio::test]
    async fn test_persist_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bank.json.acks.json");

        let mut ledger = Ledger::default();
        assert!(ledger.acknowledge("1"));
        assert!(!ledger.acknowledge("1"));
        ledger.close("b1");
        ledger.close("b1");
        tokio_test::assert_ok!(ledger.persist(&path).await);

        let reloaded = Ledger::load(&path).await.unwrap();
        assert!(reloaded.is_acknowledged("1"));
        assert_eq!(reloaded.acknowledged_count(), 1);
        assert_eq!(reloaded.closed(), ["b1".to_string()]);
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_corrupt_ledger_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("acks.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Ledger::load(&path).await, Err(JsonFileError::Parse(_))));
    }
}
