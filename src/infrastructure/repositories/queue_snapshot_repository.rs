use crate::domain::queue::QueueSnapshot;
use crate::error::AppResult;
use std::path::PathBuf;

/// Keeps a JSON image of the queue on disk between runs.
pub struct QueueSnapshotRepository {
    path: PathBuf,
}

impl QueueSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the last saved snapshot, if there is one
    pub async fn load(&self) -> AppResult<Option<QueueSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot: QueueSnapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    /// Write the snapshot through a temporary file so a crash never leaves a
    /// half-written queue behind
    pub async fn save(&self, snapshot: &QueueSnapshot) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, serde_json::to_vec_pretty(snapshot)?).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            "Queue snapshot saved"
        );
        Ok(())
    }
}
