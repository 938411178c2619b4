use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ns_core::storage::to_document;
use ns_core::{ComparativeReport, ReportStorage, Result};
use tracing::{debug, info};

use crate::StorageBackend;

pub const REPORT_FILE: &str = "final_summary.json";
pub const AUDIO_FILE: &str = "hindi_summary.mp3";

#[derive(Debug, Clone, PartialEq)]
pub struct FileConfig {
    pub report_path: PathBuf,
    pub audio_path: PathBuf,
}

impl FileConfig {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            report_path: dir.join(REPORT_FILE),
            audio_path: dir.join(AUDIO_FILE),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from(REPORT_FILE),
            audio_path: PathBuf::from(AUDIO_FILE),
        }
    }
}

/// Keeps the latest report and audio at two fixed paths, overwriting them on
/// every request.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config: FileConfig,
}

impl FileStorage {
    pub fn new(config: FileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

impl StorageBackend for FileStorage {
    fn describe(&self) -> String {
        format!("file ({})", self.config.report_path.display())
    }
}

#[async_trait]
impl ReportStorage for FileStorage {
    fn audio_location(&self) -> String {
        self.config.audio_path.display().to_string()
    }

    async fn store_report(&self, report: &ComparativeReport) -> Result<()> {
        let document = to_document(report)?;
        write_file(&self.config.report_path, &document).await?;
        info!("💾 Report written to {}", self.config.report_path.display());
        Ok(())
    }

    async fn load_report(&self) -> Result<Option<Vec<u8>>> {
        read_optional(&self.config.report_path).await
    }

    async fn store_audio(&self, audio: &[u8]) -> Result<()> {
        write_file(&self.config.audio_path, audio).await?;
        info!("💾 Audio content written to {}", self.config.audio_path.display());
        Ok(())
    }

    async fn load_audio(&self) -> Result<Option<Vec<u8>>> {
        read_optional(&self.config.audio_path).await
    }

    async fn clear_audio(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.config.audio_path).await {
            Ok(()) => {
                debug!("🧹 Removed stale audio at {}", self.config.audio_path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
