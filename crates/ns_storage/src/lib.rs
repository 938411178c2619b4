use std::path::Path;
use std::sync::Arc;

use ns_core::{Error, ReportStorage, Result};
use tracing::info;

pub mod backends;

pub use backends::*;

pub trait StorageBackend: ReportStorage {
    /// Short human-readable name used in startup logs.
    fn describe(&self) -> String;
}

/// Builds the named backend; `output_dir` only matters for `file`.
pub fn create_storage(kind: &str, output_dir: &Path) -> Result<Arc<dyn ReportStorage>> {
    let storage: Arc<dyn ReportStorage> = match kind {
        "file" => {
            let storage = FileStorage::new(FileConfig::in_dir(output_dir));
            info!("🏦 Storage backend ready (using {})", storage.describe());
            Arc::new(storage)
        }
        "memory" => {
            let storage = MemoryStorage::new();
            info!("🏦 Storage backend ready (using {})", storage.describe());
            Arc::new(storage)
        }
        other => {
            return Err(Error::Config(format!(
                "unknown storage '{}'. Available storages: file, memory",
                other
            )))
        }
    };
    Ok(storage)
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_storage, StorageBackend};
}
