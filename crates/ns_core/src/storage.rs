use async_trait::async_trait;
use serde::Serialize;

use crate::types::ComparativeReport;
use crate::Result;

/// Holds the most recent report document and its audio rendition.
#[async_trait]
pub trait ReportStorage: Send + Sync {
    /// Where the audio artifact lives; recorded in the report's `Audio` field.
    fn audio_location(&self) -> String;

    /// Replace the stored report document.
    async fn store_report(&self, report: &ComparativeReport) -> Result<()>;

    /// The stored report document exactly as persisted.
    async fn load_report(&self) -> Result<Option<Vec<u8>>>;

    async fn store_audio(&self, audio: &[u8]) -> Result<()>;

    async fn load_audio(&self) -> Result<Option<Vec<u8>>>;

    /// Drop any audio left over from an earlier request.
    async fn clear_audio(&self) -> Result<()>;
}

/// Renders a report as UTF-8 JSON with four-space indentation. Non-ASCII text
/// is written literally.
pub fn to_document(report: &ComparativeReport) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut serializer)?;
    Ok(buf)
}
