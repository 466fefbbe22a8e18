//! Spreadsheet audit trail module
//!
//! Best-effort persistence of every conversation turn to an external
//! spreadsheet. Failures here are logged operationally and never surfaced to
//! the user-facing request path.

pub mod credentials;
pub mod logger;
pub mod sheets;

pub use credentials::ServiceAccountKey;
pub use logger::AuditLogger;
pub use sheets::SheetsClient;

use crate::errors::Result;

/// Write-once audit row; appended externally, never read back
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub session_id: String,
    /// ISO-8601 UTC timestamp
    pub timestamp: String,
    pub query: String,
    pub response: String,
}

/// Opaque audit sink boundary
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record to the sink
    async fn append(&self, record: &AuditRecord) -> Result<()>;
}
