//! Fire-and-forget audit logging

use std::sync::Arc;

use chrono::SecondsFormat;
use chrono::Utc;
use tracing::debug;
use tracing::warn;

use crate::audit::AuditRecord;
use crate::audit::AuditSink;
use crate::audit::SheetsClient;
use crate::config::AppConfig;

/// Logger dispatching audit rows to a sink in the background.
///
/// `log_turn` never blocks the request path and never reports failure to its
/// caller; a failed append is recorded in the operational log only.
pub struct AuditLogger {
    sink: Option<Arc<dyn AuditSink>>,
}

impl AuditLogger {
    /// Create a logger over the given sink
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Create a disabled logger; every turn is dropped with a debug log
    #[must_use]
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Build a logger from the application config. When audit logging is
    /// enabled but misconfigured the logger degrades to disabled with a
    /// warning instead of failing startup.
    pub fn from_config(config: &AppConfig) -> Self {
        if !config.audit.enabled {
            return Self::disabled();
        }

        match SheetsClient::from_config(&config.audit) {
            Ok(client) => Self::new(Arc::new(client)),
            Err(e) => {
                warn!("Audit logging disabled: {}", e);
                Self::disabled()
            }
        }
    }

    /// Append one conversation turn to the audit trail, best-effort
    pub fn log_turn(&self, session_id: &str, query: &str, response: &str) {
        let Some(sink) = self.sink.clone() else {
            debug!("Audit logging disabled, dropping turn");
            return;
        };

        let record = AuditRecord {
            session_id: session_id.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            query: query.to_string(),
            response: response.to_string(),
        };

        tokio::spawn(async move {
            if let Err(e) = sink.append(&record).await {
                warn!("Failed to append audit record: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::GuideChatError;
    use crate::errors::Result;

    struct CountingSink {
        appended: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AuditSink for CountingSink {
        async fn append(&self, record: &AuditRecord) -> Result<()> {
            assert!(!record.timestamp.is_empty());
            self.appended.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _record: &AuditRecord) -> Result<()> {
            Err(GuideChatError::Audit("sheet unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_log_turn_reaches_sink() {
        let appended = Arc::new(AtomicUsize::new(0));
        let logger = AuditLogger::new(Arc::new(CountingSink {
            appended: appended.clone(),
        }));

        logger.log_turn("session-1", "q", "a");

        // The append runs on a spawned task; yield until it lands
        for _ in 0..50 {
            if appended.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(appended.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_turn_swallows_sink_failure() {
        let logger = AuditLogger::new(Arc::new(FailingSink));

        // Must not panic or propagate anything
        logger.log_turn("session-1", "q", "a");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_disabled_logger_is_a_no_op() {
        let logger = AuditLogger::disabled();
        logger.log_turn("session-1", "q", "a");
    }
}
