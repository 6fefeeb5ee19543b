use chrono::Local;
use codeops_protocol::{LogEntry, LogLevel};
use serde::{Deserialize, Serialize};

/// Append-only, user-visible log of the session.
///
/// Never read by control logic. Every entry is mirrored to `tracing`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogStream {
    entries: Vec<LogEntry>,
}

impl LogStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info | LogLevel::Success => tracing::info!("{}", message),
            LogLevel::Warning => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
        self.entries.push(LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            level,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order_and_levels() {
        let mut logs = LogStream::new();
        logs.info("Cloning repository: x");
        logs.success("Cloned 3 files from o/r");
        logs.error("boom");

        let levels: Vec<_> = logs.iter().map(|e| e.level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Info, LogLevel::Success, LogLevel::Error]
        );
        assert_eq!(logs.last().unwrap().message, "boom");
        // HH:MM:SS
        assert_eq!(logs.entries()[0].timestamp.len(), 8);
    }

    #[test]
    fn test_serializes_as_array() {
        let mut logs = LogStream::new();
        logs.warning("careful");
        let json = serde_json::to_value(&logs).unwrap();
        assert_eq!(json[0]["level"], "warning");
        assert_eq!(json[0]["message"], "careful");
    }
}
