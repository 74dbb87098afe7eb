//! Audit logging for protocol events
//!
//! Structured JSON-lines records of session lifecycle changes and dropped
//! traffic, for compliance review and forensics. Operational logging stays
//! on `tracing`; this file is the durable record.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;

/// Audit event type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// Accounting session started
    SessionStart,
    /// Accounting session stopped and removed
    SessionStop,
    /// Interim update applied to a live session
    InterimUpdate,
    /// Accounting-Request carried no usable session identity
    MissingSessionIdentity,
    /// Retransmitted request suppressed
    DuplicateSuppressed,
    /// Datagram dropped during parsing
    MalformedPacket,
    /// Server started
    ServerStart,
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Timestamp (Unix epoch seconds)
    pub timestamp: u64,
    /// ISO 8601 formatted timestamp
    pub timestamp_iso: String,
    /// Event type
    pub event_type: AuditEventType,
    /// Session id (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// NAS key the session is scoped to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nas: Option<String>,
    /// Username (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Source address of the datagram
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    /// Request identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<u8>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Server version
    pub server_version: String,
}

impl AuditEntry {
    /// Create a new audit entry
    pub fn new(event_type: AuditEventType) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let timestamp = now.as_secs();
        let timestamp_iso = chrono::DateTime::from_timestamp(timestamp as i64, 0)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        AuditEntry {
            timestamp,
            timestamp_iso,
            event_type,
            session_id: None,
            nas: None,
            username: None,
            peer: None,
            identifier: None,
            details: None,
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Set session id
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set NAS key
    pub fn with_nas(mut self, nas: impl Into<String>) -> Self {
        self.nas = Some(nas.into());
        self
    }

    /// Set username
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set source address
    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer.to_string());
        self
    }

    /// Set request identifier
    pub fn with_identifier(mut self, identifier: u8) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Set details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Audit logger
///
/// Appends one JSON object per line. Writes happen inline on the datagram
/// path; the lock is held only for the single `writeln!`.
pub struct AuditLogger {
    /// File path for audit log
    file_path: Option<String>,
    /// File handle
    file: Option<Mutex<File>>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(file_path: Option<String>) -> std::io::Result<Self> {
        let file = if let Some(ref path) = file_path {
            let f = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Mutex::new(f))
        } else {
            None
        };

        Ok(AuditLogger { file_path, file })
    }

    /// A logger that records nothing
    pub fn disabled() -> Self {
        AuditLogger {
            file_path: None,
            file: None,
        }
    }

    /// Log an audit entry
    pub fn log(&self, entry: AuditEntry) {
        if let Some(ref file) = self.file {
            match serde_json::to_string(&entry) {
                Ok(json) => match file.lock() {
                    Ok(mut f) => {
                        if let Err(e) = writeln!(f, "{}", json) {
                            error!("Failed to write audit log: {}", e);
                        }
                    }
                    Err(_) => error!("Audit log lock poisoned"),
                },
                Err(e) => {
                    error!("Failed to serialize audit entry: {}", e);
                }
            }
        }
    }

    /// Check if audit logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Get the audit log file path
    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }
}
