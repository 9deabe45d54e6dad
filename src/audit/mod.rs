//! Audit logging for Dompet
//!
//! Records every create, update and delete with before/after values in an
//! append-only audit log.
//!
//! - `AuditEntry`: a single log entry with timestamp, operation, entity
//!   information and optional before/after values.
//! - `AuditLogger`: appends entries to the log file as line-delimited JSON.
//! - `generate_diff`: builds a human-readable summary of changed fields.
//!
//! # Example
//!
//! ```rust,ignore
//! use dompet::audit::{AuditEntry, AuditLogger, EntityType};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! let entry = AuditEntry::create(
//!     EntityType::Goal,
//!     goal.id.to_string(),
//!     Some(goal.name.clone()),
//!     &goal,
//! );
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
