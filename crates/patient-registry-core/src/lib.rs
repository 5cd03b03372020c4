//! Patient Registry Core Library
//!
//! Validation and persistence layer for a registry of patient records keyed
//! by national or foreign-resident identity document.
//!
//! # Architecture
//!
//! ```text
//! raw input (document, name, surname, YYYY-MM-DD)
//!          │
//!          ▼
//!   identity::parse_document ── mod-23 check letter
//!          │
//!          ▼
//!   PatientRecord::new ─────── ValidationError
//!          │
//!          ▼
//!   PatientRepository<'db> ─── DuplicateKey / Storage
//!          │
//!          ▼
//!   Database (SQLite, `patients` table)
//! ```
//!
//! # Modules
//!
//! - [`identity`]: Identity document shape and checksum validation
//! - [`models`]: `PatientRecord` and input validation
//! - [`db`]: SQLite connection, schema and patient repository
//! - [`export`]: Roster export (JSON, CSV, listing)
//! - [`config`]: Environment-driven configuration
//! - [`logging`]: Rotating file logs

pub mod config;
pub mod db;
pub mod export;
pub mod identity;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use config::{ConfigError, RegistryConfig};
pub use db::{Database, DbError, PatientRepository, RepoResult, RepositoryError};
pub use export::RosterExport;
pub use identity::{is_valid_document, parse_document, DocumentKind, ValidatedDocument};
pub use logging::{init_logging, LoggingError};
pub use models::{PatientRecord, ValidationError};
