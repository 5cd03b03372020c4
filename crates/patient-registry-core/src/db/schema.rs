//! SQLite schema definition.

/// Patient registry schema. Safe to run against an existing database.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    document TEXT PRIMARY KEY NOT NULL,          -- raw identity document, as entered
    name TEXT NOT NULL,
    surname TEXT NOT NULL,
    birth_date TEXT NOT NULL,                    -- YYYY-MM-DD
    hospitalization_count INTEGER NOT NULL DEFAULT 0
        CHECK (hospitalization_count >= 0)
);
"#;
