//! Progress store database schema.

/// SQL to create the progress table.
pub const CREATE_PROGRESS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS progress_entries (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";
