//! Schema migration
//!
//! Additive only: missing tables and columns are created, nothing is
//! dropped or rewritten. Every table carries `id`, `created_at`,
//! `updated_at` and a nullable `deleted_at` soft-delete marker.

use rusqlite::Connection;
use std::collections::HashSet;

struct TableSpec {
    name: &'static str,
    columns: &'static [(&'static str, &'static str)],
    indexes: &'static [(&'static str, &'static str)],
}

// ADD COLUMN on a populated table needs a constant default for NOT NULL
const AUDIT_COLUMNS: &[(&str, &str)] = &[
    ("created_at", "TEXT NOT NULL DEFAULT '1970-01-01T00:00:00Z'"),
    ("updated_at", "TEXT NOT NULL DEFAULT '1970-01-01T00:00:00Z'"),
    ("deleted_at", "TEXT"),
];

const TABLES: &[TableSpec] = &[
    TableSpec {
        name: "forms",
        columns: &[("title", "TEXT NOT NULL DEFAULT ''")],
        indexes: &[],
    },
    TableSpec {
        name: "form_fields",
        columns: &[
            ("form_id", "INTEGER REFERENCES forms(id)"),
            ("label", "TEXT NOT NULL DEFAULT ''"),
            ("field_type", "TEXT NOT NULL DEFAULT 'text'"),
            ("required", "INTEGER NOT NULL DEFAULT 0"),
            ("options", "TEXT NOT NULL DEFAULT ''"),
        ],
        indexes: &[("idx_form_fields_form_id", "form_id")],
    },
    TableSpec {
        name: "form_submissions",
        columns: &[("form_id", "INTEGER REFERENCES forms(id)")],
        indexes: &[("idx_form_submissions_form_id", "form_id")],
    },
    TableSpec {
        name: "form_field_values",
        columns: &[
            ("form_submission_id", "INTEGER REFERENCES form_submissions(id)"),
            ("form_field_id", "INTEGER REFERENCES form_fields(id)"),
            ("value", "TEXT NOT NULL DEFAULT ''"),
        ],
        indexes: &[("idx_form_field_values_submission_id", "form_submission_id")],
    },
];

impl TableSpec {
    fn all_columns(&self) -> impl Iterator<Item = &'static (&'static str, &'static str)> {
        self.columns.iter().chain(AUDIT_COLUMNS.iter())
    }

    fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .all_columns()
            .map(|(name, decl)| format!("{name} {decl}"))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (id INTEGER PRIMARY KEY AUTOINCREMENT, {})",
            self.name,
            columns.join(", ")
        )
    }
}

/// Bring the database up to the current schema.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    for table in TABLES {
        conn.execute_batch(&table.create_sql())?;

        let existing = existing_columns(conn, table.name)?;
        for (name, decl) in table.all_columns() {
            if !existing.contains(*name) {
                tracing::info!(table = table.name, column = name, "adding missing column");
                conn.execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    table.name, name, decl
                ))?;
            }
        }

        for (index, column) in table.indexes {
            conn.execute_batch(&format!(
                "CREATE INDEX IF NOT EXISTS {index} ON {} ({column})",
                table.name
            ))?;
        }
    }
    Ok(())
}

fn existing_columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<rusqlite::Result<HashSet<_>>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();

        let cols = existing_columns(&conn, "form_fields").unwrap();
        for expected in ["id", "form_id", "label", "field_type", "required", "options", "deleted_at"] {
            assert!(cols.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn test_migrate_adds_missing_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE forms (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT);
             INSERT INTO forms (title) VALUES ('legacy');",
        )
        .unwrap();

        migrate(&conn).unwrap();

        let cols = existing_columns(&conn, "forms").unwrap();
        assert!(cols.contains("created_at"));
        assert!(cols.contains("deleted_at"));

        // existing rows survive
        let title: String = conn
            .query_row("SELECT title FROM forms WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(title, "legacy");
    }
}
