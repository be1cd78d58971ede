//! Table definitions and the one in-place migration older databases need.

use crate::error::Result;
use log::info;
use rusqlite::Connection;

/// Statements creating the base schema. Foreign keys are declared for
/// documentation only; [`configure_connection`] switches enforcement off and
/// referential checks are done by the services.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS templates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        file_path TEXT NOT NULL,
        fields_config TEXT
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS participants (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        event TEXT NOT NULL,
        position TEXT,
        date TEXT NOT NULL,
        custom_fields TEXT DEFAULT '{}'
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS certificates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        participant_id INTEGER NOT NULL,
        template_id INTEGER NOT NULL,
        generated_file_path TEXT NOT NULL UNIQUE,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (participant_id) REFERENCES participants(id),
        FOREIGN KEY (template_id) REFERENCES templates(id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_certificates_participant ON certificates(participant_id)",
    "CREATE INDEX IF NOT EXISTS idx_certificates_template ON certificates(template_id)",
];

/// Per-connection settings. Bundled SQLite builds may enable foreign key
/// enforcement by default, so it is turned off explicitly.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "foreign_keys", false)?;
    Ok(())
}

/// Creates missing tables and upgrades databases created before participants
/// had a `custom_fields` column.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    configure_connection(conn)?;
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    // CREATE TABLE IF NOT EXISTS leaves a legacy participants table untouched.
    if !has_column(conn, "participants", "custom_fields")? {
        conn.execute(
            "ALTER TABLE participants ADD COLUMN custom_fields TEXT DEFAULT '{}'",
            [],
        )?;
        info!("Added 'custom_fields' column to 'participants' table");
    }
    Ok(())
}

fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names.iter().any(|name| name == column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert!(has_column(&conn, "participants", "custom_fields").unwrap());
    }

    #[test]
    fn dangling_references_are_accepted() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        initialize_schema(&conn).unwrap();

        let enforced: bool = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert!(!enforced);
        conn.execute(
            "INSERT INTO certificates (participant_id, template_id, generated_file_path) VALUES (41, 42, 'x.png')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn adds_custom_fields_to_legacy_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE participants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                event TEXT NOT NULL,
                position TEXT,
                date TEXT NOT NULL
            );
            INSERT INTO participants (name, event, date) VALUES ('Ada', 'Demo', '2024-01-01');",
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        let custom: String = conn
            .query_row("SELECT custom_fields FROM participants", [], |row| row.get(0))
            .unwrap();
        assert_eq!(custom, "{}");
    }
}
