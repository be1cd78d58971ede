use crate::error::Result;
use common::model::template::{FieldsConfig, Template};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub fn insert(conn: &Connection, name: &str, file_path: &str, fields: &FieldsConfig) -> Result<i64> {
    conn.execute(
        "INSERT INTO templates (name, file_path, fields_config) VALUES (?1, ?2, ?3)",
        params![name, file_path, fields.to_json()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update(
    conn: &Connection,
    id: i64,
    name: &str,
    file_path: &str,
    fields: &FieldsConfig,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE templates SET name = ?1, file_path = ?2, fields_config = ?3 WHERE id = ?4",
        params![name, file_path, fields.to_json(), id],
    )?;
    Ok(affected > 0)
}

pub fn list(conn: &Connection) -> Result<Vec<Template>> {
    let mut stmt = conn.prepare("SELECT id, name, file_path, fields_config FROM templates ORDER BY id")?;
    let rows = stmt
        .query_map([], row_to_template)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Template>> {
    let template = conn
        .query_row(
            "SELECT id, name, file_path, fields_config FROM templates WHERE id = ?1",
            params![id],
            row_to_template,
        )
        .optional()?;
    Ok(template)
}

/// Id of the template with this exact name, if any.
pub fn find_id_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row("SELECT id FROM templates WHERE name = ?1", params![name], |row| row.get(0))
        .optional()?;
    Ok(id)
}

/// Id of a template whose image lives at `file_path`, if any.
pub fn find_id_by_file_path(conn: &Connection, file_path: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM templates WHERE file_path = ?1 LIMIT 1",
            params![file_path],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM templates WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

fn row_to_template(row: &Row) -> rusqlite::Result<Template> {
    let id: i64 = row.get(0)?;
    let raw: Option<String> = row.get(3)?;
    let fields_config = match raw.as_deref().map(FieldsConfig::from_json) {
        None => FieldsConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            warn!("Stored fields_config of template {id} is not valid, treating it as empty: {e}");
            FieldsConfig::default()
        }
    };
    Ok(Template {
        id,
        name: row.get(1)?,
        file_path: row.get(2)?,
        fields_config,
    })
}
