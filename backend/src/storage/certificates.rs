use crate::error::Result;
use common::model::certificate::{Certificate, CertificateListing};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub fn insert(conn: &Connection, participant_id: i64, template_id: i64, generated_file_path: &str) -> Result<i64> {
    conn.execute(
        "INSERT INTO certificates (participant_id, template_id, generated_file_path) VALUES (?1, ?2, ?3)",
        params![participant_id, template_id, generated_file_path],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Certificate>> {
    let certificate = conn
        .query_row(
            "SELECT id, participant_id, template_id, generated_file_path, created_at FROM certificates WHERE id = ?1",
            params![id],
            row_to_certificate,
        )
        .optional()?;
    Ok(certificate)
}

pub fn for_participant(conn: &Connection, participant_id: i64) -> Result<Vec<Certificate>> {
    let mut stmt = conn.prepare(
        "SELECT id, participant_id, template_id, generated_file_path, created_at FROM certificates WHERE participant_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![participant_id], row_to_certificate)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn count_for_template(conn: &Connection, template_id: i64) -> Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM certificates WHERE template_id = ?1",
        params![template_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// All certificates with their participant and template names, newest first.
pub fn list(conn: &Connection) -> Result<Vec<CertificateListing>> {
    let mut stmt = conn.prepare(
        r"
        SELECT c.id, p.name, t.name, c.generated_file_path, c.created_at
        FROM certificates c
        JOIN participants p ON c.participant_id = p.id
        JOIN templates t ON c.template_id = t.id
        ORDER BY c.created_at DESC, c.id DESC
        ",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CertificateListing {
                id: row.get(0)?,
                participant_name: row.get(1)?,
                template_name: row.get(2)?,
                generated_file_path: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM certificates WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

fn row_to_certificate(row: &Row) -> rusqlite::Result<Certificate> {
    Ok(Certificate {
        id: row.get(0)?,
        participant_id: row.get(1)?,
        template_id: row.get(2)?,
        generated_file_path: row.get(3)?,
        created_at: row.get(4)?,
    })
}
