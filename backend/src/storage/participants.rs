use crate::error::Result;
use common::model::custom_fields::CustomFields;
use common::model::participant::{NewParticipant, Participant};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row};

const COLUMNS: &str = "id, name, email, event, position, date, custom_fields";

pub fn insert(conn: &Connection, participant: &NewParticipant) -> Result<i64> {
    conn.execute(
        "INSERT INTO participants (name, email, event, position, date, custom_fields) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            participant.name,
            participant.email,
            participant.event,
            participant.position,
            participant.date,
            participant.custom_fields.to_json(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Inserts all participants or none of them.
pub fn insert_all(conn: &Connection, participants: &[NewParticipant]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    for participant in participants {
        insert(&tx, participant)?;
    }
    tx.commit()?;
    Ok(participants.len())
}

pub fn list(conn: &Connection) -> Result<Vec<Participant>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM participants ORDER BY name, id"
    ))?;
    let rows = stmt
        .query_map([], row_to_participant)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, id: i64) -> Result<Option<Participant>> {
    let participant = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM participants WHERE id = ?1"),
            params![id],
            row_to_participant,
        )
        .optional()?;
    Ok(participant)
}

/// Deletes the participant row only. Callers remove dependent certificates first.
pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
    let affected = conn.execute("DELETE FROM participants WHERE id = ?1", params![id])?;
    Ok(affected > 0)
}

fn row_to_participant(row: &Row) -> rusqlite::Result<Participant> {
    let id: i64 = row.get(0)?;
    let raw_custom: Option<String> = row.get(6)?;
    let custom_fields = match raw_custom.as_deref().map(CustomFields::from_json) {
        None => CustomFields::new(),
        Some(Ok(fields)) => fields,
        Some(Err(e)) => {
            warn!("Could not decode custom_fields for participant {id}, ignoring them: {e}");
            CustomFields::new()
        }
    };

    Ok(Participant {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        event: row.get(3)?,
        position: row.get(4)?,
        date: row.get(5)?,
        custom_fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::initialize_schema;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    fn new_participant(name: &str) -> NewParticipant {
        NewParticipant {
            name: name.to_string(),
            event: "RustConf".to_string(),
            date: "2024-09-10".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_and_get_with_custom_fields() {
        let conn = conn();
        let mut np = new_participant("Ada");
        np.custom_fields.insert("award", "Best Talk");
        let id = insert(&conn, &np).unwrap();

        let p = get(&conn, id).unwrap().unwrap();
        assert_eq!(p.name, "Ada");
        assert_eq!(p.email, None);
        assert_eq!(p.custom_fields.get("award"), Some("Best Talk"));
    }

    #[test]
    fn list_orders_by_name() {
        let conn = conn();
        insert_all(&conn, &[new_participant("Zoe"), new_participant("Ada")]).unwrap();
        let names: Vec<_> = list(&conn).unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Ada", "Zoe"]);
    }

    #[test]
    fn malformed_custom_fields_read_as_empty() {
        let conn = conn();
        conn.execute(
            "INSERT INTO participants (name, event, date, custom_fields) VALUES ('Bob', 'Demo', '2024-01-01', '{broken')",
            [],
        )
        .unwrap();
        let p = get(&conn, conn.last_insert_rowid()).unwrap().unwrap();
        assert!(p.custom_fields.is_empty());
    }

    #[test]
    fn null_custom_fields_read_as_empty() {
        let conn = conn();
        conn.execute(
            "INSERT INTO participants (name, event, date, custom_fields) VALUES ('Cy', 'Demo', '2024-01-01', NULL)",
            [],
        )
        .unwrap();
        let p = get(&conn, conn.last_insert_rowid()).unwrap().unwrap();
        assert!(p.custom_fields.is_empty());
    }

    #[test]
    fn delete_reports_missing_rows() {
        let conn = conn();
        let id = insert(&conn, &new_participant("Ada")).unwrap();
        assert!(delete(&conn, id).unwrap());
        assert!(!delete(&conn, id).unwrap());
        assert!(get(&conn, id).unwrap().is_none());
    }
}
