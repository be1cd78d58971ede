use crate::error::{Error, Result};
use crate::services::blocking;
use crate::services::certificates::remove_certificate_file;
use crate::state::AppState;
use crate::storage::{certificates, participants};
use actix_web::{web, HttpResponse};
use common::model::batch::BatchReport;
use common::requests::DeleteRequest;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;

pub async fn process(state: web::Data<AppState>, request: web::Json<DeleteRequest>) -> Result<HttpResponse> {
    let ids = request.into_inner().ids;
    if ids.is_empty() {
        return Err(Error::validation("Please select at least one participant."));
    }

    let state = state.into_inner();
    let report = blocking(move || {
        let conn = state.db.connect()?;
        let mut report = BatchReport::new();
        for id in ids {
            let outcome = delete_participant(&conn, state.certificates_dir(), id);
            if let Err(e) = &outcome {
                error!("Could not delete participant {id}: {e}");
            }
            report.record(id, outcome);
        }
        Ok(report)
    })
    .await?;

    info!("Deleted {} participants, {} failed", report.succeeded, report.failed);
    Ok(HttpResponse::Ok().json(report))
}

/// Deletes one participant together with every certificate rendered for it,
/// file first and then row, before the participant row itself.
pub(crate) fn delete_participant(conn: &Connection, certs_dir: &Path, id: i64) -> Result<String> {
    let participant = participants::get(conn, id)?.ok_or_else(|| Error::not_found(format!("Participant {id}")))?;

    let owned = certificates::for_participant(conn, id)?;
    for certificate in &owned {
        remove_certificate_file(certs_dir, &certificate.generated_file_path)?;
        certificates::delete(conn, certificate.id)?;
    }
    participants::delete(conn, id)?;

    Ok(format!(
        "Participant '{}' deleted along with {} certificates.",
        participant.name,
        owned.len()
    ))
}
